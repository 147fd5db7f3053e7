use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a stage or the whole pipeline before it produces
/// output. Per-record problems never end up here; those records are
/// dropped where they are parsed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("output directory {} already exists", .0.display())]
    OutputExists(PathBuf),

    #[error("no input files match `{0}`")]
    NoInput(String),

    #[error("no stage named `{0}` found")]
    UnknownWorkload(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
