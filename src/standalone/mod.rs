//! Single-process execution of the stage chain.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

pub mod engine;
pub mod pipeline;

/// One stage run: which workload, where it reads and where it writes.
#[derive(Debug, Clone)]
pub struct Job {
    /// Glob spec or directory for the input files.
    pub input: String,
    pub workload: String,
    /// Directory receiving the `mr-out-*` files. Must not exist yet.
    pub output: PathBuf,
    pub n_reduce: u32,
    pub split_lines: usize,
}

/// Settings shared by every stage of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of reduce buckets per stage.
    pub n_reduce: u32,
    /// Maximum number of input lines handed to one map task.
    pub split_lines: usize,
    /// `surfaceWord lemma` table.
    pub lemmas: Option<PathBuf>,
    /// `word score` table.
    pub lexicon: Option<PathBuf>,
    /// Auxiliary arguments passed to every workload.
    pub args: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            n_reduce: 4,
            split_lines: 10_000,
            lemmas: None,
            lexicon: None,
            args: Vec::new(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.n_reduce == 0 {
            return Err(PipelineError::InvalidConfig(
                "at least one reduce bucket is required".into(),
            ));
        }
        if self.split_lines == 0 {
            return Err(PipelineError::InvalidConfig(
                "splits must hold at least one line".into(),
            ));
        }
        Ok(())
    }

    /// The job running `workload` from `input` into `output`.
    pub fn job(&self, workload: &str, input: impl Into<String>, output: impl Into<PathBuf>) -> Job {
        Job {
            input: input.into(),
            workload: workload.to_string(),
            output: output.into(),
            n_reduce: self.n_reduce,
            split_lines: self.split_lines,
        }
    }
}
