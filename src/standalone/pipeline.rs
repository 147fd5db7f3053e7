//! Chains the stages: clean, count, then decade and sentiment totals.
//!
//! Everything is written into a hidden staging directory next to the
//! requested output and only renamed into place once every stage has
//! finished. A failed run leaves no output directory behind.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use uuid::Uuid;

use super::engine::{run_job, StageReport};
use super::PipelineConfig;
use crate::error::PipelineError;
use crate::tables::Tables;
use crate::{workload, TaskContext};

/// Stage name and the stage whose output it reads (`None` for the raw input).
pub const STAGES: [(&str, Option<&str>); 4] = [
    ("clean", None),
    ("frequency", Some("clean")),
    ("decade", Some("frequency")),
    ("sentiment", Some("frequency")),
];

#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub stages: Vec<StageReport>,
}

impl PipelineReport {
    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|report| report.workload == name)
    }
}

fn staging_dir(output: &Path) -> Result<PathBuf> {
    let name = output
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            PipelineError::InvalidConfig(format!("unusable output path {}", output.display()))
        })?;
    let parent = output
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok(parent.join(format!(".{}.{}.partial", name, Uuid::new_v4())))
}

/// Runs `body` against a fresh staging directory and publishes it as
/// `output` if, and only if, `body` succeeds.
fn publish<T>(output: &Path, body: impl FnOnce(&Path) -> Result<T>) -> Result<T> {
    if output.exists() {
        return Err(PipelineError::OutputExists(output.to_path_buf()).into());
    }
    let staging = staging_dir(output)?;
    fs::create_dir_all(&staging).with_context(|| format!("creating {}", staging.display()))?;

    match body(&staging) {
        Ok(value) => {
            fs::rename(&staging, output).with_context(|| {
                format!("moving {} to {}", staging.display(), output.display())
            })?;
            Ok(value)
        }
        Err(err) => {
            if !staging.exists() {
                return Err(err);
            }
            if let Err(cleanup) = fs::remove_dir_all(&staging) {
                warn!("could not remove {}: {cleanup}", staging.display());
            }
            Err(err)
        }
    }
}

fn context(config: &PipelineConfig) -> Result<TaskContext> {
    let tables = Tables::load(config.lemmas.as_deref(), config.lexicon.as_deref());
    TaskContext::new(&config.args, Arc::new(tables))
}

/// Runs all four stages from the raw `bookID,title,year,content` files
/// matched by `input` into `output/{clean,frequency,decade,sentiment}`.
pub fn run(input: &str, output: &Path, config: &PipelineConfig) -> Result<PipelineReport> {
    config.validate()?;
    let ctx = context(config)?;

    publish(output, |staging| {
        let mut report = PipelineReport::default();
        for (name, source) in STAGES {
            let engine = workload::named(name)?;
            let stage_input = match source {
                Some(previous) => staging.join(previous).to_string_lossy().into_owned(),
                None => input.to_string(),
            };
            let job = config.job(name, stage_input, staging.join(name));
            let stage = run_job(&job, &engine, &ctx)
                .with_context(|| format!("stage `{name}` failed"))?;
            report.stages.push(stage);
        }
        info!(output = %output.display(), stages = report.stages.len(), "pipeline finished");
        Ok(report)
    })
}

/// Runs the single stage `workload` from `input` into `output`.
pub fn run_stage(
    workload: &str,
    input: &str,
    output: &Path,
    config: &PipelineConfig,
) -> Result<StageReport> {
    config.validate()?;
    let engine = workload::named(workload)?;
    let ctx = context(config)?;

    publish(output, |staging| {
        // the engine creates the directory itself
        fs::remove_dir(staging)?;
        run_job(&config.job(workload, input, staging), &engine, &ctx)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_dir_is_a_hidden_sibling() {
        let staging = staging_dir(Path::new("/data/out")).unwrap();
        assert_eq!(staging.parent(), Some(Path::new("/data")));
        let name = staging.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(".out.") && name.ends_with(".partial"));

        let relative = staging_dir(Path::new("out")).unwrap();
        assert_eq!(relative.parent(), Some(Path::new(".")));
        assert!(staging_dir(Path::new("/")).is_err());
    }

    #[test]
    fn publish_cleans_up_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out");
        let result: Result<()> = publish(&output, |staging| {
            fs::write(staging.join("half-written"), "x")?;
            anyhow::bail!("stage blew up")
        });
        assert!(result.is_err());
        assert!(!output.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn publish_renames_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out");
        publish(&output, |staging| Ok(fs::write(staging.join("done"), "x")?)).unwrap();
        assert!(output.join("done").is_file());
        assert!(publish(&output, |_| Ok(())).is_err());
    }

    #[test]
    fn unknown_stage_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_stage("wc", "in", &dir.path().join("out"), &PipelineConfig::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::UnknownWorkload(_))
        ));
    }
}
