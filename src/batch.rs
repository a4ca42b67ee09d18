//! # Batch Driver
//!
//! Normalizes many files at once. Each job reads its input, runs the
//! CPU-bound pipeline on tokio's blocking pool, and writes one JPEG. Jobs
//! share nothing; one failing job never affects the others.
//!
//! Reports come back in input order and render to the JSON body the upload
//! endpoint used to answer with (`{"message", "path"}`).

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use futures_util::future::join_all;
use serde_json::{Value, json};
use tokio::task::spawn_blocking;

use crate::config::NormalizeConfig;
use crate::decode::{DecodeLimits, decode_with_limits};
use crate::encode::encode_to_path;
use crate::error::{DecodeError, PipelineError};
use crate::pipeline::{TargetSpec, normalize_buffer};

pub const SUCCESS_MESSAGE: &str = "image normalized";
pub const FAILURE_MESSAGE: &str = "image rejected";

/// One input file and the JPEG it becomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Outcome of one [`Job`].
#[derive(Debug)]
pub struct JobReport {
    pub input: PathBuf,
    pub result: Result<PathBuf>,
}

impl JobReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Pipeline error behind a failure, if the failure came from the pipeline.
    pub fn pipeline_error(&self) -> Option<&PipelineError> {
        self.result.as_ref().err()?.downcast_ref::<PipelineError>()
    }

    pub fn to_json(&self) -> Value {
        match &self.result {
            Ok(path) => json!({
                "message": SUCCESS_MESSAGE,
                "path": path.display().to_string(),
            }),
            Err(e) => {
                let (stage, error) = match self.pipeline_error() {
                    Some(p) => (Some(p.category()), p.to_string()),
                    None => (None, format!("{e:#}")),
                };
                json!({
                    "message": FAILURE_MESSAGE,
                    "input": self.input.display().to_string(),
                    "stage": stage,
                    "error": error,
                })
            }
        }
    }
}

/// Map inputs to `<stem>.jpg` under `out_dir`.
///
/// Inputs sharing a stem get `-1`, `-2`, ... suffixes so no job overwrites
/// another's output.
pub fn plan_jobs(inputs: &[PathBuf], out_dir: &Path) -> Vec<Job> {
    let mut taken = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "image".to_string());
            let mut name = format!("{stem}.jpg");
            let mut n = 1;
            while !taken.insert(name.clone()) {
                name = format!("{stem}-{n}.jpg");
                n += 1;
            }
            Job {
                input: input.clone(),
                output: out_dir.join(name),
            }
        })
        .collect()
}

/// Run one job synchronously.
pub fn run_job(job: &Job, spec: &TargetSpec, quality: u8, limits: &DecodeLimits) -> Result<PathBuf> {
    let len = fs::metadata(&job.input)
        .with_context(|| format!("Failed to stat '{}'", job.input.display()))?
        .len();
    // refuse before reading the whole file into memory
    if len > limits.max_input_bytes as u64 {
        return Err(PipelineError::from(DecodeError::InputTooLarge {
            len: usize::try_from(len).unwrap_or(usize::MAX),
            limit: limits.max_input_bytes,
        })
        .into());
    }

    let bytes = fs::read(&job.input).with_context(|| format!("Failed to read '{}'", job.input.display()))?;
    let (source, format) = decode_with_limits(&bytes, limits).map_err(PipelineError::from)?;
    log::trace!("{}: {} source {}x{}", job.input.display(), format, source.width(), source.height());
    if let Ok(plan) = spec.plan(source.size()) {
        log::debug!(
            "{}: {} {}x{} -> {}x{} via {}x{} ({:?})",
            job.input.display(),
            plan.strategy.as_str(),
            plan.input.w,
            plan.input.h,
            plan.canvas.w,
            plan.canvas.h,
            plan.scaled.w,
            plan.scaled.h,
            plan.placement
        );
    }
    let canvas = normalize_buffer(&source, spec)?;
    let path = encode_to_path(&canvas, quality, &job.output).map_err(PipelineError::from)?;
    Ok(path)
}

/// Run every job concurrently on the blocking pool. Reports keep job order.
pub async fn run_batch(jobs: Vec<Job>, config: &NormalizeConfig) -> Vec<JobReport> {
    let spec = config.to_target_spec();
    let limits = config.decode_limits();
    let quality = config.quality;

    let workers = jobs.into_iter().map(|job| {
        let input = job.input.clone();
        let handle = spawn_blocking(move || run_job(&job, &spec, quality, &limits));
        async move {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(anyhow!("Worker for '{}' did not finish: {}", input.display(), e)),
            };
            JobReport { input, result }
        }
    });
    join_all(workers).await
}
