// src/errors.rs

//! Crate-wide error type.
//!
//! Every variant carries the paths needed to diagnose the failure by hand:
//! the job being processed and, where relevant, the offending artifact.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridjobError {
    #[error("Configuration error at {path:?}: {reason}")]
    ConfigError { path: PathBuf, reason: String },

    #[error("input {input:?} is required for job {job:?} but was not found")]
    MissingInput { job: PathBuf, input: PathBuf },

    #[error("{path:?} (referenced from {referrer:?}) does not resolve to any job")]
    UnresolvableReference { path: PathBuf, referrer: PathBuf },

    #[error(
        "job {job:?} was previously submitted on grid '{submitted}', so has no valid jid on grid '{requested}'"
    )]
    CrossGridMismatch {
        job: PathBuf,
        submitted: String,
        requested: String,
    },

    #[error("submission of job {job:?} to grid '{grid}' failed: {reason}")]
    BackendSubmissionFailure {
        job: PathBuf,
        grid: String,
        reason: String,
    },

    #[error("job {dependency:?} is required for job {job:?} but is not done")]
    DependencyNotDone { job: PathBuf, dependency: PathBuf },

    #[error("command of job {job:?} failed ({})", describe_exit(*.code, *.signal))]
    CommandFailure {
        job: PathBuf,
        code: Option<i32>,
        /// Signal that killed the command, when it did not exit on its own.
        signal: Option<i32>,
    },

    #[error("job {job:?} is already done")]
    AlreadyDone { job: PathBuf },

    #[error("cycle detected: {path:?} is reachable from itself")]
    CycleDetected { path: PathBuf },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GridjobError {
    pub(crate) fn config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        GridjobError::ConfigError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Process exit status a binary should use for this error.
    ///
    /// A failed job command hands its own exit code through unchanged. A
    /// command killed by a signal maps to `128 + signal`, as a shell would
    /// report it.
    pub fn exit_code(&self) -> i32 {
        match self {
            GridjobError::CommandFailure { code: Some(code), .. } if *code != 0 => *code,
            GridjobError::CommandFailure {
                code: None,
                signal: Some(signal),
                ..
            } => 128 + signal,
            _ => 1,
        }
    }
}

fn describe_exit(code: Option<i32>, signal: Option<i32>) -> String {
    match (code, signal) {
        (Some(code), _) => format!("exit status {code}"),
        (None, Some(signal)) => format!("terminated by signal {signal}"),
        (None, None) => "terminated abnormally".to_string(),
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, GridjobError>;
