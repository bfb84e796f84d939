// src/exec/backend.rs

//! Pluggable grid backend abstraction.
//!
//! The submitter talks to a `GridBackend` instead of spawning submission
//! scripts directly, so tests can swap in a fake that records calls.
//!
//! - `ScriptGridBackend` is the production implementation. It runs one
//!   executable per grid as
//!   `submit-<grid> JOB_NAME DEP_JIDS RUN_WRAPPER JOB_DIR`
//!   and expects exactly one `jid=<ID>` line on stdout.
//! - Tests provide their own `GridBackend`.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::LazyLock;

use regex::Regex;
use tokio::process::Command;
use tracing::debug;

use crate::config::ConfigFile;
use crate::errors::{GridjobError, Result};
use crate::store::JobName;
use crate::types::{join_jids, GridName, Jid};

/// One submission call.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub grid: GridName,
    pub job_name: JobName,
    /// Identifiers the job must wait for, in input-resolution order.
    pub dep_jids: Vec<Jid>,
    /// What the grid should run later, with `job_dir` as its only argument.
    pub run_wrapper: PathBuf,
    pub job_dir: PathBuf,
    /// Working directory for the submission call (the store root).
    pub workdir: PathBuf,
}

impl SubmitRequest {
    /// Dependency identifiers as handed to the backend: comma-joined.
    pub fn deps_csv(&self) -> String {
        join_jids(&self.dep_jids)
    }
}

/// Trait abstracting how a job is handed to a grid.
pub trait GridBackend: Send {
    /// Submit one job and return the identifier the grid issued.
    ///
    /// Any failure should be reported as
    /// [`GridjobError::BackendSubmissionFailure`]; the submitter wraps other
    /// errors into that kind.
    fn submit(
        &mut self,
        request: SubmitRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Jid>> + Send + '_>>;
}

/// Backend that runs a per-grid submission executable.
#[derive(Debug, Clone)]
pub struct ScriptGridBackend {
    config: ConfigFile,
}

impl ScriptGridBackend {
    pub fn new(config: ConfigFile) -> Self {
        Self { config }
    }
}

impl GridBackend for ScriptGridBackend {
    fn submit(
        &mut self,
        request: SubmitRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Jid>> + Send + '_>> {
        let executable = self.config.submit_executable(&request.grid);

        Box::pin(async move {
            let fail = |reason: String| GridjobError::BackendSubmissionFailure {
                job: request.job_dir.clone(),
                grid: request.grid.to_string(),
                reason,
            };

            debug!(
                executable = %executable.display(),
                job = %request.job_dir.display(),
                deps = %request.deps_csv(),
                "invoking grid submission executable"
            );

            let output = Command::new(&executable)
                .arg(request.job_name.as_str())
                .arg(request.deps_csv())
                .arg(&request.run_wrapper)
                .arg(&request.job_dir)
                .current_dir(&request.workdir)
                .stdin(Stdio::null())
                .output()
                .await
                .map_err(|e| fail(format!("could not run {}: {e}", executable.display())))?;

            let stderr = String::from_utf8_lossy(&output.stderr);
            if !output.status.success() {
                return Err(fail(format!(
                    "{} exited with {}: {}",
                    executable.display(),
                    output.status,
                    stderr.trim()
                )));
            }

            let stdout = String::from_utf8_lossy(&output.stdout);
            parse_jid_output(&stdout).map_err(fail)
        })
    }
}

static JID_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^jid=(.+)$").expect("jid pattern is a valid regex"));

/// Parse the stdout of a submission executable: exactly one `jid=<ID>` line.
///
/// The identifier is opaque: everything after `jid=` is kept verbatim.
pub fn parse_jid_output(stdout: &str) -> std::result::Result<Jid, String> {
    let body = stdout.strip_suffix('\n').unwrap_or(stdout);
    let body = body.strip_suffix('\r').unwrap_or(body);
    if body.contains('\n') {
        return Err(format!("expected one line of output, got {:?}", stdout));
    }
    match JID_LINE.captures(body) {
        Some(caps) => Ok(Jid::new(&caps[1])),
        None => Err(format!("expected `jid=<ID>`, got {:?}", stdout)),
    }
}
