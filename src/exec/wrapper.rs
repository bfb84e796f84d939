// src/exec/wrapper.rs

//! Run wrapper: what the grid executes for each job.
//!
//! The grid's own dependency mechanism should already have held the job back
//! until its upstream jobs finished. The wrapper re-checks anyway, then runs
//! the job command and writes the completion marker only if it succeeded.
//!
//! A crash between the command exiting and the marker being written leaves
//! the job looking not-yet-run; job commands are expected to be safe to run
//! again.

use std::path::Path;
use std::process::ExitStatus;

use tracing::info;

use crate::dag::resolver::resolve_inputs;
use crate::errors::{GridjobError, Result};
use crate::exec::command::run_command;
use crate::store::JobStore;

/// Verify inputs, run the command of `job`, and mark it done.
pub async fn run_job(store: &JobStore, job: &Path) -> Result<()> {
    let job = store.locate(job);

    if store.is_done(&job) {
        return Err(GridjobError::AlreadyDone { job });
    }

    let definition = store.read_definition(&job)?;
    let inputs = resolve_inputs(store, &definition)?;

    for dependency in &inputs.jobs {
        if !store.is_done(dependency) {
            return Err(GridjobError::DependencyNotDone {
                job: job.clone(),
                dependency: dependency.clone(),
            });
        }
    }

    for input in &inputs.plain {
        if !store.artifact_exists(input) {
            return Err(GridjobError::MissingInput {
                job: job.clone(),
                input: input.clone(),
            });
        }
    }

    info!(job = %job.display(), name = %definition.name, "inputs verified, running job");

    let status = run_command(&definition.command, store.root()).await?;
    if !status.success() {
        return Err(GridjobError::CommandFailure {
            job,
            code: status.code(),
            signal: termination_signal(&status),
        });
    }

    store.mark_done(&job)?;
    info!(job = %job.display(), name = %definition.name, "job done");
    Ok(())
}

#[cfg(unix)]
fn termination_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn termination_signal(_status: &ExitStatus) -> Option<i32> {
    None
}
