// src/exec/command.rs

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::info;

/// Run a job command to completion.
///
/// `argv[0]` is executed directly (no shell), with the remaining tokens as
/// arguments and `workdir` as working directory. The command inherits stdio
/// so its output lands wherever the grid collects job output.
pub async fn run_command(argv: &[String], workdir: &Path) -> Result<ExitStatus> {
    let (program, args) = argv.split_first().context("job command is empty")?;

    info!(program = %program, args = ?args, "starting job command");

    let mut child = Command::new(program)
        .args(args)
        .current_dir(workdir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("spawning job command '{program}'"))?;

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for job command '{program}'"))?;

    info!(
        program = %program,
        exit_code = status.code().unwrap_or(-1),
        success = status.success(),
        "job command exited"
    );

    Ok(status)
}
