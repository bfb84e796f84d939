// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod store;
pub mod types;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::{CliArgs, Command, RunArgs};
use crate::config::load_for_root;
use crate::dag::{SubmittedJob, Submitter};
use crate::errors::Result;
use crate::exec::{run_job, ScriptGridBackend};
use crate::store::JobStore;
use crate::types::{join_jids, GridName};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - the job store bound to `--root`
/// - config loading (only `submit` needs it)
/// - the submitter with the script backend, the run wrapper, or status
pub async fn run(args: CliArgs) -> Result<()> {
    let root = absolute_root(&args.root)?;
    let store = JobStore::open(&root);

    match args.command {
        Command::Submit {
            grid,
            jobs,
            dry_run,
        } => {
            let cfg = load_for_root(args.config.as_deref(), &root)?;
            submit(&store, cfg, grid, &jobs, dry_run).await
        }
        Command::Run { job } => run_job(&store, &job).await,
        Command::Status { jobs } => print_status(&store, &jobs),
    }
}

/// Entry point of the standalone `gridjob-run` binary.
pub async fn run_wrapper(args: RunArgs) -> Result<()> {
    let root = absolute_root(&args.root)?;
    let store = JobStore::open(root);
    run_job(&store, &args.job).await
}

async fn submit(
    store: &JobStore,
    cfg: config::ConfigFile,
    grid: GridName,
    jobs: &[PathBuf],
    dry_run: bool,
) -> Result<()> {
    let run_wrapper = cfg.run_wrapper();
    debug!(run_wrapper = %run_wrapper.display(), grid = %grid, "submitting");

    let mut backend = ScriptGridBackend::new(cfg);
    let mut submitter = Submitter::new(store, &mut backend, grid, run_wrapper);
    if dry_run {
        submitter = submitter.dry_run();
    }

    submitter.submit_requested(jobs).await?;

    if dry_run {
        print_plan(submitter.grid(), submitter.submitted());
    }
    Ok(())
}

/// Dry-run output: jobs in backend call order with their upstream jids.
fn print_plan(grid: &GridName, planned: &[SubmittedJob]) {
    if planned.is_empty() {
        println!("nothing to submit to {grid}");
        return;
    }

    println!("would submit to {grid} ({} jobs):", planned.len());
    for job in planned {
        println!("  - {} ({})", job.job.display(), job.name);
        if !job.deps.is_empty() {
            println!("      after: {}", join_jids(&job.deps));
        }
    }
}

/// One tab-separated line per job: path, state, and for submitted jobs the
/// grid and jid.
fn print_status(store: &JobStore, jobs: &[PathBuf]) -> Result<()> {
    for job in jobs {
        let job = store.locate(job);
        // Reject plain paths and reference directories up front.
        store.read_definition(&job)?;
        let state = store.job_state(&job)?;
        println!("{}\t{}", job.display(), state);
    }
    Ok(())
}

fn absolute_root(root: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(root)?)
}
