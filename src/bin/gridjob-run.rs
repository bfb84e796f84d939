// src/bin/gridjob-run.rs

//! Run wrapper executed by grid backends: `gridjob-run JOBDIR`.
//!
//! Exits with the job command's own status when the command fails, and with
//! status 1 for every other failure. The completion marker is written only on
//! success.

use clap::Parser;
use gridjob::cli::RunArgs;
use gridjob::{logging, run_wrapper};

#[tokio::main]
async fn main() {
    let args = RunArgs::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("gridjob-run error: {err:?}");
        std::process::exit(1);
    }

    if let Err(err) = run_wrapper(args).await {
        eprintln!("gridjob-run error: {err}");
        std::process::exit(err.exit_code());
    }
}
