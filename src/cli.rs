// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::types::GridName;

/// Command-line arguments for `gridjob`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gridjob",
    version,
    about = "Submit interdependent batch jobs to a compute grid, dependencies first.",
    long_about = None
)]
pub struct CliArgs {
    /// Directory relative job and artifact paths are resolved against.
    #[arg(long, value_name = "DIR", default_value = ".", global = true)]
    pub root: PathBuf,

    /// Path to the config file (TOML).
    ///
    /// Default: `Gridjob.toml` in the root directory, if present.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `GRIDJOB_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Submit jobs (and everything upstream of them) to a grid.
    ///
    /// Jobs already submitted or done are left alone.
    Submit {
        /// Grid to submit to; selects the `submit-<GRID>` executable.
        grid: GridName,

        /// Job directories to submit.
        #[arg(required = true, value_name = "JOBDIR")]
        jobs: Vec<PathBuf>,

        /// Check everything and print what would be submitted, in order,
        /// without submitting anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Run a job: verify its inputs, run its command, mark it done.
    ///
    /// This is what grid backends execute; `gridjob-run` is the same thing
    /// as a standalone binary.
    Run {
        #[arg(value_name = "JOBDIR")]
        job: PathBuf,
    },

    /// Print the state of jobs (not-submitted, submitted, done).
    Status {
        #[arg(required = true, value_name = "JOBDIR")]
        jobs: Vec<PathBuf>,
    },
}

/// Arguments of the standalone `gridjob-run` binary.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gridjob-run",
    version,
    about = "Run one job: verify its inputs, run its command, mark it done.",
    long_about = None
)]
pub struct RunArgs {
    /// Directory relative artifact paths are resolved against.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[arg(value_name = "JOBDIR")]
    pub job: PathBuf,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
