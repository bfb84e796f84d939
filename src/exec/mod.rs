// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] provides the `GridBackend` trait and the production
//!   `ScriptGridBackend`, which runs per-grid submission executables. Tests
//!   replace it with a fake.
//! - [`command`] runs a job's argv as a child process.
//! - [`wrapper`] is the run wrapper the grid executes for every job.

pub mod backend;
pub mod command;
pub mod wrapper;

pub use backend::{GridBackend, ScriptGridBackend, SubmitRequest};
pub use wrapper::run_job;
