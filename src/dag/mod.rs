// src/dag/mod.rs

//! The job dependency graph, as discovered from job directories.
//!
//! There is no in-memory graph built up front: edges are found on demand by
//! reading each job's inputs.
//!
//! - [`resolver`] maps an artifact path to the job(s) owning it, following
//!   reference records.
//! - [`submitter`] walks upstream from requested jobs and submits each
//!   unsubmitted job once, dependencies first.

pub mod resolver;
pub mod submitter;

pub use resolver::{resolve, resolve_inputs, Resolution, ResolvedInputs};
pub use submitter::{SubmittedJob, Submitter};
