// src/dag/resolver.rs

//! Artifact resolution: which job(s), if any, own a given path.
//!
//! - A directory holding a job definition is owned by itself.
//! - A directory holding a `refs` file is owned by whatever its referenced
//!   artifacts resolve to. Every referenced artifact must resolve to at least
//!   one job.
//! - Anything else is a plain artifact.
//!
//! Reference chains are expanded with an explicit stack. A reference
//! directory met again while it is still being expanded is a cycle.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::errors::{GridjobError, Result};
use crate::store::{Definition, JobStore};
use crate::types::ArtifactKind;

/// Outcome of resolving one artifact path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Owning job directories, first-seen order, no duplicates.
    Jobs(Vec<PathBuf>),
    /// Not owned by any job.
    NotAJob,
}

enum Step {
    Visit {
        path: PathBuf,
        referrer: Option<PathBuf>,
    },
    Leave(PathBuf),
}

/// Resolve `artifact` (as written in a record; located against the store
/// root).
pub fn resolve(store: &JobStore, artifact: &Path) -> Result<Resolution> {
    let mut stack = vec![Step::Visit {
        path: store.locate(artifact),
        referrer: None,
    }];
    let mut chain: HashSet<PathBuf> = HashSet::new();
    let mut expanded: HashSet<PathBuf> = HashSet::new();
    let mut seen_jobs: HashSet<PathBuf> = HashSet::new();
    let mut jobs: Vec<PathBuf> = Vec::new();

    while let Some(step) = stack.pop() {
        let (path, referrer) = match step {
            Step::Leave(path) => {
                chain.remove(&path);
                expanded.insert(path);
                continue;
            }
            Step::Visit { path, referrer } => (path, referrer),
        };

        match store.kind_of(&path)? {
            ArtifactKind::Job => {
                if seen_jobs.insert(path.clone()) {
                    jobs.push(path);
                }
            }
            ArtifactKind::Reference => {
                if chain.contains(&path) {
                    return Err(GridjobError::CycleDetected { path });
                }
                if expanded.contains(&path) {
                    continue;
                }

                let refs = store.read_refs(&path)?;
                trace!(dir = %path.display(), count = refs.len(), "expanding references");

                chain.insert(path.clone());
                stack.push(Step::Leave(path.clone()));
                for referenced in refs.iter().rev() {
                    stack.push(Step::Visit {
                        path: store.locate(referenced),
                        referrer: Some(path.clone()),
                    });
                }
            }
            ArtifactKind::Plain => match referrer {
                Some(referrer) => {
                    return Err(GridjobError::UnresolvableReference { path, referrer });
                }
                // Only the starting path has no referrer.
                None => return Ok(Resolution::NotAJob),
            },
        }
    }

    Ok(Resolution::Jobs(jobs))
}

/// A job's inputs, split by ownership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedInputs {
    /// Upstream job directories in input order, each listed once.
    pub jobs: Vec<PathBuf>,
    /// Plain artifacts, located against the store root, in input order.
    pub plain: Vec<PathBuf>,
}

/// Resolve every input of `definition` and partition the results.
pub fn resolve_inputs(store: &JobStore, definition: &Definition) -> Result<ResolvedInputs> {
    let mut out = ResolvedInputs::default();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for input in &definition.inputs {
        match resolve(store, input)? {
            Resolution::Jobs(jobs) => {
                for job in jobs {
                    if seen.insert(job.clone()) {
                        out.jobs.push(job);
                    }
                }
            }
            Resolution::NotAJob => out.plain.push(store.locate(input)),
        }
    }

    Ok(out)
}
