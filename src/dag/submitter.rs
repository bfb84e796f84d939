// src/dag/submitter.rs

//! Dependency-ordered, idempotent submission of jobs to a grid.
//!
//! For a requested job the submitter:
//!
//! 1. returns nothing if the job is done;
//! 2. returns the recorded jid if it was submitted to the same grid (and
//!    fails if it went to another grid);
//! 3. otherwise resolves the job's inputs, checks that plain inputs exist,
//!    submits upstream jobs first, then submits the job with the upstream
//!    jids (input order, done jobs omitted) and records the result.
//!
//! The walk is depth-first with an explicit stack. Every job reached during
//! one submitter's lifetime is settled at most once: its outcome is memoized,
//! so diamonds cost one backend call per job. A job reached again while its
//! own upstream is still being walked is a dependency cycle.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::dag::resolver::resolve_inputs;
use crate::errors::{GridjobError, Result};
use crate::exec::backend::{GridBackend, SubmitRequest};
use crate::store::{Definition, JobName, JobStore};
use crate::types::{join_jids, GridName, Jid, JobState};

/// Record of one job handed to the backend (or, in a dry run, one job that
/// would be).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedJob {
    pub job: PathBuf,
    pub name: JobName,
    pub jid: Jid,
    /// Upstream identifiers passed along with the job.
    pub deps: Vec<Jid>,
}

enum Frame {
    /// Decide what to do with a job.
    Visit(PathBuf),
    /// All upstream jobs are settled; submit this one.
    Submit {
        job: PathBuf,
        definition: Definition,
        upstream: Vec<PathBuf>,
    },
}

/// Submits jobs to one grid through a [`GridBackend`].
pub struct Submitter<'a> {
    store: &'a JobStore,
    backend: &'a mut dyn GridBackend,
    grid: GridName,
    run_wrapper: PathBuf,
    dry_run: bool,
    /// Settled jobs: `None` for done, `Some(jid)` for submitted.
    outcomes: HashMap<PathBuf, Option<Jid>>,
    submitted: Vec<SubmittedJob>,
}

impl<'a> Submitter<'a> {
    pub fn new(
        store: &'a JobStore,
        backend: &'a mut dyn GridBackend,
        grid: GridName,
        run_wrapper: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            backend,
            grid,
            run_wrapper: run_wrapper.into(),
            dry_run: false,
            outcomes: HashMap::new(),
            submitted: Vec::new(),
        }
    }

    /// Walk and check everything, but neither call the backend nor touch
    /// the store. Jobs that would be submitted get placeholder jids of the
    /// form `<dry-run:NAME>`.
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    pub fn grid(&self) -> &GridName {
        &self.grid
    }

    /// Jobs submitted so far, in backend call order.
    pub fn submitted(&self) -> &[SubmittedJob] {
        &self.submitted
    }

    /// Top-level entry: submit every requested job that is neither done nor
    /// already submitted.
    pub async fn submit_requested(&mut self, jobs: &[PathBuf]) -> Result<()> {
        for job in jobs {
            let job = self.store.locate(job);
            let state = self.store.job_state(&job)?;
            if state.is_terminal() {
                info!(job = %job.display(), state = %state, "nothing to do for requested job");
                continue;
            }
            self.submit_job(&job).await?;
        }
        Ok(())
    }

    /// Make sure `job` and everything upstream of it is submitted.
    ///
    /// Returns the jid the job is known by on this grid, or `None` if it is
    /// already done and needs no waiting on.
    pub async fn submit_job(&mut self, job: &Path) -> Result<Option<Jid>> {
        let target = self.store.locate(job);
        let mut stack = vec![Frame::Visit(target.clone())];
        let mut in_progress: HashSet<PathBuf> = HashSet::new();

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Visit(job) => {
                    if self.outcomes.contains_key(&job) {
                        continue;
                    }
                    if in_progress.contains(&job) {
                        return Err(GridjobError::CycleDetected { path: job });
                    }

                    match self.store.job_state(&job)? {
                        JobState::Done => {
                            debug!(job = %job.display(), "already done");
                            self.outcomes.insert(job, None);
                        }
                        JobState::Submitted { grid, jid } => {
                            if grid != self.grid.as_str() {
                                return Err(GridjobError::CrossGridMismatch {
                                    job,
                                    submitted: grid,
                                    requested: self.grid.to_string(),
                                });
                            }
                            debug!(job = %job.display(), jid = %jid, "already submitted");
                            self.outcomes.insert(job, Some(jid));
                        }
                        JobState::NotSubmitted => {
                            let definition = self.store.read_definition(&job)?;
                            let inputs = resolve_inputs(self.store, &definition)?;

                            for input in &inputs.plain {
                                if !self.store.artifact_exists(input) {
                                    return Err(GridjobError::MissingInput {
                                        job,
                                        input: input.clone(),
                                    });
                                }
                            }

                            in_progress.insert(job.clone());
                            let visits: Vec<Frame> = inputs
                                .jobs
                                .iter()
                                .rev()
                                .map(|up| Frame::Visit(up.clone()))
                                .collect();
                            stack.push(Frame::Submit {
                                job,
                                definition,
                                upstream: inputs.jobs,
                            });
                            stack.extend(visits);
                        }
                    }
                }
                Frame::Submit {
                    job,
                    definition,
                    upstream,
                } => {
                    let deps: Vec<Jid> = upstream
                        .iter()
                        .filter_map(|up| self.outcomes.get(up).cloned().flatten())
                        .collect();
                    let jid = self.submit_one(&job, definition, deps).await?;
                    in_progress.remove(&job);
                    self.outcomes.insert(job, Some(jid));
                }
            }
        }

        Ok(self.outcomes.get(&target).cloned().flatten())
    }

    async fn submit_one(&mut self, job: &Path, definition: Definition, deps: Vec<Jid>) -> Result<Jid> {
        if self.dry_run {
            let jid = Jid::new(format!("<dry-run:{}>", definition.name));
            info!(job = %job.display(), deps = %join_jids(&deps), "would submit job");
            self.submitted.push(SubmittedJob {
                job: job.to_path_buf(),
                name: definition.name,
                jid: jid.clone(),
                deps,
            });
            return Ok(jid);
        }

        self.store.reserve_live(job)?;

        let request = SubmitRequest {
            grid: self.grid.clone(),
            job_name: definition.name.clone(),
            dep_jids: deps.clone(),
            run_wrapper: self.run_wrapper.clone(),
            job_dir: job.to_path_buf(),
            workdir: self.store.root().to_path_buf(),
        };
        debug!(job = %job.display(), deps = %request.deps_csv(), "submitting job");

        let jid = match self.backend.submit(request).await {
            Ok(jid) => jid,
            Err(err) => {
                self.store.release_live(job);
                return Err(self.as_backend_failure(job, err));
            }
        };

        self.store.record_submission(job, &self.grid, &jid)?;
        info!(job = %job.display(), grid = %self.grid, jid = %jid, "job submitted");

        self.submitted.push(SubmittedJob {
            job: job.to_path_buf(),
            name: definition.name,
            jid: jid.clone(),
            deps,
        });
        Ok(jid)
    }

    fn as_backend_failure(&self, job: &Path, err: GridjobError) -> GridjobError {
        match err {
            GridjobError::BackendSubmissionFailure { .. } => err,
            other => GridjobError::BackendSubmissionFailure {
                job: job.to_path_buf(),
                grid: self.grid.to_string(),
                reason: other.to_string(),
            },
        }
    }
}
