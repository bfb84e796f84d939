// src/store/mod.rs

//! Job store: typed access to job directories under an explicit root.
//!
//! Layout of a job directory:
//!
//! ```text
//! JOBDIR/definition/name      job name
//! JOBDIR/definition/inputs    artifact paths, one per line
//! JOBDIR/definition/command   argv tokens, one per line
//! JOBDIR/live/grid            grid the job was submitted to
//! JOBDIR/live/jid             identifier issued by that grid
//! JOBDIR/live/done            empty completion marker
//! ```
//!
//! A directory that is not a job may carry a `refs` file listing the
//! artifacts it stands in for.
//!
//! Relative artifact paths are resolved against the store root, never against
//! the process working directory. Every path handed out by the store
//! ([`JobStore::locate`]) is normalized, so it can be used as a map key.
//!
//! Each live field is an independent file and nothing is locked. Two
//! processes submitting the same job concurrently can both reach the backend.

pub mod paths;
pub mod records;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{GridjobError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::{ArtifactKind, GridName, Jid, JobState};

pub use records::{Definition, JobName};

const DEFINITION_DIR: &str = "definition";
const LIVE_DIR: &str = "live";
const REFS_FILE: &str = "refs";

/// Handle on a tree of job directories.
#[derive(Debug, Clone)]
pub struct JobStore {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl JobStore {
    pub fn new(root: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root: paths::normalize(&root.into()),
            fs,
        }
    }

    /// Store backed by the real filesystem.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::new(root, Arc::new(RealFileSystem))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an artifact path as written in a record or on the command line
    /// to the normalized path the store works with.
    pub fn locate(&self, artifact: &Path) -> PathBuf {
        paths::normalize(&self.root.join(artifact))
    }

    pub fn artifact_exists(&self, path: &Path) -> bool {
        self.fs.exists(path)
    }

    /// Classify a located path.
    pub fn kind_of(&self, path: &Path) -> Result<ArtifactKind> {
        let is_job = self.fs.exists(&path.join(DEFINITION_DIR));
        let is_ref = self.fs.exists(&path.join(REFS_FILE));
        match (is_job, is_ref) {
            (true, true) => Err(GridjobError::config(
                path,
                "directory holds both a job definition and a refs file",
            )),
            (true, false) => Ok(ArtifactKind::Job),
            (false, true) => Ok(ArtifactKind::Reference),
            (false, false) => Ok(ArtifactKind::Plain),
        }
    }

    pub fn read_definition(&self, job: &Path) -> Result<Definition> {
        let dir = job.join(DEFINITION_DIR);
        if !self.fs.is_dir(&dir) {
            return Err(GridjobError::config(job, "not a job directory (no definition)"));
        }

        let name_path = dir.join("name");
        let name = records::parse_name(&name_path, &self.read_field(&name_path)?)?;

        let inputs_path = dir.join("inputs");
        let inputs = records::parse_artifact_list(&inputs_path, &self.read_field(&inputs_path)?)?;

        let command_path = dir.join("command");
        let command = records::parse_command(&command_path, &self.read_field(&command_path)?)?;

        Ok(Definition {
            name,
            inputs,
            command,
        })
    }

    /// Artifact paths listed in `dir/refs`, as written.
    pub fn read_refs(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let path = dir.join(REFS_FILE);
        records::parse_artifact_list(&path, &self.read_field(&path)?)
    }

    /// Derive the submission state of a job from its live directory.
    pub fn job_state(&self, job: &Path) -> Result<JobState> {
        let live = job.join(LIVE_DIR);
        if !self.fs.exists(&live) {
            return Ok(JobState::NotSubmitted);
        }
        if self.is_done(job) {
            return Ok(JobState::Done);
        }

        let grid = self.read_optional_line(&live.join("grid"))?;
        let jid = self.read_optional_line(&live.join("jid"))?;
        match (grid, jid) {
            (Some(grid), Some(jid)) => Ok(JobState::Submitted {
                grid,
                jid: Jid::new(jid),
            }),
            _ => Err(GridjobError::config(
                &live,
                "incomplete live state (reserved but no grid/jid recorded)",
            )),
        }
    }

    /// Whether the completion marker is present.
    ///
    /// Unlike [`job_state`](Self::job_state) this never fails on a live
    /// directory whose submission bookkeeping is still being written, which
    /// is what the run wrapper needs: the grid may start a job before the
    /// submitter has recorded its jid.
    pub fn is_done(&self, job: &Path) -> bool {
        self.fs.exists(&job.join(LIVE_DIR).join("done"))
    }

    /// Reserve the live directory ahead of a backend call.
    pub fn reserve_live(&self, job: &Path) -> Result<()> {
        self.fs.create_dir(&job.join(LIVE_DIR))?;
        Ok(())
    }

    /// Undo [`reserve_live`](Self::reserve_live). Best effort: a failure is
    /// logged, not returned, so the backend error reaches the caller.
    pub fn release_live(&self, job: &Path) {
        let live = job.join(LIVE_DIR);
        if let Err(err) = self.fs.remove_dir(&live) {
            warn!(job = %job.display(), error = %err, "failed to remove reserved live directory");
        }
    }

    pub fn record_submission(&self, job: &Path, grid: &GridName, jid: &Jid) -> Result<()> {
        let live = job.join(LIVE_DIR);
        self.fs
            .write(&live.join("grid"), records::render_lines([grid.as_str()]).as_bytes())?;
        self.fs
            .write(&live.join("jid"), records::render_lines([jid.as_str()]).as_bytes())?;
        Ok(())
    }

    /// Write the completion marker, creating the live directory if the job
    /// was never submitted through this tool.
    pub fn mark_done(&self, job: &Path) -> Result<()> {
        let live = job.join(LIVE_DIR);
        if !self.fs.is_dir(&live) {
            debug!(job = %job.display(), "creating live directory before marking done");
            self.fs.create_dir(&live)?;
        }
        self.fs.write(&live.join("done"), b"")?;
        Ok(())
    }

    /// Materialize a new job directory.
    ///
    /// `job_dir` is stored as given in the `refs` file of every announced
    /// sub-directory, so dependents created before this job has run can
    /// already resolve those sub-directories to it. `sub_dirs` are relative
    /// to `job_dir` and must lie strictly inside it.
    pub fn create_job(&self, job_dir: &Path, definition: &Definition, sub_dirs: &[PathBuf]) -> Result<PathBuf> {
        let located = self.locate(job_dir);
        if self.fs.exists(&located) {
            return Err(GridjobError::config(&located, "job directory already exists"));
        }

        let mut located_subs = Vec::with_capacity(sub_dirs.len());
        for sub in sub_dirs {
            let sub_path = paths::normalize(&located.join(sub));
            if !paths::is_strict_subdir(&sub_path, &located) {
                return Err(GridjobError::config(
                    &sub_path,
                    format!("not a subdirectory of {}", located.display()),
                ));
            }
            located_subs.push(sub_path);
        }

        let def_dir = located.join(DEFINITION_DIR);
        self.fs.create_dir_all(&def_dir)?;
        self.fs.write(
            &def_dir.join("inputs"),
            records::render_paths(&def_dir.join("inputs"), &definition.inputs)?.as_bytes(),
        )?;
        self.fs.write(
            &def_dir.join("name"),
            records::render_lines([definition.name.as_str()]).as_bytes(),
        )?;
        self.fs.write(
            &def_dir.join("command"),
            records::render_lines(&definition.command).as_bytes(),
        )?;

        let back_ref = records::render_paths(&located, &[job_dir.to_path_buf()])?;
        for sub_path in located_subs {
            self.fs.create_dir_all(&sub_path)?;
            self.fs.write(&sub_path.join(REFS_FILE), back_ref.as_bytes())?;
        }

        debug!(job = %located.display(), "job directory created");
        Ok(located)
    }

    fn read_field(&self, path: &Path) -> Result<String> {
        if !self.fs.exists(path) {
            return Err(GridjobError::config(path, "missing file"));
        }
        self.read_record(path)
    }

    fn read_optional_line(&self, path: &Path) -> Result<Option<String>> {
        if !self.fs.exists(path) {
            return Ok(None);
        }
        let text = self.read_record(path)?;
        records::parse_single_line(path, &text).map(Some)
    }

    /// An unreadable record (not UTF-8, a directory, permissions) is a
    /// malformed record.
    fn read_record(&self, path: &Path) -> Result<String> {
        self.fs
            .read_to_string(path)
            .map_err(|e| GridjobError::config(path, format!("{e:#}")))
    }
}
