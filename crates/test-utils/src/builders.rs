#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gridjob::fs::mock::MockFileSystem;
use gridjob::store::{Definition, JobName, JobStore};

/// In-memory store rooted at `/work`, plus a handle on its filesystem.
pub fn mock_store() -> (JobStore, MockFileSystem) {
    let fs = MockFileSystem::new();
    fs.add_dir("/work");
    (JobStore::new("/work", Arc::new(fs.clone())), fs)
}

/// Builder for job directories, to simplify test setup.
///
/// ```ignore
/// JobBuilder::new("train")
///     .input("data/raw")
///     .input("jobs/prep/out")
///     .sub_dir("model")
///     .command(["python", "train.py"])
///     .create(&store, "jobs/train");
/// ```
pub struct JobBuilder {
    name: String,
    inputs: Vec<PathBuf>,
    command: Vec<String>,
    sub_dirs: Vec<PathBuf>,
}

impl JobBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            inputs: Vec::new(),
            command: vec!["true".to_string()],
            sub_dirs: Vec::new(),
        }
    }

    pub fn input(mut self, path: impl AsRef<Path>) -> Self {
        self.inputs.push(path.as_ref().to_path_buf());
        self
    }

    pub fn inputs<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.inputs
            .extend(paths.into_iter().map(|p| p.as_ref().to_path_buf()));
        self
    }

    pub fn command<I, S>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command = argv.into_iter().map(Into::into).collect();
        self
    }

    /// Run `script` through `sh -c`.
    pub fn shell(self, script: &str) -> Self {
        self.command(["sh", "-c", script])
    }

    /// Announce a sub-directory the job will populate; it gets a `refs`
    /// file pointing back at the job.
    pub fn sub_dir(mut self, rel: impl AsRef<Path>) -> Self {
        self.sub_dirs.push(rel.as_ref().to_path_buf());
        self
    }

    pub fn definition(&self) -> Definition {
        Definition {
            name: JobName::new(self.name.clone()).expect("valid job name in test"),
            inputs: self.inputs.clone(),
            command: self.command.clone(),
        }
    }

    /// Materialize the job under `dir` (relative to the store root) and
    /// return its located path.
    pub fn create(self, store: &JobStore, dir: impl AsRef<Path>) -> PathBuf {
        store
            .create_job(dir.as_ref(), &self.definition(), &self.sub_dirs)
            .expect("failed to create job directory")
    }
}
