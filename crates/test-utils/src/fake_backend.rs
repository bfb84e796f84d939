use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use gridjob::errors::{GridjobError, Result};
use gridjob::exec::{GridBackend, SubmitRequest};
use gridjob::types::Jid;

/// One call received by [`FakeGridBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSubmission {
    pub grid: String,
    pub job_name: String,
    pub deps_csv: String,
    pub run_wrapper: PathBuf,
    pub job_dir: PathBuf,
}

/// A fake grid backend that:
/// - records every submission call
/// - hands out jids `jid-1`, `jid-2`, ... in call order
/// - fails submissions of job names registered with [`fail_for`](Self::fail_for)
///   (failed calls are recorded too).
#[derive(Debug, Clone, Default)]
pub struct FakeGridBackend {
    calls: Arc<Mutex<Vec<RecordedSubmission>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl FakeGridBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, job_name: &str) {
        self.failing.lock().unwrap().insert(job_name.to_string());
    }

    pub fn calls(&self) -> Vec<RecordedSubmission> {
        self.calls.lock().unwrap().clone()
    }

    /// Job names in call order.
    pub fn submitted_names(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.job_name).collect()
    }
}

impl GridBackend for FakeGridBackend {
    fn submit(
        &mut self,
        request: SubmitRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Jid>> + Send + '_>> {
        let calls = Arc::clone(&self.calls);
        let failing = Arc::clone(&self.failing);

        Box::pin(async move {
            let recorded = RecordedSubmission {
                grid: request.grid.to_string(),
                job_name: request.job_name.to_string(),
                deps_csv: request.deps_csv(),
                run_wrapper: request.run_wrapper.clone(),
                job_dir: request.job_dir.clone(),
            };

            let n = {
                let mut guard = calls.lock().unwrap();
                guard.push(recorded);
                guard.len()
            };

            if failing.lock().unwrap().contains(request.job_name.as_str()) {
                return Err(GridjobError::BackendSubmissionFailure {
                    job: request.job_dir,
                    grid: request.grid.to_string(),
                    reason: "fake backend rejected the job".to_string(),
                });
            }

            Ok(Jid::new(format!("jid-{n}")))
        })
    }
}
