// tests/script_backend.rs

#![cfg(unix)]

mod common;
use crate::common::{grid, init_tracing, with_timeout, JobBuilder};

use std::error::Error;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use gridjob::config::{load_and_validate, ConfigFile, ConfigSection, RawConfigFile};
use gridjob::dag::Submitter;
use gridjob::errors::GridjobError;
use gridjob::exec::ScriptGridBackend;
use gridjob::store::JobStore;
use gridjob::types::{Jid, JobState};

type TestResult = Result<(), Box<dyn Error>>;

/// Records its four arguments in `calls.log` (one per line) and answers
/// with a jid counting the calls so far.
const RECORDING_SUBMIT: &str = r#"#!/bin/sh
printf '%s\n' "$1" "$2" "$3" "$4" >> calls.log
echo x >> count
n=$(wc -l < count | tr -d ' ')
echo "jid=$n"
"#;

fn write_script(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().expect("script has a parent")).expect("create script dir");
    fs::write(path, body).expect("write script");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod script");
}

/// Temp store with `Gridjob.toml` pointing grid `g1` at `bin/submit-g1`.
fn setup(submit_body: &str) -> (TempDir, JobStore, ConfigFile) {
    let dir = tempfile::tempdir().expect("create temp dir");
    write_script(&dir.path().join("bin/submit-g1"), submit_body);
    let config_path = dir.path().join("Gridjob.toml");
    fs::write(
        &config_path,
        "[config]\nrun_wrapper = \"bin/gridjob-run\"\n\n[grid.g1]\nsubmit = \"bin/submit-g1\"\n",
    )
    .expect("write config");

    let config = load_and_validate(&config_path).expect("valid config");
    let store = JobStore::open(dir.path());
    (dir, store, config)
}

#[tokio::test]
async fn submits_through_the_configured_executable() -> TestResult {
    init_tracing();
    let (dir, store, config) = setup(RECORDING_SUBMIT);
    let y = JobBuilder::new("Y").create(&store, "jobs/y");
    let x = JobBuilder::new("X").input("jobs/y").create(&store, "jobs/x");

    let wrapper = config.run_wrapper();
    assert_eq!(wrapper, dir.path().join("bin/gridjob-run"));

    let mut backend = ScriptGridBackend::new(config);
    let mut submitter = Submitter::new(&store, &mut backend, grid("g1"), wrapper.clone());
    submitter.submit_requested(&[PathBuf::from("jobs/x")]).await?;

    let log = fs::read_to_string(dir.path().join("calls.log"))?;
    let lines: Vec<&str> = log.lines().collect();
    let wrapper = wrapper.display().to_string();
    let y_dir = y.display().to_string();
    let x_dir = x.display().to_string();
    assert_eq!(
        lines,
        vec!["Y", "", wrapper.as_str(), y_dir.as_str(), "X", "1", wrapper.as_str(), x_dir.as_str()]
    );

    assert_eq!(
        store.job_state(&x)?,
        JobState::Submitted {
            grid: "g1".into(),
            jid: Jid::new("2")
        }
    );
    assert_eq!(fs::read_to_string(x.join("live/grid"))?, "g1\n");
    assert_eq!(fs::read_to_string(x.join("live/jid"))?, "2\n");
    Ok(())
}

#[tokio::test]
async fn resubmission_does_not_call_the_executable_again() -> TestResult {
    let (dir, store, config) = setup(RECORDING_SUBMIT);
    JobBuilder::new("A").create(&store, "a");

    let mut backend = ScriptGridBackend::new(config);
    for _ in 0..2 {
        let mut submitter = Submitter::new(&store, &mut backend, grid("g1"), "run");
        with_timeout(submitter.submit_requested(&[PathBuf::from("a")])).await?;
    }

    assert_eq!(fs::read_to_string(dir.path().join("count"))?.lines().count(), 1);
    Ok(())
}

async fn expect_backend_failure(submit_body: &str) -> TestResult {
    let (_dir, store, config) = setup(submit_body);
    let job = JobBuilder::new("A").create(&store, "a");

    let mut backend = ScriptGridBackend::new(config);
    let mut submitter = Submitter::new(&store, &mut backend, grid("g1"), "run");
    let err = with_timeout(submitter.submit_job(Path::new("a")))
        .await
        .unwrap_err();

    match err {
        GridjobError::BackendSubmissionFailure { job: j, grid, .. } => {
            assert_eq!(j, job);
            assert_eq!(grid, "g1");
        }
        other => panic!("expected BackendSubmissionFailure, got {other:?}"),
    }
    assert_eq!(store.job_state(&job)?, JobState::NotSubmitted);
    assert!(!job.join("live").exists());
    Ok(())
}

#[tokio::test]
async fn nonzero_exit_is_a_backend_failure() -> TestResult {
    expect_backend_failure("#!/bin/sh\necho 'queue closed' >&2\nexit 2\n").await
}

#[tokio::test]
async fn output_without_jid_line_is_a_backend_failure() -> TestResult {
    expect_backend_failure("#!/bin/sh\necho 'Your job 123 has been submitted'\n").await
}

#[tokio::test]
async fn extra_output_lines_are_a_backend_failure() -> TestResult {
    expect_backend_failure("#!/bin/sh\necho 'submitting'\necho 'jid=7'\n").await
}

#[tokio::test]
async fn missing_executable_is_a_backend_failure() -> TestResult {
    let dir = tempfile::tempdir()?;
    let store = JobStore::open(dir.path());
    let job = JobBuilder::new("A").create(&store, "a");
    let raw = RawConfigFile {
        config: ConfigSection {
            backend_dir: Some(PathBuf::from("no-such-dir")),
            run_wrapper: None,
        },
        ..RawConfigFile::default()
    };
    let config = ConfigFile::try_from(raw)?.with_base_dir(dir.path());
    assert_eq!(
        config.submit_executable(&grid("g1")),
        dir.path().join("no-such-dir/submit-g1")
    );

    let mut backend = ScriptGridBackend::new(config);
    let mut submitter = Submitter::new(&store, &mut backend, grid("g1"), "run");
    let err = with_timeout(submitter.submit_job(&job)).await.unwrap_err();
    assert!(matches!(err, GridjobError::BackendSubmissionFailure { .. }));
    assert!(!job.join("live").exists());
    Ok(())
}
