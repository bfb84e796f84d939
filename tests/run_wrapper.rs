// tests/run_wrapper.rs

#![cfg(unix)]

mod common;
use crate::common::{grid, init_tracing, with_timeout, JobBuilder};

use std::error::Error;
use std::fs;
use std::path::Path;

use tempfile::TempDir;

use gridjob::errors::GridjobError;
use gridjob::exec::run_job;
use gridjob::store::JobStore;
use gridjob::types::{Jid, JobState};

type TestResult = Result<(), Box<dyn Error>>;

fn temp_store() -> (TempDir, JobStore) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = JobStore::open(dir.path());
    (dir, store)
}

/// Number of lines in `path`, 0 if it does not exist.
fn line_count(path: &Path) -> usize {
    fs::read_to_string(path).map(|s| s.lines().count()).unwrap_or(0)
}

#[tokio::test]
async fn successful_command_marks_job_done() -> TestResult {
    init_tracing();
    let (dir, store) = temp_store();
    fs::create_dir(dir.path().join("data"))?;
    fs::write(dir.path().join("data/in.txt"), "hello\n")?;

    let job = JobBuilder::new("copy")
        .input("data/in.txt")
        .shell("cat data/in.txt > copied.txt")
        .create(&store, "jobs/copy");

    with_timeout(run_job(&store, Path::new("jobs/copy"))).await?;

    assert_eq!(store.job_state(&job)?, JobState::Done);
    // The command runs in the store root.
    assert_eq!(fs::read_to_string(dir.path().join("copied.txt"))?, "hello\n");
    Ok(())
}

#[tokio::test]
async fn done_job_is_never_run_again() -> TestResult {
    init_tracing();
    let (dir, store) = temp_store();
    let job = JobBuilder::new("count")
        .shell("echo run >> runs.log")
        .create(&store, "count");

    with_timeout(run_job(&store, &job)).await?;
    assert_eq!(line_count(&dir.path().join("runs.log")), 1);

    let err = with_timeout(run_job(&store, &job)).await.unwrap_err();
    assert!(matches!(err, GridjobError::AlreadyDone { .. }));
    assert_eq!(line_count(&dir.path().join("runs.log")), 1);
    Ok(())
}

#[tokio::test]
async fn submitted_but_unfinished_dependency_blocks_the_run() -> TestResult {
    init_tracing();
    let (dir, store) = temp_store();
    let upstream = JobBuilder::new("up").sub_dir("out").create(&store, "up");
    store.reserve_live(&upstream)?;
    store.record_submission(&upstream, &grid("g1"), &Jid::new("11"))?;

    let job = JobBuilder::new("down")
        .input("up/out")
        .shell("echo ran > down.txt")
        .create(&store, "down");

    let err = with_timeout(run_job(&store, &job)).await.unwrap_err();
    match err {
        GridjobError::DependencyNotDone { job: j, dependency } => {
            assert_eq!(j, job);
            assert_eq!(dependency, upstream);
        }
        other => panic!("expected DependencyNotDone, got {other:?}"),
    }
    assert!(!dir.path().join("down.txt").exists());
    assert_eq!(store.job_state(&job)?, JobState::NotSubmitted);

    store.mark_done(&upstream)?;
    with_timeout(run_job(&store, &job)).await?;
    assert!(dir.path().join("down.txt").exists());
    assert!(store.is_done(&job));
    Ok(())
}

#[tokio::test]
async fn missing_plain_input_blocks_the_run() -> TestResult {
    let (dir, store) = temp_store();
    let job = JobBuilder::new("needs")
        .input("data/absent")
        .shell("echo ran > ran.txt")
        .create(&store, "needs");

    let err = with_timeout(run_job(&store, &job)).await.unwrap_err();
    match err {
        GridjobError::MissingInput { input, .. } => {
            assert_eq!(input, store.locate(Path::new("data/absent")));
        }
        other => panic!("expected MissingInput, got {other:?}"),
    }
    assert!(!dir.path().join("ran.txt").exists());
    assert!(!job.join("live").exists());
    Ok(())
}

#[tokio::test]
async fn failing_command_keeps_its_exit_code_and_writes_no_marker() -> TestResult {
    init_tracing();
    let (_dir, store) = temp_store();
    let job = JobBuilder::new("fails").shell("exit 3").create(&store, "fails");

    let err = with_timeout(run_job(&store, &job)).await.unwrap_err();
    match &err {
        GridjobError::CommandFailure { code, signal, .. } => {
            assert_eq!(*code, Some(3));
            assert_eq!(*signal, None);
        }
        other => panic!("expected CommandFailure, got {other:?}"),
    }
    assert_eq!(err.exit_code(), 3);
    assert!(!store.is_done(&job));
    assert_eq!(store.job_state(&job)?, JobState::NotSubmitted);
    Ok(())
}

#[tokio::test]
async fn run_keeps_submission_bookkeeping() -> TestResult {
    let (_dir, store) = temp_store();
    let job = JobBuilder::new("j").command(["true"]).create(&store, "j");
    store.reserve_live(&job)?;
    store.record_submission(&job, &grid("g1"), &Jid::new("5"))?;

    with_timeout(run_job(&store, &job)).await?;
    assert_eq!(store.job_state(&job)?, JobState::Done);
    assert_eq!(fs::read_to_string(job.join("live/jid"))?, "5\n");
    Ok(())
}

#[tokio::test]
async fn argv_tokens_are_passed_verbatim() -> TestResult {
    let (dir, store) = temp_store();
    let job = JobBuilder::new("args")
        .command(["sh", "-c", "printf '%s|' \"$@\" > args.txt", "sh", "a b", "", "c"])
        .create(&store, "args");

    with_timeout(run_job(&store, &job)).await?;
    assert_eq!(fs::read_to_string(dir.path().join("args.txt"))?, "a b||c|");
    Ok(())
}

#[tokio::test]
async fn non_utf8_definition_field_is_a_config_error() -> TestResult {
    let (dir, store) = temp_store();
    let job = JobBuilder::new("bad").shell("echo ran > ran.txt").create(&store, "bad");
    fs::write(job.join("definition/inputs"), b"\xff\xfe\n")?;

    let err = with_timeout(run_job(&store, &job)).await.unwrap_err();
    match &err {
        GridjobError::ConfigError { path, reason } => {
            assert_eq!(path, &job.join("definition/inputs"));
            assert!(reason.contains("UTF-8"), "reason was {reason:?}");
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
    assert!(err.to_string().contains("UTF-8"));
    assert!(!dir.path().join("ran.txt").exists());
    Ok(())
}

#[tokio::test]
async fn command_killed_by_signal_exits_like_a_shell() -> TestResult {
    let (_dir, store) = temp_store();
    let job = JobBuilder::new("killed").shell("kill -KILL $$").create(&store, "killed");

    let err = with_timeout(run_job(&store, &job)).await.unwrap_err();
    match &err {
        GridjobError::CommandFailure { code, signal, .. } => {
            assert_eq!(*code, None);
            assert_eq!(*signal, Some(9));
        }
        other => panic!("expected CommandFailure, got {other:?}"),
    }
    assert_eq!(err.exit_code(), 137);
    assert!(!store.is_done(&job));
    Ok(())
}
