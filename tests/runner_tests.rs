//! Tool runner behavior against real child processes.

#![cfg(unix)]

mod common;

use common::stubs;
use dashres::{ExtractorError, ToolRunner};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

#[test]
fn test_clearing_cancel_flag_stops_running_tool() {
    let tool = stubs().path("hanging_tool");
    let scratch = TempDir::new().unwrap();
    let running = Arc::new(AtomicBool::new(true));

    let canceller = {
        let running = running.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(300));
            running.store(false, Ordering::SeqCst);
        })
    };

    let start = Instant::now();
    let result = ToolRunner::new(tool)
        .with_timeout(Duration::from_secs(60))
        .with_cancel_flag(running)
        .run(scratch.path(), scratch.path().join("xam.xex").as_path());
    canceller.join().unwrap();

    assert!(matches!(result, Err(ExtractorError::Cancelled)));
    // The stub sleeps for 30 seconds unless it is killed.
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_timeout_kills_running_tool() {
    let tool = stubs().path("hanging_tool");
    let scratch = TempDir::new().unwrap();

    let start = Instant::now();
    let result = ToolRunner::new(tool)
        .with_timeout(Duration::from_millis(200))
        .run(scratch.path(), scratch.path().join("xam.xex").as_path());

    assert!(matches!(result, Err(ExtractorError::Timeout { .. })));
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_tool_runs_in_configured_working_dir() {
    let tool = stubs().path("pwd_tool");
    let scratch = TempDir::new().unwrap();
    let work_dir = TempDir::new().unwrap();

    let outcome = ToolRunner::new(tool)
        .with_working_dir(work_dir.path())
        .run(scratch.path(), scratch.path().join("xam.xex").as_path())
        .unwrap();
    assert!(outcome.success());

    let reported = std::fs::read_to_string(scratch.path().join("shrdres")).unwrap();
    assert_eq!(
        std::path::Path::new(reported.trim()),
        std::fs::canonicalize(work_dir.path()).unwrap()
    );
}
