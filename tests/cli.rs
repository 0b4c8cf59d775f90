use std::fs;

use assert_cmd::prelude::*;
use predicates::str::contains;
use std::process::Command;
use tempfile::TempDir;

use growpool::{PoolConfig, PoolError, ShutdownPolicy};

fn demo() -> Command {
    let mut cmd = Command::cargo_bin("pool-demo").unwrap();
    cmd.env("RUST_LOG", "warn");
    cmd
}

// `pool-demo` with short jobs runs every job before shutting down.
#[test]
fn demo_runs_all_jobs() {
    demo()
        .args(&[
            "--max-threads",
            "4",
            "--initial-threads",
            "2",
            "--jobs",
            "16",
            "--job-duration-ms",
            "5",
            "--settle-ms",
            "500",
        ])
        .assert()
        .success()
        .stdout(contains("executed 16 of 16 jobs, discarded 0"));
}

// `pool-demo --drain` with no settle time still runs every job.
#[test]
fn demo_drain_runs_queued_jobs() {
    demo()
        .args(&[
            "--max-threads",
            "1",
            "--initial-threads",
            "1",
            "--jobs",
            "5",
            "--job-duration-ms",
            "10",
            "--settle-ms",
            "0",
            "--drain",
        ])
        .assert()
        .success()
        .stdout(contains("executed 5 of 5 jobs"))
        .stdout(contains(r#""discarded":0"#));
}

// `pool-demo` rejects initial threads above the maximum.
#[test]
fn demo_rejects_invalid_limits() {
    demo()
        .args(&["--max-threads", "2", "--initial-threads", "3", "--jobs", "0"])
        .assert()
        .failure()
        .stderr(contains("Invalid argument"));
}

// `pool-demo --config <FILE>` reads limits from a JSON file.
#[test]
fn demo_reads_config_file() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let path = temp_dir.path().join("pool.json");
    fs::write(
        &path,
        r#"{ "max_threads": 3, "initial_threads": 3, "thread_name": "demo" }"#,
    )
    .unwrap();

    demo()
        .args(&["--jobs", "6", "--job-duration-ms", "1", "--settle-ms", "300"])
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(contains(r#""max_threads":3"#))
        .stdout(contains("executed 6 of 6 jobs"));
}

#[test]
fn config_from_file() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let path = temp_dir.path().join("pool.json");
    fs::write(
        &path,
        r#"{ "max_threads": 16, "initial_threads": 4, "stack_size": 65536, "shutdown_policy": "drain" }"#,
    )
    .unwrap();

    let config = PoolConfig::from_file(&path).unwrap();
    assert_eq!(config.max_threads, 16);
    assert_eq!(config.initial_threads, 4);
    assert_eq!(config.stack_size, Some(65536));
    assert_eq!(config.shutdown_policy, ShutdownPolicy::Drain);
    assert!(config.validate().is_ok());
}

#[test]
fn config_errors() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");

    let missing = temp_dir.path().join("missing.json");
    assert!(matches!(
        PoolConfig::from_file(&missing),
        Err(PoolError::Io(_))
    ));

    let garbage = temp_dir.path().join("garbage.json");
    fs::write(&garbage, "max_threads = 4").unwrap();
    assert!(matches!(
        PoolConfig::from_file(&garbage),
        Err(PoolError::Serde(_))
    ));
}
