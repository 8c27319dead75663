//! End-to-end tests for the keyturn binary
//!
//! Built without the `aws` feature: runs pass `--dry-run` to reach the
//! in-memory backends, and runs without it must refuse.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn keyturn() -> Command {
    let mut cmd = Command::cargo_bin("keyturn").unwrap();
    cmd.env_remove("KEYTURN_CONFIG")
        .env("KEYTURN_LOG", "info")
        .env("KEYTURN_LOG_COLORS", "false");
    cmd
}

#[test]
fn test_create_dry_run_succeeds() {
    keyturn()
        .args(["--dry-run", "create", "svc-app"])
        .assert()
        .success()
        .stdout(predicate::eq("{\"status\":200}\n"))
        .stderr(predicate::str::contains("in-memory backends"));
}

#[cfg(not(feature = "aws"))]
#[test]
fn test_without_cloud_backends_requires_dry_run() {
    for args in [
        vec!["create", "svc-app"],
        vec!["deactivate", "svc-app"],
        vec!["delete", "svc-app"],
    ] {
        keyturn()
            .args(&args)
            .assert()
            .code(1)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("pass --dry-run"));
    }

    keyturn()
        .arg("handle")
        .write_stdin(r#"{"action":"create","username":"svc-app"}"#)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_unrecognized_action_from_stdin_fails() {
    keyturn()
        .args(["--dry-run", "handle"])
        .write_stdin(r#"{"action":"rotate","username":"svc-app"}"#)
        .assert()
        .code(1)
        .stdout(predicate::eq("{\"status\":500}\n"))
        .stderr(predicate::str::contains("Detected action"));
}

#[test]
fn test_handle_reads_event_file() {
    let mut event = tempfile::NamedTempFile::new().unwrap();
    write!(event, r#"{{"action":"create","username":"svc-app"}}"#).unwrap();

    keyturn()
        .args(["--dry-run", "handle", "--event"])
        .arg(event.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\":200"));
}

#[test]
fn test_non_json_request_is_refused() {
    keyturn()
        .args(["--dry-run", "handle"])
        .write_stdin("create svc-app")
        .assert()
        .code(1)
        .stdout(predicate::eq("{\"status\":500}\n"));
}

#[test]
fn test_deactivate_without_previous_key_fails() {
    keyturn()
        .args(["--dry-run", "deactivate", "svc-app"])
        .assert()
        .code(1)
        .stdout(predicate::eq("{\"status\":500}\n"));
}

#[test]
fn test_invalid_config_is_reported() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "[rotation]\ngrace_period_days = 0").unwrap();

    keyturn()
        .arg("--config")
        .arg(config.path())
        .args(["--dry-run", "create", "svc-app"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("grace_period_days"));
}
