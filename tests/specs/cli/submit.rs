// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `flow-submit` specs: the client's own error modes plus a full round trip
//! against a live driver.

use crate::prelude::{two_instance_spout_and_bolt_topology, DriverProcess};
use assert_cmd::Command;
use std::process::Output;

fn submit() -> Command {
    Command::cargo_bin("flow-submit").expect("locate flow-submit binary")
}

fn assert_fails_with(output: &Output, needle: &str) {
    assert!(!output.status.success(), "expected flow-submit to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(needle), "expected stderr to mention {needle:?}, got: {stderr}");
}

#[test]
fn missing_topology_file_fails_with_a_clear_message() {
    let output = submit().arg("/nonexistent/path/to/topology.json").output().expect("run flow-submit");
    assert_fails_with(&output, "reading topology file");
}

#[test]
fn malformed_topology_json_fails_before_connecting() {
    let file = tempfile::NamedTempFile::new().expect("create temp file");
    std::fs::write(file.path(), b"not json").expect("write temp file");

    let output = submit().arg(file.path()).output().expect("run flow-submit");
    assert_fails_with(&output, "parsing topology JSON");
}

#[test]
fn topology_with_no_spouts_is_rejected_locally() {
    let file = tempfile::NamedTempFile::new().expect("create temp file");
    std::fs::write(file.path(), br#"{"spouts":[],"bolts":[]}"#).expect("write temp file");

    let output = submit().arg(file.path()).output().expect("run flow-submit");
    assert_fails_with(&output, "topology failed validation");
}

#[test]
fn unreachable_driver_fails_with_a_connection_error() {
    let port = crate::prelude::free_port();
    let file = tempfile::NamedTempFile::new().expect("create temp file");
    let topology = two_instance_spout_and_bolt_topology();
    std::fs::write(file.path(), serde_json::to_vec(&topology).expect("serialize topology"))
        .expect("write temp file");

    let output = submit()
        .arg(file.path())
        .arg("--addr")
        .arg(format!("127.0.0.1:{port}"))
        .output()
        .expect("run flow-submit");
    assert_fails_with(&output, "connecting to");
}

#[tokio::test]
async fn successful_submission_prints_ok() {
    let driver = DriverProcess::spawn().await;
    let file = tempfile::NamedTempFile::new().expect("create temp file");
    let topology = two_instance_spout_and_bolt_topology();
    std::fs::write(file.path(), serde_json::to_vec(&topology).expect("serialize topology"))
        .expect("write temp file");

    // flow-submit is a blocking subprocess; run it on a blocking thread so
    // the driver's own async tasks keep making progress concurrently.
    let path = file.path().to_path_buf();
    let addr = driver.addr();
    let output = tokio::task::spawn_blocking(move || {
        submit().arg(&path).arg("--addr").arg(&addr).output().expect("run flow-submit")
    })
    .await
    .expect("join blocking submit task");

    assert!(output.status.success(), "flow-submit failed: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "OK");
}
