//! Integration tests for the ontopub binary
//!
//! Runs the built binary against a canned in-process server and checks
//! exit codes, stderr error kinds and the order of requests on the wire.

#[path = "../common/mod.rs"]
mod common;

use common::canned::{canned_server, request_lines, COUNT_42};
use std::path::Path;
use std::process::Output;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::process::Command;

const ONTOPUB: &str = env!("CARGO_BIN_EXE_ontopub");

const COUNT_7: &str = r#"{"head":{"vars":["count"]},"results":{"bindings":[{"count":{"type":"literal","value":"7"}}]}}"#;
const COUNT_3: &str = r#"{"head":{"vars":["count"]},"results":{"bindings":[{"count":{"type":"literal","value":"3"}}]}}"#;

/// Binary with a clean FUSEKI_* environment pointed at `base_url`
fn ontopub(base_url: &str) -> Command {
    let mut cmd = Command::new(ONTOPUB);
    for (key, _) in std::env::vars() {
        if key.starts_with("FUSEKI_") {
            cmd.env_remove(key);
        }
    }
    cmd.env("NO_COLOR", "1")
        .env("RUST_LOG", "off")
        .env("FUSEKI_POLL_INTERVAL_SECS", "0.05")
        .arg("--url")
        .arg(base_url)
        .kill_on_drop(true);
    cmd
}

async fn run(mut cmd: Command) -> Output {
    let output = cmd.output().await.expect("Failed to run ontopub");
    if !output.status.success() {
        eprintln!("STDOUT:\n{}", String::from_utf8_lossy(&output.stdout));
        eprintln!("STDERR:\n{}", String::from_utf8_lossy(&output.stderr));
    }
    output
}

fn write_core(dir: &Path) -> String {
    let path = dir.join("core.ttl");
    std::fs::write(&path, "<http://example.org/a> <http://example.org/b> <http://example.org/c> .\n").unwrap();
    path.display().to_string()
}

#[tokio::test]
async fn test_missing_artifact_exits_with_artifact_not_found() {
    let (base, recorded) = canned_server(vec![
        (200, ""), // ping
        (409, "Name already registered"),
    ])
    .await;
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.ttl");

    let mut cmd = ontopub(&base);
    cmd.arg("publish").arg(format!("{}=http://example.org/core", missing.display()));
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ArtifactNotFound"), "stderr: {}", stderr);

    let lines = request_lines(&recorded);
    assert!(lines.iter().all(|l| !l.contains("/data")), "nothing uploaded: {:?}", lines);
}

#[tokio::test]
async fn test_publish_batch_succeeds() {
    let (base, _recorded) = canned_server(vec![
        (200, ""), // ping
        (200, ""), // create dataset
        (201, ""), // upload
        (200, COUNT_42),
        (200, COUNT_7),
        (200, COUNT_3),
    ])
    .await;
    let temp = TempDir::new().unwrap();
    let core = write_core(temp.path());

    let mut cmd = ontopub(&base);
    cmd.arg("publish").arg(format!("{}=http://example.org/core", core));
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("42 triples"), "stdout: {}", stdout);
    assert!(stdout.contains("1 of 1 published"), "stdout: {}", stdout);
}

#[tokio::test]
async fn test_publish_ensures_dataset_before_upload() {
    let (base, recorded) = canned_server(vec![
        (200, ""),
        (200, ""),
        (201, ""),
        (200, COUNT_42),
        (200, COUNT_7),
        (200, COUNT_3),
    ])
    .await;
    let temp = TempDir::new().unwrap();
    let core = write_core(temp.path());

    let mut cmd = ontopub(&base);
    cmd.args(["--dataset", "ontologies", "publish"])
        .arg(format!("{}=http://example.org/core", core));
    let output = run(cmd).await;
    assert!(output.status.success());

    let lines = request_lines(&recorded);
    assert!(lines[0].starts_with("get /$/ping"), "got {:?}", lines);
    assert!(lines[1].starts_with("post /$/datasets"), "got {:?}", lines);
    assert!(lines[2].starts_with("post /ontologies/data?graph="), "got {:?}", lines);
}

#[tokio::test]
async fn test_unreachable_server_fails_before_upload() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let temp = TempDir::new().unwrap();
    let core = write_core(temp.path());

    let mut cmd = ontopub(&base);
    cmd.env("FUSEKI_READY_TIMEOUT_SECS", "0.3")
        .arg("publish")
        .arg(format!("{}=http://example.org/core", core));
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("InfrastructureUnreachable"), "stderr: {}", stderr);
    assert!(!stderr.contains("UploadRejected"), "stderr: {}", stderr);
}

#[tokio::test]
async fn test_json_output_lists_every_failure() {
    let (base, _recorded) = canned_server(vec![(200, ""), (200, "")]).await;
    let temp = TempDir::new().unwrap();
    let first = temp.path().join("first.ttl");
    let second = temp.path().join("second.ttl");

    let mut cmd = ontopub(&base);
    cmd.args(["publish", "--json", "--continue-on-error"])
        .arg(format!("{}=http://example.org/first", first.display()))
        .arg(format!("{}=http://example.org/second", second.display()));
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let failures = report["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0]["kind"], "ArtifactNotFound");
    assert_eq!(failures[0]["phase"], "validate");
    assert_eq!(failures[1]["graph"], "http://example.org/second");
    assert!(report["published"].as_array().unwrap().is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("first.ttl"), "stderr: {}", stderr);
    assert!(stderr.contains("second.ttl"), "stderr: {}", stderr);
}

#[tokio::test]
async fn test_clear_requires_confirmation() {
    let (base, recorded) = canned_server(vec![(200, "")]).await;

    let mut cmd = ontopub(&base);
    cmd.args(["clear", "--graph", "http://example.org/core"]);
    let output = run(cmd).await;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--yes"), "stderr: {}", stderr);
    assert!(recorded.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_clear_rejects_injected_graph_iri() {
    let (base, recorded) = canned_server(vec![(200, "")]).await;

    let mut cmd = ontopub(&base);
    cmd.args(["clear", "--yes", "--graph", "http://a> ; DROP ALL ; CLEAR GRAPH <http://b"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("InvalidInput"), "stderr: {}", stderr);
    assert!(recorded.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_check_extends_reports_subclass_links() {
    let (base, recorded) = canned_server(vec![(200, COUNT_3)]).await;

    let mut cmd = ontopub(&base);
    cmd.args([
        "check",
        "--extends",
        "https://example.org/sow#=https://w3id.org/semanticarts/ontology/gistCore#",
    ]);
    let output = run(cmd).await;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("3 subclass links"), "stdout: {}", stdout);

    let lines = request_lines(&recorded);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("get /ontologies/sparql?query="), "got {:?}", lines);
}
