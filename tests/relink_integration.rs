use std::fs;
use std::path::Path;

use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::str::contains;
use serde_json::{Value, json};
use tempfile::tempdir;

fn write_mapping(dir: &Path, mapping: Value) {
    fs::write(
        dir.join("parent_mapping.json"),
        serde_json::to_string_pretty(&mapping).unwrap(),
    )
    .unwrap();
}

fn node(id: &str, identifier: &str, key: &str, parent: Option<(&str, &str)>) -> Value {
    json!({
        "id": id,
        "identifier": identifier,
        "title": format!("Issue {identifier}"),
        "description": format!("[Imported from Height: {key}]\n\nBody"),
        "parent": parent.map(|(id, identifier)| json!({ "id": id, "identifier": identifier })),
    })
}

fn page(nodes: Vec<Value>, next: Option<&str>) -> Value {
    json!({
        "data": {
            "issues": {
                "nodes": nodes,
                "pageInfo": { "hasNextPage": next.is_some(), "endCursor": next }
            }
        }
    })
}

fn ferry(dir: &Path, server: &MockServer) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ferry"));
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env("FERRY_API_KEY", "lin_api_test");
    cmd.args(["--format", "json", "relink", "--api-url"])
        .arg(server.url("/graphql"));
    cmd
}

/// Two pages: ENG-1 (T-1), ENG-2 (T-2) then ENG-3 (T-3, already under ENG-1) and an untagged issue.
fn mock_listing(server: &MockServer) {
    server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .body_contains("IssuePage")
            .body_contains(r#""after":null"#);
        then.status(200).json_body(page(
            vec![
                node("u1", "ENG-1", "T-1", None),
                node("u2", "ENG-2", "T-2", None),
            ],
            Some("c1"),
        ));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .body_contains("IssuePage")
            .body_contains(r#""after":"c1""#);
        then.status(200).json_body(page(
            vec![
                node("u3", "ENG-3", "T-3", Some(("u1", "ENG-1"))),
                json!({
                    "id": "u4",
                    "identifier": "ENG-4",
                    "title": "Native",
                    "description": null,
                    "parent": null
                }),
            ],
            None,
        ));
    });
}

#[test]
fn confirmed_relink_updates_only_missing_links() {
    let dir = tempdir().unwrap();
    write_mapping(dir.path(), json!({ "T-2": "T-1", "T-3": "T-1" }));

    let server = MockServer::start();
    mock_listing(&server);
    let update = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .header("authorization", "lin_api_test")
            .body_contains("UpdateIssueParent")
            .body_contains(r#""issueId":"u2""#)
            .body_contains(r#""parentId":"u1""#);
        then.status(200).json_body(json!({
            "data": {
                "issueUpdate": {
                    "success": true,
                    "issue": {
                        "id": "u2",
                        "identifier": "ENG-2",
                        "parent": { "id": "u1", "identifier": "ENG-1" }
                    }
                }
            }
        }));
    });

    let output = ferry(dir.path(), &server)
        .write_stdin("\nyes\n")
        .assert()
        .success()
        .stderr(contains("Proceed with updates? (yes/no)"))
        .get_output()
        .stdout
        .clone();

    update.assert_hits(1);
    let report: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["status"], "applied");
    assert_eq!(report["issues_fetched"], 4);
    assert_eq!(report["tagged_issues"], 3);
    assert_eq!(report["already_linked"], 1);
    assert_eq!(report["applied"]["succeeded"], 1);
    assert_eq!(report["applied"]["failures"], json!([]));
}

#[test]
fn declined_confirmation_sends_no_mutation() {
    let dir = tempdir().unwrap();
    write_mapping(dir.path(), json!({ "T-2": "T-1" }));

    let server = MockServer::start();
    mock_listing(&server);
    let update = server.mock(|when, then| {
        when.method(POST).body_contains("UpdateIssueParent");
        then.status(200)
            .json_body(json!({ "data": { "issueUpdate": { "success": true } } }));
    });

    let output = ferry(dir.path(), &server)
        .write_stdin("\nno\n")
        .assert()
        .success()
        .stderr(contains("Aborted."))
        .get_output()
        .stdout
        .clone();

    update.assert_hits(0);
    let report: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["status"], "aborted");
}

#[test]
fn team_filter_is_sent_and_dry_run_skips_confirmation() {
    let dir = tempdir().unwrap();
    write_mapping(dir.path(), json!({ "T-2": "T-1", "T-5": "T-404" }));

    let server = MockServer::start();
    let listing = server.mock(|when, then| {
        when.method(POST)
            .body_contains("IssuePage")
            .body_contains(r#""eq":"ENG""#);
        then.status(200).json_body(page(
            vec![
                node("u1", "ENG-1", "T-1", None),
                node("u2", "ENG-2", "T-2", None),
                node("u5", "ENG-5", "T-5", None),
            ],
            None,
        ));
    });
    let update = server.mock(|when, then| {
        when.method(POST).body_contains("UpdateIssueParent");
        then.status(200)
            .json_body(json!({ "data": { "issueUpdate": { "success": true } } }));
    });

    let output = ferry(dir.path(), &server)
        .arg("--dry-run")
        .write_stdin("ENG\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    listing.assert_hits(1);
    update.assert_hits(0);
    let report: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["status"], "dry_run");
    assert_eq!(report["team_key"], "ENG");
    assert_eq!(report["planned"].as_array().unwrap().len(), 1);
    assert_eq!(report["missing_parent"][0]["child_key"], "T-5");
    assert_eq!(report["missing_parent"][0]["parent_key"], "T-404");
}

#[test]
fn failed_update_is_reported_without_stopping() {
    let dir = tempdir().unwrap();
    write_mapping(dir.path(), json!({ "T-2": "T-1" }));

    let server = MockServer::start();
    mock_listing(&server);
    server.mock(|when, then| {
        when.method(POST).body_contains("UpdateIssueParent");
        then.status(200).json_body(json!({
            "errors": [{ "message": "Entity not found" }]
        }));
    });

    let output = ferry(dir.path(), &server)
        .write_stdin("\nyes\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["applied"]["succeeded"], 0);
    let failure = &report["applied"]["failures"][0];
    assert_eq!(failure["child_identifier"], "ENG-2");
    assert!(failure["reason"].as_str().unwrap().contains("Entity not found"));
}

#[test]
fn missing_mapping_fails_before_any_request() {
    let dir = tempdir().unwrap();
    let server = MockServer::start();
    let any = server.mock(|when, then| {
        when.method(POST);
        then.status(200).json_body(json!({}));
    });

    ferry(dir.path(), &server)
        .write_stdin("\nyes\n")
        .assert()
        .failure()
        .stderr(contains("missing_edge_artifact"));
    any.assert_hits(0);
}

#[test]
fn no_tagged_issues_is_an_error() {
    let dir = tempdir().unwrap();
    write_mapping(dir.path(), json!({ "T-2": "T-1" }));

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).body_contains("IssuePage");
        then.status(200).json_body(page(
            vec![json!({
                "id": "u9",
                "identifier": "ENG-9",
                "title": "Native",
                "description": "written by hand",
                "parent": null
            })],
            None,
        ));
    });

    ferry(dir.path(), &server)
        .write_stdin("\nyes\n")
        .assert()
        .failure()
        .stderr(contains("no_tagged_issues"));
}
