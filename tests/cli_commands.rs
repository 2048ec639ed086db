//! CLI Command Tests
//!
//! Tests for the objquery commands against snapshot files:
//! - query writes an ok response with records
//! - explain prints the compiled tree
//! - lookup pages identifiers
//! - failures produce an error response

use std::io::Write;

use objquery::cli::{execute_command, CliErrorCode, Command, StoreArgs};
use serde_json::{json, Value};
use tempfile::NamedTempFile;

// =============================================================================
// Helper Functions
// =============================================================================

fn write_json(value: &Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", value).unwrap();
    file
}

fn snapshot_file() -> NamedTempFile {
    write_json(&json!({
        "spaceId": "space1",
        "relations": { "priority": "number" },
        "records": [
            { "id": "a", "name": "Alpha", "priority": 2 },
            { "id": "b", "name": "Beta", "priority": 1 },
            { "id": "c", "name": "Gamma", "priority": 3, "isDeleted": true }
        ]
    }))
}

fn store_args(snapshot: &NamedTempFile, config: Option<&NamedTempFile>) -> StoreArgs {
    StoreArgs {
        store: snapshot.path().to_path_buf(),
        config: config.map(|c| c.path().to_path_buf()),
    }
}

fn run(command: Command, input: &str) -> (Result<(), objquery::cli::CliError>, Value) {
    let mut out = Vec::new();
    let result = execute_command(command, &mut input.as_bytes(), &mut out);
    let response = if out.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&out).unwrap()
    };
    (result, response)
}

// =============================================================================
// Command Tests
// =============================================================================

/// query prints matching records in sort order.
#[test]
fn test_query_command() {
    let snapshot = snapshot_file();
    let input = json!({ "sorts": [{ "relationKey": "priority" }] }).to_string();

    let (result, response) = run(
        Command::Query {
            store: store_args(&snapshot, None),
        },
        &input,
    );

    assert!(result.is_ok());
    assert_eq!(response["status"], "ok");
    assert_eq!(response["data"]["total"], 2);
    assert_eq!(response["data"]["records"][0]["id"], "b");
    assert_eq!(response["data"]["records"][1]["id"], "a");
}

/// explain prints the reconciled filter tree.
#[test]
fn test_explain_command() {
    let snapshot = snapshot_file();
    let input = json!({
        "filters": [{ "relationKey": "priority", "condition": "greater", "value": 1 }]
    })
    .to_string();

    let (result, response) = run(
        Command::Explain {
            store: store_args(&snapshot, None),
        },
        &input,
    );

    assert!(result.is_ok());
    let slots = response["data"]["filter"]["and"].as_array().unwrap();
    assert_eq!(slots.len(), 4);
    assert_eq!(response["data"]["order"], json!([]));
}

/// lookup restricts the query to the given identifiers.
#[test]
fn test_lookup_command() {
    let snapshot = snapshot_file();

    let (result, response) = run(
        Command::Lookup {
            store: store_args(&snapshot, None),
            relation: "id".to_string(),
            ids: vec!["a".into(), "c".into(), "zzz".into()],
        },
        "{}",
    );

    assert!(result.is_ok());
    assert_eq!(response["data"]["total"], 1);
    assert_eq!(response["data"]["records"][0]["id"], "a");
}

/// Config overrides replace the default predicates.
#[test]
fn test_config_default_filters() {
    let snapshot = snapshot_file();
    let config = write_json(&json!({ "default_filters": [], "log_level": "error" }));

    let (result, response) = run(
        Command::Query {
            store: store_args(&snapshot, Some(&config)),
        },
        "{}",
    );

    assert!(result.is_ok());
    assert_eq!(response["data"]["total"], 3);
}

// =============================================================================
// Failure Tests
// =============================================================================

/// Rejected queries produce an error response and a failed command.
#[test]
fn test_invalid_query_reports_error() {
    let snapshot = snapshot_file();
    let input = json!({ "filters": [{ "operator": "or" }] }).to_string();

    let (result, response) = run(
        Command::Query {
            store: store_args(&snapshot, None),
        },
        &input,
    );

    let err = result.unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::QueryFailed);
    assert_eq!(response["status"], "error");
    assert_eq!(response["code"], "OBJQ_FILTER_INVALID");
}

/// A space mismatch is a store error.
#[test]
fn test_space_mismatch() {
    let snapshot = snapshot_file();
    let (result, response) = run(
        Command::Query {
            store: store_args(&snapshot, None),
        },
        r#"{"spaceId": "other"}"#,
    );

    assert!(result.is_err());
    assert_eq!(response["code"], "OBJQ_STORE_SPACE_MISMATCH");
}

/// An unreadable snapshot fails before reading input.
#[test]
fn test_missing_snapshot() {
    let args = StoreArgs {
        store: "/nonexistent/snapshot.json".into(),
        config: None,
    };
    let (result, response) = run(Command::Query { store: args }, "{}");

    let err = result.unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::StoreError);
    assert_eq!(response, Value::Null);
}
