//! Query Execution Tests
//!
//! Tests for the executor over snapshot-loaded stores:
//! - Pushdown and residual evaluation agree
//! - Synthetic date records are spliced or skipped
//! - Pagination and totals
//! - Deterministic results

use chrono::NaiveDate;
use objquery::config::EngineConfig;
use objquery::executor::{CancellationToken, ExecutionResult, QueryExecutor};
use objquery::filter::{Condition, FilterRequest};
use objquery::model::{Record, Value};
use objquery::order::SortRequest;
use objquery::query::Query;
use objquery::store::MemoryStore;
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn snapshot() -> serde_json::Value {
    json!({
        "spaceId": "space1",
        "relations": { "priority": "number", "status": "status", "tag": "tag" },
        "options": [
            { "id": "st-open", "relationKey": "status", "text": "Open" },
            { "id": "st-closed", "relationKey": "status", "text": "Closed" },
            { "id": "tg-red", "relationKey": "tag", "text": "Red", "color": "red" },
            { "id": "tg-blue", "relationKey": "tag", "text": "Blue", "color": "blue" }
        ],
        "records": [
            { "id": "n1", "name": "Weekly report", "priority": 3, "status": "st-open", "tag": ["tg-red"], "resolvedLayout": 0 },
            { "id": "n2", "name": "Groceries", "priority": 1, "status": "st-closed", "tag": ["tg-red", "tg-blue"], "resolvedLayout": 0 },
            { "id": "n3", "name": "Weekly review", "priority": 2, "status": "st-open", "resolvedLayout": 0, "description": "Notes from today" },
            { "id": "n4", "name": "Old draft", "priority": 5, "isArchived": true, "resolvedLayout": 0 },
            { "id": "n5", "name": "Backlog", "priority": 9, "status": "st-open", "resolvedLayout": 0 },
            { "id": "space", "name": "My space", "resolvedLayout": 10 }
        ]
    })
}

fn make_store() -> MemoryStore {
    MemoryStore::from_snapshot_json(&snapshot().to_string()).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
}

fn run(store: &MemoryStore, query: &Query) -> ExecutionResult {
    QueryExecutor::new(store)
        .with_today(today())
        .execute(query, &CancellationToken::new())
        .unwrap()
}

fn mixed_query() -> Query {
    Query::new("space1")
        .with_filter(FilterRequest::or(vec![
            FilterRequest::leaf("status", Condition::Equal, Value::id("st-open")),
            FilterRequest::leaf("tag", Condition::In, Value::ids(["tg-blue"])),
        ]))
        .with_filter(FilterRequest::leaf("priority", Condition::LessOrEqual, 3i64))
        .with_sort(SortRequest::asc("priority"))
}

// =============================================================================
// Pushdown / Residual Tests
// =============================================================================

/// Results do not depend on which predicates the store evaluates.
#[test]
fn test_residual_evaluation_matches_pushdown() {
    let pushed = run(&make_store(), &mixed_query());

    let residual_store = make_store()
        .without_condition(Condition::LessOrEqual)
        .without_condition(Condition::In);
    let residual = run(&residual_store, &mixed_query());

    assert_eq!(pushed.ids(), ["n2", "n3", "n1"]);
    assert_eq!(residual.ids(), pushed.ids());
    assert_eq!(pushed.scanned_count, 3);
    assert_eq!(residual.scanned_count, 4);
}

/// Running the same query twice yields the same page.
#[test]
fn test_execution_is_deterministic() {
    let store = make_store();
    let first = run(&store, &mixed_query());
    let second = run(&store, &mixed_query());
    assert_eq!(first.ids(), second.ids());
    assert_eq!(first.total, second.total);
}

/// An explicit archive filter supersedes the default.
#[test]
fn test_archived_objects_on_request() {
    let store = make_store();
    let query = Query::new("space1").with_filter(FilterRequest::leaf("isArchived", Condition::Equal, true));
    assert_eq!(run(&store, &query).ids(), ["n4"]);
}

/// Leaves carrying more values than the store accepts are evaluated in memory.
#[test]
fn test_oversized_leaf_becomes_residual() {
    let mut store = MemoryStore::new("space1").with_max_query_params(64);
    for i in 0..150 {
        store.insert(Record::new(format!("obj{:03}", i)).with("name", format!("Object {}", i)));
    }
    let ids: Vec<String> = (0..100).map(|i| format!("obj{:03}", i)).collect();
    let query = Query::new("space1").with_filter(FilterRequest::leaf("id", Condition::In, Value::strings(ids)));

    let result = run(&store, &query);

    assert_eq!(result.total, 100);
    assert_eq!(result.scanned_count, 150);
    assert_eq!(store.query_count(), 1);
}

// =============================================================================
// Full Text and Synthetic Record Tests
// =============================================================================

/// Full text searches name and description case-insensitively.
#[test]
fn test_full_text_search() {
    let store = make_store();
    let query = Query::new("space1")
        .with_full_text("weekly")
        .with_sort(SortRequest::desc("priority"));
    assert_eq!(run(&store, &query).ids(), ["n1", "n3"]);
}

/// A date typed as full text yields a synthetic date object ahead of matches.
#[test]
fn test_synthetic_date_record_prepended() {
    let store = make_store();
    let result = run(&store, &Query::new("space1").with_full_text("today"));

    assert_eq!(result.ids(), ["_date_2024-05-20", "n3"]);
    assert_eq!(result.synthetic_count, 1);
    assert_eq!(result.total, 2);
    assert_eq!(result.records[0].get_str("name"), Some("20 May 2024"));
}

/// Date object ids in an id filter yield synthetic records too.
#[test]
fn test_synthetic_records_from_id_filter() {
    let store = make_store();
    let query = Query::new("space1").with_filter(FilterRequest::leaf(
        "id",
        Condition::In,
        Value::strings(["n1", "_date_2024-01-01"]),
    ));
    let result = run(&store, &query);

    assert_eq!(result.ids(), ["_date_2024-01-01", "n1"]);
}

/// Synthetic records that fail the filters are dropped.
#[test]
fn test_synthetic_record_filtered_out() {
    let store = make_store();
    let query = Query::new("space1")
        .with_full_text("2024-05-01")
        .with_filter(FilterRequest::check("status", Condition::Exists));
    let result = run(&store, &query);
    assert!(result.is_empty());
    assert_eq!(result.synthetic_count, 0);
}

// =============================================================================
// Pagination Tests
// =============================================================================

/// Total counts every match; the page honors offset and limit.
#[test]
fn test_pagination_and_total() {
    let store = make_store();
    let query = Query::new("space1")
        .with_sort(SortRequest::asc("priority"))
        .with_offset(1)
        .with_limit(2);
    let result = run(&store, &query);

    assert_eq!(result.total, 4);
    assert_eq!(result.ids(), ["n3", "n1"]);
    assert!(result.limit_applied);
}

/// The configured maximum caps an unlimited query.
#[test]
fn test_max_limit_from_config() {
    let store = make_store();
    let config = EngineConfig::from_json_str(r#"{"max_limit": 1}"#).unwrap();
    let result = QueryExecutor::new(&store)
        .with_config(config)
        .execute(&Query::new(""), &CancellationToken::new())
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.total, 4);
    assert!(result.limit_applied);
}

/// Results serialize with records as flat JSON objects.
#[test]
fn test_result_serialization() {
    let store = make_store();
    let query = Query::new("space1").with_filter(FilterRequest::leaf("id", Condition::Equal, "n2"));
    let json = serde_json::to_value(run(&store, &query)).unwrap();

    assert_eq!(json["total"], 1);
    assert_eq!(json["records"][0]["name"], "Groceries");
    assert_eq!(json["records"][0]["tag"], json!(["tg-red", "tg-blue"]));
}
