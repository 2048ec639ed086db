//! Query engine counters
//!
//! - Counters only, monotonic
//! - Reset only on process start
//! - Thread-safe, Relaxed ordering

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for the query engine
///
/// Shared between executors through an `Arc`.
#[derive(Debug, Default)]
pub struct QueryMetrics {
    /// Queries that returned a result
    queries_executed: AtomicU64,
    /// Queries that failed compilation or hit a store error
    queries_rejected: AtomicU64,
    /// Queries aborted by cancellation or deadline
    queries_cancelled: AtomicU64,
    /// Records handed back by the store before residual filtering
    records_scanned: AtomicU64,
    /// Records returned after pagination
    records_returned: AtomicU64,
    /// Identifier batches fetched by relation lookups
    batches_fetched: AtomicU64,
    /// Filter leaves compiled into never-matching predicates
    unresolved_leaves: AtomicU64,
    /// Synthetic date records added to results
    synthetic_records: AtomicU64,
}

impl QueryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_cancelled(&self) {
        self.queries_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_records_scanned(&self, count: u64) {
        self.records_scanned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_records_returned(&self, count: u64) {
        self.records_returned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_batches_fetched(&self) {
        self.batches_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_unresolved_leaves(&self, count: u64) {
        self.unresolved_leaves.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_synthetic_records(&self, count: u64) {
        self.synthetic_records.fetch_add(count, Ordering::Relaxed);
    }

    pub fn queries_executed(&self) -> u64 {
        self.queries_executed.load(Ordering::Relaxed)
    }

    pub fn batches_fetched(&self) -> u64 {
        self.batches_fetched.load(Ordering::Relaxed)
    }

    /// Get all counters as a point-in-time snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            queries_cancelled: self.queries_cancelled.load(Ordering::Relaxed),
            records_scanned: self.records_scanned.load(Ordering::Relaxed),
            records_returned: self.records_returned.load(Ordering::Relaxed),
            batches_fetched: self.batches_fetched.load(Ordering::Relaxed),
            unresolved_leaves: self.unresolved_leaves.load(Ordering::Relaxed),
            synthetic_records: self.synthetic_records.load(Ordering::Relaxed),
        }
    }

    /// Render all counters as a single JSON object
    pub fn to_json(&self) -> String {
        let s = self.snapshot();
        format!(
            r#"{{"queries_executed":{},"queries_rejected":{},"queries_cancelled":{},"records_scanned":{},"records_returned":{},"batches_fetched":{},"unresolved_leaves":{},"synthetic_records":{}}}"#,
            s.queries_executed,
            s.queries_rejected,
            s.queries_cancelled,
            s.records_scanned,
            s.records_returned,
            s.batches_fetched,
            s.unresolved_leaves,
            s.synthetic_records,
        )
    }
}

/// A point-in-time copy of [`QueryMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub queries_rejected: u64,
    pub queries_cancelled: u64,
    pub records_scanned: u64,
    pub records_returned: u64,
    pub batches_fetched: u64,
    pub unresolved_leaves: u64,
    pub synthetic_records: u64,
}
