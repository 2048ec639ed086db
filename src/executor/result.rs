//! Result types for query execution

use serde::Serialize;

use crate::model::Record;

/// Result of query execution
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Records of the requested page, in result order
    pub records: Vec<Record>,
    /// Matching records before pagination, synthetic records included
    pub total: usize,
    /// Records handed back by the store before residual filtering
    pub scanned_count: usize,
    /// Synthetic date records spliced into the result
    pub synthetic_count: usize,
    /// Whether the page was cut short by the limit
    pub limit_applied: bool,
}

impl ExecutionResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records in the page
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Ids of the page, in order
    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(Record::id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result() {
        let result = ExecutionResult::empty();
        assert!(result.is_empty());
        assert_eq!(result.total, 0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let result = ExecutionResult {
            records: vec![Record::new("a")],
            total: 4,
            ..ExecutionResult::default()
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["total"], 4);
        assert_eq!(json["records"][0]["id"], "a");
        assert_eq!(json["scannedCount"], 0);
    }
}
