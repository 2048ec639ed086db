//! In-memory object store
//!
//! Serves one space from records held in memory. Evaluates compiled filter
//! trees natively, optionally refusing some conditions so callers exercise
//! residual evaluation. Can be loaded from a JSON snapshot:
//!
//! ```json
//! {
//!   "spaceId": "space1",
//!   "relations": { "priority": "number" },
//!   "options": [ { "id": "opt1", "relationKey": "status", "text": "Done" } ],
//!   "records": [ { "id": "obj1", "name": "First", "priority": 2 } ]
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Deserialize;
use serde_json::{Map, Value as Json};

use crate::filter::{Condition, FilterNode};
use crate::model::{bundle, Record, RelationFormat};
use crate::observability::{log_event_with_fields, Event};
use crate::options::RelationOption;

use super::errors::{StoreError, StoreResult};
use super::traits::ObjectStore;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    space_id: String,
    #[serde(default)]
    relations: HashMap<String, RelationFormat>,
    #[serde(default)]
    options: Vec<RelationOption>,
    #[serde(default)]
    records: Vec<Map<String, Json>>,
}

/// Object store backed by a vector of records
#[derive(Debug)]
pub struct MemoryStore {
    space_id: String,
    records: Vec<Record>,
    positions: HashMap<String, usize>,
    formats: HashMap<String, RelationFormat>,
    options: Vec<RelationOption>,
    max_query_params: usize,
    unsupported: HashSet<Condition>,
    queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new(space_id: impl Into<String>) -> Self {
        Self {
            space_id: space_id.into(),
            records: Vec::new(),
            positions: HashMap::new(),
            formats: HashMap::new(),
            options: Vec::new(),
            max_query_params: usize::MAX,
            unsupported: HashSet::new(),
            queries: AtomicUsize::new(0),
        }
    }

    /// Parses a snapshot document
    pub fn from_snapshot_json(raw: &str) -> StoreResult<Self> {
        let snapshot: Snapshot =
            serde_json::from_str(raw).map_err(|e| StoreError::InvalidSnapshot(e.to_string()))?;

        let mut store = Self::new(snapshot.space_id);
        store.formats = snapshot.relations;
        store.options = snapshot.options;

        for (index, object) in snapshot.records.iter().enumerate() {
            let record = Record::from_json_object(object, |key| store.format_or_text(key))
                .map_err(|reason| StoreError::InvalidSnapshot(format!("record {}: {}", index, reason)))?;
            store.insert(record);
        }
        Ok(store)
    }

    /// Reads and parses a snapshot file
    pub fn load(path: &Path) -> StoreResult<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            StoreError::InvalidSnapshot(format!("failed to read {}: {}", path.display(), e))
        })?;
        let store = Self::from_snapshot_json(&raw)?;

        let shown = path.display().to_string();
        let records = store.len().to_string();
        log_event_with_fields(
            Event::StoreLoaded,
            &[
                ("path", shown.as_str()),
                ("space_id", store.space_id.as_str()),
                ("records", records.as_str()),
            ],
        );
        Ok(store)
    }

    /// Inserts or replaces a record by id
    pub fn insert(&mut self, record: Record) {
        match self.positions.get(record.id()) {
            Some(&pos) => self.records[pos] = record,
            None => {
                self.positions
                    .insert(record.id().to_string(), self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn with_record(mut self, record: Record) -> Self {
        self.insert(record);
        self
    }

    /// Declares the format of a relation
    pub fn with_relation(mut self, key: impl Into<String>, format: RelationFormat) -> Self {
        self.formats.insert(key.into(), format);
        self
    }

    pub fn with_option(mut self, option: RelationOption) -> Self {
        self.options.push(option);
        self
    }

    /// Caps the number of values a single `In`-style leaf may carry
    pub fn with_max_query_params(mut self, max: usize) -> Self {
        self.max_query_params = max;
        self
    }

    /// Marks a condition as not evaluable natively
    pub fn without_condition(mut self, condition: Condition) -> Self {
        self.unsupported.insert(condition);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.positions.get(id).map(|&pos| &self.records[pos])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of `query_raw` calls served so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    fn format_or_text(&self, key: &str) -> RelationFormat {
        self.relation_format_by_key(key)
            .unwrap_or(RelationFormat::ShortText)
    }
}

impl ObjectStore for MemoryStore {
    fn space_id(&self) -> &str {
        &self.space_id
    }

    fn query_raw(
        &self,
        filter: &FilterNode,
        limit: usize,
        offset: usize,
    ) -> StoreResult<Vec<Record>> {
        self.queries.fetch_add(1, Ordering::Relaxed);

        for leaf in filter.leaves() {
            if self.unsupported.contains(&leaf.condition()) {
                return Err(StoreError::Backend(format!(
                    "condition {} is not supported",
                    leaf.condition()
                )));
            }
            let params = leaf.value().map_or(0, |v| v.len());
            if params > self.max_query_params {
                return Err(StoreError::Backend(format!(
                    "too many query parameters: {} (max {})",
                    params, self.max_query_params
                )));
            }
        }

        let matching = self
            .records
            .iter()
            .filter(|record| filter.matches(record))
            .skip(offset);
        let records = if limit == 0 {
            matching.cloned().collect()
        } else {
            matching.take(limit).cloned().collect()
        };
        Ok(records)
    }

    fn relation_format_by_key(&self, key: &str) -> StoreResult<RelationFormat> {
        self.formats
            .get(key)
            .copied()
            .or_else(|| bundle::relation_format(key))
            .ok_or_else(|| StoreError::UnknownRelation(key.to_string()))
    }

    fn list_relation_options(&self, key: &str) -> StoreResult<Vec<RelationOption>> {
        Ok(self
            .options
            .iter()
            .filter(|o| o.relation_key == key)
            .cloned()
            .collect())
    }

    fn max_query_params(&self) -> usize {
        self.max_query_params
    }

    fn supports(&self, node: &FilterNode) -> bool {
        node.leaves().iter().all(|leaf| {
            !self.unsupported.contains(&leaf.condition())
                && leaf.value().map_or(0, |v| v.len()) <= self.max_query_params
        })
    }
}
