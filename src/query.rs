//! Query description accepted by the engine

use serde::{Deserialize, Serialize};

use crate::filter::FilterRequest;
use crate::order::SortRequest;

/// A client query.
///
/// `limit == 0` means no limit (still capped by the configured maximum).
/// An empty `space_id` targets the store's own space.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Query {
    pub space_id: String,
    pub filters: Vec<FilterRequest>,
    pub sorts: Vec<SortRequest>,
    pub limit: usize,
    pub offset: usize,
    pub full_text: String,
}

impl Query {
    pub fn new(space_id: impl Into<String>) -> Self {
        Self {
            space_id: space_id.into(),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: FilterRequest) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_sort(mut self, sort: SortRequest) -> Self {
        self.sorts.push(sort);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_full_text(mut self, text: impl Into<String>) -> Self {
        self.full_text = text.into();
        self
    }
}
