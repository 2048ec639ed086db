//! Identifier batching for relation lookups

use std::collections::HashSet;

/// Upper bound on identifiers per store query. The store's own parameter
/// limit lowers it further.
pub const ID_BATCH_SIZE: usize = 500;

/// Pages through an identifier list in fixed-size batches
#[derive(Debug, Clone)]
pub struct IdBatches<'a> {
    ids: &'a [String],
    size: usize,
    pos: usize,
}

impl<'a> IdBatches<'a> {
    /// `size` is clamped to at least 1
    pub fn new(ids: &'a [String], size: usize) -> Self {
        Self {
            ids,
            size: size.max(1),
            pos: 0,
        }
    }

    /// Total number of batches
    pub fn batch_count(&self) -> usize {
        self.ids.len().div_ceil(self.size)
    }
}

impl<'a> Iterator for IdBatches<'a> {
    type Item = &'a [String];

    fn next(&mut self) -> Option<&'a [String]> {
        if self.pos >= self.ids.len() {
            return None;
        }
        let end = (self.pos + self.size).min(self.ids.len());
        let batch = &self.ids[self.pos..end];
        self.pos = end;
        Some(batch)
    }
}

/// Drops repeated identifiers, keeping first occurrences in order
pub fn dedup_ids(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}
