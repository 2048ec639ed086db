//! Option resolution for status and tag relations
//!
//! Tables are loaded from the store once per relation key and cached for the
//! lifetime of the resolver (one query compilation).

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::model::Value;
use crate::store::{ObjectStore, StoreResult};
use crate::text::truncate_ellipsized;

use super::table::{OptionTable, RelationOption};

/// Failure to resolve an option reference
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// No table has been loaded for the relation
    #[error("no options loaded for relation '{0}'")]
    RelationNotLoaded(String),

    /// The id is not an option of the relation
    #[error("option '{option_id}' not found for relation '{relation_key}'")]
    OptionNotFound {
        relation_key: String,
        option_id: String,
    },
}

/// Cached lookup from (relation key, option id) to option
#[derive(Debug, Clone, Default)]
pub struct OptionResolver {
    tables: HashMap<String, Arc<OptionTable>>,
}

impl OptionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads (or returns the cached) option table for a relation
    pub fn load<S: ObjectStore + ?Sized>(
        &mut self,
        store: &S,
        relation_key: &str,
    ) -> StoreResult<Arc<OptionTable>> {
        if let Some(table) = self.tables.get(relation_key) {
            return Ok(Arc::clone(table));
        }
        let options = store.list_relation_options(relation_key)?;
        let table = Arc::new(OptionTable::new(relation_key, options));
        self.tables
            .insert(relation_key.to_string(), Arc::clone(&table));
        Ok(table)
    }

    /// Registers an already built table
    pub fn insert(&mut self, table: OptionTable) {
        self.tables
            .insert(table.relation_key().to_string(), Arc::new(table));
    }

    pub fn table(&self, relation_key: &str) -> Option<&Arc<OptionTable>> {
        self.tables.get(relation_key)
    }

    /// Resolves one option id
    pub fn resolve(
        &self,
        relation_key: &str,
        option_id: &str,
    ) -> Result<&RelationOption, ResolutionError> {
        let table = self
            .tables
            .get(relation_key)
            .ok_or_else(|| ResolutionError::RelationNotLoaded(relation_key.to_string()))?;
        table
            .get(option_id)
            .ok_or_else(|| ResolutionError::OptionNotFound {
                relation_key: relation_key.to_string(),
                option_id: option_id.to_string(),
            })
    }

    /// Display text for a stored status/tag value.
    ///
    /// Resolved option texts are joined with ", " and truncated to
    /// `max_len` UTF-16 units. Unresolvable ids are skipped. Returns None
    /// when nothing resolves.
    pub fn display_text(&self, relation_key: &str, value: &Value, max_len: usize) -> Option<String> {
        let texts: Vec<&str> = value
            .elements()
            .filter_map(|e| e.as_str())
            .filter_map(|id| self.resolve(relation_key, id).ok())
            .map(|o| o.text.as_str())
            .collect();
        if texts.is_empty() {
            return None;
        }
        Some(truncate_ellipsized(&texts.join(", "), max_len))
    }
}
