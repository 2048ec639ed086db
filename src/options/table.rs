//! Relation options and per-relation option tables

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One selectable value of a status or tag relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationOption {
    pub id: String,
    pub relation_key: String,
    pub text: String,
    #[serde(default)]
    pub color: String,
}

impl RelationOption {
    pub fn new(
        id: impl Into<String>,
        relation_key: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            relation_key: relation_key.into(),
            text: text.into(),
            color: String::new(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

/// Read-only id index over the options of a single relation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionTable {
    relation_key: String,
    by_id: HashMap<String, RelationOption>,
}

impl OptionTable {
    /// Builds a table, keeping only options that belong to `relation_key`
    pub fn new(relation_key: impl Into<String>, options: Vec<RelationOption>) -> Self {
        let relation_key = relation_key.into();
        let by_id = options
            .into_iter()
            .filter(|o| o.relation_key == relation_key)
            .map(|o| (o.id.clone(), o))
            .collect();
        Self {
            relation_key,
            by_id,
        }
    }

    pub fn relation_key(&self) -> &str {
        &self.relation_key
    }

    pub fn get(&self, option_id: &str) -> Option<&RelationOption> {
        self.by_id.get(option_id)
    }

    pub fn contains(&self, option_id: &str) -> bool {
        self.by_id.contains_key(option_id)
    }

    /// Text of an option, None when the id does not resolve
    pub fn text(&self, option_id: &str) -> Option<&str> {
        self.get(option_id).map(|o| o.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
