//! Default predicates applied to every query
//!
//! The set is an explicit value handed to the compiler, so callers and
//! tests can substitute their own.

use serde::{Deserialize, Serialize};

use crate::model::bundle::{
    ObjectLayout, RELATION_IS_ARCHIVED, RELATION_IS_DELETED, RELATION_RESOLVED_LAYOUT,
};
use crate::model::{RelationFormat, Value};

use super::errors::{CompileError, CompileResult};
use super::request::{Condition, FilterRequest};

/// Ordered list of default leaf requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultFilters(Vec<FilterRequest>);

impl DefaultFilters {
    /// Hides archived objects, deleted objects and space objects
    pub fn standard() -> Self {
        Self(vec![
            FilterRequest::leaf(RELATION_IS_ARCHIVED, Condition::NotEqual, true)
                .with_format(RelationFormat::Checkbox),
            FilterRequest::leaf(RELATION_IS_DELETED, Condition::NotEqual, true)
                .with_format(RelationFormat::Checkbox),
            FilterRequest::leaf(
                RELATION_RESOLVED_LAYOUT,
                Condition::NotIn,
                Value::IntList(vec![
                    ObjectLayout::Space.code(),
                    ObjectLayout::SpaceView.code(),
                ]),
            )
            .with_format(RelationFormat::Number),
        ])
    }

    /// No default predicates at all
    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn new(leaves: Vec<FilterRequest>) -> Self {
        Self(leaves)
    }

    pub fn leaves(&self) -> &[FilterRequest] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every default must be a leaf with a relation key and a condition
    pub fn validate(&self) -> CompileResult<()> {
        for (i, leaf) in self.0.iter().enumerate() {
            if !leaf.is_leaf() || !leaf.nested_filters.is_empty() {
                return Err(CompileError::default_filters_invalid(format!(
                    "default filter {} is not a leaf",
                    i
                )));
            }
            if leaf.relation_key.is_empty() || leaf.condition.is_none() {
                return Err(CompileError::default_filters_invalid(format!(
                    "default filter {} needs a relation key and a condition",
                    i
                )));
            }
        }
        Ok(())
    }
}

impl Default for DefaultFilters {
    fn default() -> Self {
        Self::standard()
    }
}
