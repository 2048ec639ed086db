//! Filter compilation errors
//!
//! Error codes:
//! - OBJQ_FILTER_INVALID
//! - OBJQ_FILTER_VALUE_REQUIRED
//! - OBJQ_FILTER_VALUE_INVALID
//! - OBJQ_CONDITION_UNSUPPORTED
//! - OBJQ_SORT_INVALID
//! - OBJQ_DEFAULT_FILTERS_INVALID

use std::fmt;

use crate::model::RelationFormat;

use super::request::Condition;

/// Compilation error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorCode {
    /// Malformed tree: missing key, empty combinator, misplaced fields
    FilterInvalid,
    /// A condition that needs a value was given none
    FilterValueRequired,
    /// The value does not fit the relation format
    FilterValueInvalid,
    /// Condition cannot be applied to the relation format
    ConditionUnsupported,
    /// Malformed sort request
    SortInvalid,
    /// Configured default filters are not plain leaves
    DefaultFiltersInvalid,
}

impl CompileErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            CompileErrorCode::FilterInvalid => "OBJQ_FILTER_INVALID",
            CompileErrorCode::FilterValueRequired => "OBJQ_FILTER_VALUE_REQUIRED",
            CompileErrorCode::FilterValueInvalid => "OBJQ_FILTER_VALUE_INVALID",
            CompileErrorCode::ConditionUnsupported => "OBJQ_CONDITION_UNSUPPORTED",
            CompileErrorCode::SortInvalid => "OBJQ_SORT_INVALID",
            CompileErrorCode::DefaultFiltersInvalid => "OBJQ_DEFAULT_FILTERS_INVALID",
        }
    }
}

impl fmt::Display for CompileErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A filter or sort request that cannot be compiled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    code: CompileErrorCode,
    message: String,
    relation_key: Option<String>,
}

impl CompileError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            code: CompileErrorCode::FilterInvalid,
            message: reason.into(),
            relation_key: None,
        }
    }

    pub fn value_required(relation_key: &str, condition: Condition) -> Self {
        Self {
            code: CompileErrorCode::FilterValueRequired,
            message: format!("condition {} requires a value", condition),
            relation_key: Some(relation_key.to_string()),
        }
    }

    pub fn value_invalid(relation_key: &str, reason: impl Into<String>) -> Self {
        Self {
            code: CompileErrorCode::FilterValueInvalid,
            message: reason.into(),
            relation_key: Some(relation_key.to_string()),
        }
    }

    pub fn condition_unsupported(
        relation_key: &str,
        condition: Condition,
        format: RelationFormat,
    ) -> Self {
        Self {
            code: CompileErrorCode::ConditionUnsupported,
            message: format!("condition {} does not apply to {} relations", condition, format),
            relation_key: Some(relation_key.to_string()),
        }
    }

    pub fn sort_invalid(reason: impl Into<String>) -> Self {
        Self {
            code: CompileErrorCode::SortInvalid,
            message: reason.into(),
            relation_key: None,
        }
    }

    pub fn default_filters_invalid(reason: impl Into<String>) -> Self {
        Self {
            code: CompileErrorCode::DefaultFiltersInvalid,
            message: reason.into(),
            relation_key: None,
        }
    }

    pub fn code(&self) -> CompileErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Relation the failing leaf targets, when there is one
    pub fn relation_key(&self) -> Option<&str> {
        self.relation_key.as_deref()
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(key) = &self.relation_key {
            write!(f, " (relation '{}')", key)?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileError {}

/// Result type for compilation
pub type CompileResult<T> = Result<T, CompileError>;
