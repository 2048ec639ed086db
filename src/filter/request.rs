//! Client-supplied filter requests

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{RelationFormat, Value};

/// Combinator of a filter request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// A leaf
    #[default]
    No,
    And,
    Or,
}

/// Leaf condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Condition {
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
    Like,
    NotLike,
    In,
    NotIn,
    Exists,
    NotExists,
    Empty,
    NotEmpty,
    AllIn,
    NotAllIn,
    ExactIn,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Equal => "equal",
            Condition::NotEqual => "notEqual",
            Condition::Greater => "greater",
            Condition::Less => "less",
            Condition::GreaterOrEqual => "greaterOrEqual",
            Condition::LessOrEqual => "lessOrEqual",
            Condition::Like => "like",
            Condition::NotLike => "notLike",
            Condition::In => "in",
            Condition::NotIn => "notIn",
            Condition::Exists => "exists",
            Condition::NotExists => "notExists",
            Condition::Empty => "empty",
            Condition::NotEmpty => "notEmpty",
            Condition::AllIn => "allIn",
            Condition::NotAllIn => "notAllIn",
            Condition::ExactIn => "exactIn",
        }
    }

    /// False for the presence conditions, which ignore the value
    pub fn needs_value(&self) -> bool {
        !matches!(
            self,
            Condition::Exists | Condition::NotExists | Condition::Empty | Condition::NotEmpty
        )
    }

    /// Conditions whose filter value is a set
    pub fn is_list_condition(&self) -> bool {
        matches!(
            self,
            Condition::In
                | Condition::NotIn
                | Condition::AllIn
                | Condition::NotAllIn
                | Condition::ExactIn
        )
    }

    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Condition::Greater
                | Condition::Less
                | Condition::GreaterOrEqual
                | Condition::LessOrEqual
        )
    }

    /// Negated conditions hold exactly when their positive form does not
    pub fn is_negated(&self) -> bool {
        matches!(
            self,
            Condition::NotEqual | Condition::NotLike | Condition::NotIn | Condition::NotAllIn
        )
    }

    /// Whether the condition can be applied to a relation of `format`
    pub fn supports(&self, format: RelationFormat) -> bool {
        use RelationFormat::*;
        match self {
            c if c.is_ordering() => !matches!(
                format,
                Checkbox | Status | Tag | Object | File | Relations
            ),
            Condition::Like | Condition::NotLike => !matches!(format, Number | Date | Checkbox),
            Condition::AllIn | Condition::NotAllIn | Condition::ExactIn => {
                !matches!(format, Number | Date | Checkbox)
            }
            _ => true,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One node of a client filter tree.
///
/// Leaves carry `relation_key` and `condition`; combinators (`and`/`or`)
/// carry only `nested_filters`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterRequest {
    pub operator: FilterOperator,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub relation_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<RelationFormat>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested_filters: Vec<FilterRequest>,
}

impl FilterRequest {
    /// A leaf comparing a relation against a value
    pub fn leaf(
        relation_key: impl Into<String>,
        condition: Condition,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            relation_key: relation_key.into(),
            condition: Some(condition),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// A leaf without a value (Exists, Empty, ...)
    pub fn check(relation_key: impl Into<String>, condition: Condition) -> Self {
        Self {
            relation_key: relation_key.into(),
            condition: Some(condition),
            ..Self::default()
        }
    }

    pub fn and(nested: Vec<FilterRequest>) -> Self {
        Self {
            operator: FilterOperator::And,
            nested_filters: nested,
            ..Self::default()
        }
    }

    pub fn or(nested: Vec<FilterRequest>) -> Self {
        Self {
            operator: FilterOperator::Or,
            nested_filters: nested,
            ..Self::default()
        }
    }

    /// Declares the relation format explicitly
    pub fn with_format(mut self, format: RelationFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.operator == FilterOperator::No
    }
}
