//! Client-supplied sort requests

use serde::{Deserialize, Serialize};

use crate::model::{RelationFormat, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Where absent or empty values go, independent of direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyPlacement {
    Start,
    End,
}

/// One sort criterion as requested by a client
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SortRequest {
    pub relation_key: String,
    /// Looked up from the store when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<RelationFormat>,
    pub direction: SortDirection,
    pub include_time: bool,
    /// Explicit ranking of values; takes precedence over natural order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_order: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_placement: Option<EmptyPlacement>,
}

impl SortRequest {
    pub fn asc(relation_key: impl Into<String>) -> Self {
        Self {
            relation_key: relation_key.into(),
            ..Self::default()
        }
    }

    pub fn desc(relation_key: impl Into<String>) -> Self {
        Self {
            relation_key: relation_key.into(),
            direction: SortDirection::Desc,
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: RelationFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_include_time(mut self) -> Self {
        self.include_time = true;
        self
    }

    pub fn with_custom_order(mut self, values: Vec<Value>) -> Self {
        self.custom_order = values;
        self
    }

    pub fn with_empty_placement(mut self, placement: EmptyPlacement) -> Self {
        self.empty_placement = Some(placement);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_request_defaults() {
        let sort: SortRequest = serde_json::from_value(json!({ "relationKey": "name" })).unwrap();
        assert_eq!(sort.direction, SortDirection::Asc);
        assert!(!sort.include_time);
        assert_eq!(sort.format, None);
        assert!(sort.custom_order.is_empty());
    }

    #[test]
    fn test_sort_request_full() {
        let sort: SortRequest = serde_json::from_value(json!({
            "relationKey": "due",
            "format": "date",
            "direction": "desc",
            "includeTime": true,
            "emptyPlacement": "end"
        }))
        .unwrap();
        assert_eq!(sort.format, Some(RelationFormat::Date));
        assert_eq!(sort.direction, SortDirection::Desc);
        assert!(sort.include_time);
        assert_eq!(sort.empty_placement, Some(EmptyPlacement::End));
    }
}
