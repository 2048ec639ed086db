//! Sort request to comparison key extraction

use serde_json::{json, Value as Json};

use crate::model::{RelationFormat, Value};

use super::sort::{EmptyPlacement, SortDirection, SortRequest};

/// Natural-order comparison on one relation
#[derive(Debug, Clone, PartialEq)]
pub struct KeyOrder {
    pub relation_key: String,
    pub direction: SortDirection,
    pub format: RelationFormat,
    /// Dates compare with full precision instead of by day
    pub include_time: bool,
    pub empty_placement: Option<EmptyPlacement>,
}

/// Ranking by position in an explicit value list
#[derive(Debug, Clone, PartialEq)]
pub struct CustomOrder {
    pub relation_key: String,
    pub values: Vec<Value>,
}

/// One comparison key
#[derive(Debug, Clone, PartialEq)]
pub enum Order {
    Key(KeyOrder),
    Custom(CustomOrder),
}

impl Order {
    pub fn relation_key(&self) -> &str {
        match self {
            Order::Key(k) => &k.relation_key,
            Order::Custom(c) => &c.relation_key,
        }
    }

    /// Renders the key for `explain`
    pub fn to_json(&self) -> Json {
        match self {
            Order::Key(k) => json!({
                "relationKey": k.relation_key,
                "direction": match k.direction {
                    SortDirection::Asc => "asc",
                    SortDirection::Desc => "desc",
                },
                "format": k.format.as_str(),
                "includeTime": k.include_time,
            }),
            Order::Custom(c) => json!({
                "relationKey": c.relation_key,
                "customOrder": c.values.iter().map(Value::to_json).collect::<Vec<_>>(),
            }),
        }
    }
}

/// Comparison keys, primary first
pub type SetOrder = Vec<Order>;

/// Turns sort requests into comparison keys.
///
/// A lone date sort compares with full timestamp precision; an explicit
/// `include_time` is always honored; everything else compares dates by day.
/// Missing formats are treated as short text.
pub fn extract_order(sorts: &[SortRequest]) -> SetOrder {
    let single = sorts.len() == 1;
    sorts
        .iter()
        .map(|sort| {
            if !sort.custom_order.is_empty() {
                return Order::Custom(CustomOrder {
                    relation_key: sort.relation_key.clone(),
                    values: sort.custom_order.clone(),
                });
            }
            let format = sort.format.unwrap_or(RelationFormat::ShortText);
            Order::Key(KeyOrder {
                relation_key: sort.relation_key.clone(),
                direction: sort.direction,
                format,
                include_time: sort.include_time || (single && format == RelationFormat::Date),
                empty_placement: sort.empty_placement,
            })
        })
        .collect()
}
