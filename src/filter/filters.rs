//! Compiled filters: predicate tree plus sort keys

use serde_json::{json, Value as Json};

use crate::model::Record;
use crate::options::OptionResolver;
use crate::order::SetOrder;

use super::node::FilterNode;

/// The compiled form of one query.
///
/// Built once per query and not modified afterwards. The root is always an
/// AND whose children are the reconciled default and user predicates.
#[derive(Debug, Clone)]
pub struct Filters {
    root: FilterNode,
    order: SetOrder,
    options: OptionResolver,
}

impl Filters {
    pub(crate) fn new(root: FilterNode, order: SetOrder, options: OptionResolver) -> Self {
        Self {
            root,
            order,
            options,
        }
    }

    /// Evaluates the whole predicate tree
    pub fn matches(&self, record: &Record) -> bool {
        self.root.matches(record)
    }

    pub fn root(&self) -> &FilterNode {
        &self.root
    }

    pub fn order(&self) -> &SetOrder {
        &self.order
    }

    /// Option tables loaded during compilation
    pub fn options(&self) -> &OptionResolver {
        &self.options
    }

    /// Number of top-level predicates (slots of the root AND)
    pub fn slot_count(&self) -> usize {
        self.root.children().len()
    }

    /// Leaves compiled into never-matching predicates
    pub fn unresolved_count(&self) -> usize {
        self.root
            .leaves()
            .iter()
            .filter(|leaf| leaf.is_unresolved())
            .count()
    }

    /// Renders the compiled query for `explain`
    pub fn to_json(&self) -> Json {
        json!({
            "filter": self.root.to_json(),
            "order": self.order.iter().map(|o| o.to_json()).collect::<Vec<_>>(),
        })
    }
}
