//! Compiled predicate tree
//!
//! Nodes are immutable once compiled. Evaluation is a single recursive
//! walk; leaves carry everything they need (normalized value, format,
//! option table) so the tree can be evaluated without the store.

use std::sync::Arc;

use regex::Regex;
use serde_json::{json, Value as Json};

use crate::model::{day_start, Record, RelationFormat, Scalar, Value};
use crate::options::OptionTable;

use super::request::Condition;

/// A compiled predicate
#[derive(Debug, Clone)]
pub enum FilterNode {
    And(Vec<FilterNode>),
    Or(Vec<FilterNode>),
    Leaf(FilterLeaf),
}

impl FilterNode {
    /// Evaluates the predicate against a record
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            FilterNode::And(children) => children.iter().all(|c| c.matches(record)),
            FilterNode::Or(children) => children.iter().any(|c| c.matches(record)),
            FilterNode::Leaf(leaf) => leaf.matches(record),
        }
    }

    /// Direct children of a combinator (empty for leaves)
    pub fn children(&self) -> &[FilterNode] {
        match self {
            FilterNode::And(children) | FilterNode::Or(children) => children,
            FilterNode::Leaf(_) => &[],
        }
    }

    pub fn as_leaf(&self) -> Option<&FilterLeaf> {
        match self {
            FilterNode::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// All leaves, depth first
    pub fn leaves(&self) -> Vec<&FilterLeaf> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a FilterLeaf>) {
        match self {
            FilterNode::Leaf(leaf) => out.push(leaf),
            FilterNode::And(children) | FilterNode::Or(children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// Renders the tree for `explain`
    pub fn to_json(&self) -> Json {
        match self {
            FilterNode::And(children) => {
                json!({ "and": children.iter().map(FilterNode::to_json).collect::<Vec<_>>() })
            }
            FilterNode::Or(children) => {
                json!({ "or": children.iter().map(FilterNode::to_json).collect::<Vec<_>>() })
            }
            FilterNode::Leaf(leaf) => leaf.to_json(),
        }
    }
}

/// A single relation/condition/value test
#[derive(Debug, Clone)]
pub struct FilterLeaf {
    relation_key: String,
    condition: Condition,
    value: Option<Value>,
    format: RelationFormat,
    matcher: Option<Regex>,
    options: Option<Arc<OptionTable>>,
    unresolved: bool,
}

impl FilterLeaf {
    /// Builds a leaf from an already normalized value
    pub(crate) fn new(
        relation_key: impl Into<String>,
        condition: Condition,
        value: Option<Value>,
        format: RelationFormat,
    ) -> Self {
        Self {
            relation_key: relation_key.into(),
            condition,
            value,
            format,
            matcher: None,
            options: None,
            unresolved: false,
        }
    }

    pub(crate) fn with_matcher(mut self, matcher: Regex) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub(crate) fn with_options(mut self, table: Arc<OptionTable>) -> Self {
        self.options = Some(table);
        self
    }

    /// Marks the leaf as never matching
    pub(crate) fn unresolved(mut self) -> Self {
        self.unresolved = true;
        self
    }

    pub fn relation_key(&self) -> &str {
        &self.relation_key
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn format(&self) -> RelationFormat {
        self.format
    }

    pub fn is_unresolved(&self) -> bool {
        self.unresolved
    }

    /// Evaluates the leaf. Unresolved leaves never match.
    pub fn matches(&self, record: &Record) -> bool {
        if self.unresolved {
            return false;
        }
        let stored = record.get(&self.relation_key);
        match self.condition {
            Condition::Exists => stored.is_some(),
            Condition::NotExists => stored.is_none(),
            Condition::Empty => self.is_empty(stored),
            Condition::NotEmpty => !self.is_empty(stored),
            c if c.is_negated() => !self.holds(stored),
            _ => self.holds(stored),
        }
    }

    /// Positive form of the condition; absent values never hold
    fn holds(&self, stored: Option<&Value>) -> bool {
        let (Some(stored), Some(filter)) = (stored, self.value.as_ref()) else {
            return false;
        };
        if matches!(self.condition, Condition::Like | Condition::NotLike) {
            return self.like(stored);
        }

        let actual = self.stored_elements(stored);
        let wanted: Vec<Scalar<'_>> = filter.elements().collect();

        match self.condition {
            Condition::Equal | Condition::NotEqual => {
                if filter.is_list() {
                    actual.len() == wanted.len()
                        && actual.iter().zip(&wanted).all(|(a, w)| a.same(w))
                } else {
                    actual.iter().any(|a| wanted.iter().any(|w| a.same(w)))
                }
            }
            Condition::Greater => self.any_ordered(&actual, &wanted, |o| o.is_gt()),
            Condition::Less => self.any_ordered(&actual, &wanted, |o| o.is_lt()),
            Condition::GreaterOrEqual => self.any_ordered(&actual, &wanted, |o| o.is_ge()),
            Condition::LessOrEqual => self.any_ordered(&actual, &wanted, |o| o.is_le()),
            Condition::In | Condition::NotIn => {
                actual.iter().any(|a| wanted.iter().any(|w| a.same(w)))
            }
            Condition::AllIn | Condition::NotAllIn => {
                wanted.iter().all(|w| actual.iter().any(|a| a.same(w)))
            }
            Condition::ExactIn => {
                wanted.iter().all(|w| actual.iter().any(|a| a.same(w)))
                    && actual.iter().all(|a| wanted.iter().any(|w| a.same(w)))
            }
            _ => false,
        }
    }

    fn any_ordered(
        &self,
        actual: &[Scalar<'_>],
        wanted: &[Scalar<'_>],
        accept: impl Fn(std::cmp::Ordering) -> bool,
    ) -> bool {
        let Some(bound) = wanted.first() else {
            return false;
        };
        actual
            .iter()
            .any(|a| a.compare(bound).map_or(false, &accept))
    }

    /// Case-insensitive substring match; option relations match option text
    fn like(&self, stored: &Value) -> bool {
        let Some(matcher) = &self.matcher else {
            return false;
        };
        match &self.options {
            Some(table) => stored
                .elements()
                .filter_map(|e| e.as_str())
                .filter_map(|id| table.text(id))
                .any(|text| matcher.is_match(text)),
            None => stored
                .elements()
                .filter_map(|e| e.as_str())
                .any(|s| matcher.is_match(s)),
        }
    }

    /// Stored elements as compared against the filter value.
    ///
    /// Dates are truncated to the day; option ids that do not resolve are
    /// dropped.
    fn stored_elements<'v>(&self, stored: &'v Value) -> Vec<Scalar<'v>> {
        stored
            .elements()
            .filter(|e| match (&self.options, e) {
                (Some(table), Scalar::Str(id)) => table.contains(id),
                _ => true,
            })
            .map(|e| match (self.format, e) {
                (RelationFormat::Date, Scalar::Int(ts)) => Scalar::Int(day_start(ts)),
                (RelationFormat::Date, Scalar::Float(ts)) => Scalar::Int(day_start(ts as i64)),
                (_, e) => e,
            })
            .collect()
    }

    fn is_empty(&self, stored: Option<&Value>) -> bool {
        match (stored, &self.options) {
            (None, _) => true,
            (Some(value), Some(table)) => !value
                .elements()
                .filter_map(|e| e.as_str())
                .any(|id| table.contains(id)),
            (Some(value), None) => value.is_blank(),
        }
    }

    fn to_json(&self) -> Json {
        let mut leaf = json!({
            "relationKey": self.relation_key,
            "condition": self.condition.as_str(),
            "format": self.format.as_str(),
        });
        if let Some(value) = &self.value {
            leaf["value"] = value.to_json();
        }
        if self.unresolved {
            leaf["unresolved"] = Json::Bool(true);
        }
        leaf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RelationOption;

    fn leaf(key: &str, condition: Condition, value: Option<Value>, format: RelationFormat) -> FilterLeaf {
        FilterLeaf::new(key, condition, value, format)
    }

    fn tags() -> Arc<OptionTable> {
        Arc::new(OptionTable::new(
            "tag",
            vec![
                RelationOption::new("t1", "tag", "Backend"),
                RelationOption::new("t2", "tag", "Frontend"),
            ],
        ))
    }

    #[test]
    fn test_not_equal_matches_absent() {
        let leaf = leaf("isArchived", Condition::NotEqual, Some(Value::Bool(true)), RelationFormat::Checkbox);

        assert!(leaf.matches(&Record::new("a")));
        assert!(leaf.matches(&Record::new("b").with("isArchived", false)));
        assert!(!leaf.matches(&Record::new("c").with("isArchived", true)));
    }

    #[test]
    fn test_equal_scalar_against_list() {
        let leaf = leaf("links", Condition::Equal, Some(Value::id("x")), RelationFormat::Object);

        assert!(leaf.matches(&Record::new("a").with("links", Value::ids(["y", "x"]))));
        assert!(!leaf.matches(&Record::new("b").with("links", Value::ids(["y"]))));
    }

    #[test]
    fn test_equal_list_requires_same_order() {
        let leaf = leaf("links", Condition::Equal, Some(Value::ids(["x", "y"])), RelationFormat::Object);

        assert!(leaf.matches(&Record::new("a").with("links", Value::ids(["x", "y"]))));
        assert!(!leaf.matches(&Record::new("b").with("links", Value::ids(["y", "x"]))));
    }

    #[test]
    fn test_number_compares_across_int_and_float() {
        let leaf = leaf("score", Condition::GreaterOrEqual, Some(Value::Float(2.5)), RelationFormat::Number);

        assert!(leaf.matches(&Record::new("a").with("score", 3i64)));
        assert!(!leaf.matches(&Record::new("b").with("score", 2i64)));
        assert!(!leaf.matches(&Record::new("c")));
    }

    #[test]
    fn test_date_compares_at_day_granularity() {
        // 2024-01-02 00:00:00 UTC
        let day = 1_704_153_600;
        let leaf = leaf("due", Condition::Equal, Some(Value::Int(day)), RelationFormat::Date);

        assert!(leaf.matches(&Record::new("a").with("due", day + 3600 * 15)));
        assert!(!leaf.matches(&Record::new("b").with("due", day + 86_400)));
    }

    #[test]
    fn test_in_and_all_in() {
        let in_leaf = leaf("tag", Condition::In, Some(Value::ids(["t1", "t3"])), RelationFormat::Tag);
        let all_in = leaf("tag", Condition::AllIn, Some(Value::ids(["t1", "t2"])), RelationFormat::Tag);
        let exact = leaf("tag", Condition::ExactIn, Some(Value::ids(["t2", "t1"])), RelationFormat::Tag);
        let record = Record::new("a").with("tag", Value::ids(["t1", "t2"]));
        let partial = Record::new("b").with("tag", Value::ids(["t1"]));

        assert!(in_leaf.matches(&record));
        assert!(all_in.matches(&record));
        assert!(!all_in.matches(&partial));
        assert!(exact.matches(&record));
        assert!(!exact.matches(&partial));
    }

    #[test]
    fn test_like_is_case_insensitive_substring() {
        let matcher = Regex::new(&format!("(?i){}", regex::escape("PLAN"))).unwrap();
        let leaf = leaf("name", Condition::Like, Some(Value::string("PLAN")), RelationFormat::ShortText)
            .with_matcher(matcher);

        assert!(leaf.matches(&Record::new("a").with("name", "Quarterly planning")));
        assert!(!leaf.matches(&Record::new("b").with("name", "Roadmap")));
    }

    #[test]
    fn test_like_on_tags_matches_option_text() {
        let matcher = Regex::new("(?i)front").unwrap();
        let leaf = leaf("tag", Condition::Like, Some(Value::string("front")), RelationFormat::Tag)
            .with_matcher(matcher)
            .with_options(tags());

        assert!(leaf.matches(&Record::new("a").with("tag", Value::ids(["t2"]))));
        assert!(!leaf.matches(&Record::new("b").with("tag", Value::ids(["t1"]))));
    }

    #[test]
    fn test_empty_distinguishes_zero_from_absent_only_by_condition() {
        let empty = leaf("count", Condition::Empty, None, RelationFormat::Number);
        let exists = leaf("count", Condition::Exists, None, RelationFormat::Number);
        let zero = Record::new("a").with("count", 0i64);

        assert!(empty.matches(&zero));
        assert!(empty.matches(&Record::new("b")));
        assert!(exists.matches(&zero));
        assert!(!exists.matches(&Record::new("b")));
    }

    #[test]
    fn test_unresolvable_stored_option_ids_are_ignored() {
        let leaf = leaf("tag", Condition::NotEmpty, None, RelationFormat::Tag).with_options(tags());

        assert!(!leaf.matches(&Record::new("a").with("tag", Value::ids(["gone"]))));
        assert!(leaf.matches(&Record::new("b").with("tag", Value::ids(["gone", "t1"]))));
    }

    #[test]
    fn test_unresolved_leaf_never_matches() {
        let leaf = leaf("status", Condition::NotEqual, Some(Value::id("x")), RelationFormat::Status).unresolved();
        assert!(!leaf.matches(&Record::new("a")));
    }

    #[test]
    fn test_tree_evaluation_and_leaves() {
        let tree = FilterNode::And(vec![
            FilterNode::Leaf(leaf("a", Condition::Exists, None, RelationFormat::ShortText)),
            FilterNode::Or(vec![
                FilterNode::Leaf(leaf("b", Condition::Exists, None, RelationFormat::ShortText)),
                FilterNode::Leaf(leaf("c", Condition::Exists, None, RelationFormat::ShortText)),
            ]),
        ]);

        assert_eq!(tree.leaves().len(), 3);
        assert_eq!(tree.children().len(), 2);
        assert!(tree.matches(&Record::new("r").with("a", "1").with("c", "2")));
        assert!(!tree.matches(&Record::new("r").with("a", "1")));
    }
}
