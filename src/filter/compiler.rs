//! Filter request compilation
//!
//! Compilation steps:
//! 1. Compile the default predicates into the root AND, in order
//! 2. Flatten top-level AND requests into a list of top-level user nodes
//! 3. Compile each user node; a user leaf on the same relation key as a
//!    default that has not been superseded yet takes that default's slot,
//!    anything else is appended
//! 4. Resolve sort formats and extract the `SetOrder`
//!
//! Malformed requests fail the whole compilation. Unknown relations and
//! unresolvable option ids only degrade the affected leaf to never match.

use regex::Regex;

use crate::error::QueryResult;
use crate::model::{
    checked_day_start, float_timestamp, parse_number, parse_timestamp, RelationFormat, Value,
};
use crate::observability::{log_event_with_fields, Event};
use crate::options::OptionResolver;
use crate::order::{extract_order, SetOrder, SortRequest};
use crate::query::Query;
use crate::store::{ObjectStore, StoreError};

use super::defaults::DefaultFilters;
use super::errors::{CompileError, CompileResult};
use super::filters::Filters;
use super::node::{FilterLeaf, FilterNode};
use super::request::{Condition, FilterOperator, FilterRequest};

/// Compiles filter and sort requests against one store
pub struct Compiler<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    options: OptionResolver,
}

impl<'a, S: ObjectStore + ?Sized> Compiler<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            options: OptionResolver::new(),
        }
    }

    /// Compiles a query's filters and sorts with the given defaults
    pub fn compile(&mut self, query: &Query, defaults: &DefaultFilters) -> QueryResult<Filters> {
        defaults.validate()?;

        // Each slot remembers the default key it still stands for
        let mut slots: Vec<(FilterNode, Option<&str>)> = Vec::with_capacity(defaults.len());
        for default in defaults.leaves() {
            let node = self.compile_leaf(default)?;
            slots.push((node, Some(default.relation_key.as_str())));
        }

        let mut top_level = Vec::new();
        flatten_top_level(&query.filters, &mut top_level)?;

        for request in top_level {
            let node = self.compile_request(request)?;
            let slot = if request.is_leaf() {
                slots
                    .iter()
                    .position(|(_, key)| *key == Some(request.relation_key.as_str()))
            } else {
                None
            };
            match slot {
                Some(i) => slots[i] = (node, None),
                None => slots.push((node, None)),
            }
        }

        let root = FilterNode::And(slots.into_iter().map(|(node, _)| node).collect());
        let order = self.compile_order(&query.sorts)?;
        Ok(Filters::new(root, order, self.options.clone()))
    }

    /// Compiles one request subtree
    pub fn compile_request(&mut self, request: &FilterRequest) -> QueryResult<FilterNode> {
        match request.operator {
            FilterOperator::No => self.compile_leaf(request),
            FilterOperator::And | FilterOperator::Or => {
                validate_combinator(request)?;
                let children = request
                    .nested_filters
                    .iter()
                    .map(|child| self.compile_request(child))
                    .collect::<QueryResult<Vec<_>>>()?;
                Ok(match request.operator {
                    FilterOperator::Or => FilterNode::Or(children),
                    _ => FilterNode::And(children),
                })
            }
        }
    }

    fn compile_leaf(&mut self, request: &FilterRequest) -> QueryResult<FilterNode> {
        let key = request.relation_key.as_str();
        if !request.nested_filters.is_empty() {
            return Err(CompileError::invalid(format!("leaf on '{}' carries nested filters", key)).into());
        }
        if key.is_empty() {
            return Err(CompileError::invalid("leaf is missing a relation key").into());
        }
        let condition = request.condition.ok_or_else(|| {
            CompileError::invalid(format!("leaf on '{}' is missing a condition", key))
        })?;
        if condition.needs_value() && request.value.is_none() {
            return Err(CompileError::value_required(key, condition).into());
        }

        let format = match request.format {
            Some(format) => format,
            None => match self.store.relation_format_by_key(key) {
                Ok(format) => format,
                Err(StoreError::UnknownRelation(_)) if !condition.needs_value() => {
                    RelationFormat::ShortText
                }
                Err(StoreError::UnknownRelation(_)) => {
                    log_event_with_fields(
                        Event::FilterRelationUnknown,
                        &[("relation_key", key), ("condition", condition.as_str())],
                    );
                    let leaf = FilterLeaf::new(
                        key,
                        condition,
                        request.value.clone(),
                        RelationFormat::ShortText,
                    );
                    return Ok(FilterNode::Leaf(leaf.unresolved()));
                }
                Err(e) => return Err(e.into()),
            },
        };

        if !condition.supports(format) {
            return Err(CompileError::condition_unsupported(key, condition, format).into());
        }

        let Some(raw) = request.value.as_ref().filter(|_| condition.needs_value()) else {
            let mut leaf = FilterLeaf::new(key, condition, None, format);
            if format.is_option() {
                leaf = leaf.with_options(self.options.load(self.store, key)?);
            }
            return Ok(FilterNode::Leaf(leaf));
        };

        if matches!(condition, Condition::Like | Condition::NotLike) {
            let pattern = raw
                .as_str()
                .ok_or_else(|| CompileError::value_invalid(key, "like filters need a text value"))?;
            let matcher = Regex::new(&format!("(?i){}", regex::escape(pattern)))
                .map_err(|e| CompileError::value_invalid(key, e.to_string()))?;
            let mut leaf = FilterLeaf::new(key, condition, Some(Value::string(pattern)), format)
                .with_matcher(matcher);
            if format.is_option() {
                leaf = leaf.with_options(self.options.load(self.store, key)?);
            }
            return Ok(FilterNode::Leaf(leaf));
        }

        let value = normalize_value(key, condition, format, raw)?;
        if format.is_option() {
            return self.compile_option_leaf(key, condition, format, value);
        }
        Ok(FilterNode::Leaf(FilterLeaf::new(key, condition, Some(value), format)))
    }

    /// Status/tag leaves keep only option ids that resolve
    fn compile_option_leaf(
        &mut self,
        key: &str,
        condition: Condition,
        format: RelationFormat,
        value: Value,
    ) -> QueryResult<FilterNode> {
        let table = self.options.load(self.store, key)?;
        let (resolved, missing): (Vec<&str>, Vec<&str>) = value
            .elements()
            .filter_map(|e| e.as_str())
            .partition(|id| table.contains(id));

        if !missing.is_empty() {
            let ids = missing.join(",");
            log_event_with_fields(
                Event::FilterOptionUnresolved,
                &[("relation_key", key), ("option_ids", ids.as_str())],
            );
        }
        if resolved.is_empty() {
            let leaf = FilterLeaf::new(key, condition, Some(value.clone()), format)
                .with_options(table);
            return Ok(FilterNode::Leaf(leaf.unresolved()));
        }

        let filtered = if value.is_list() {
            Value::ids(resolved)
        } else {
            Value::id(resolved[0])
        };
        let leaf = FilterLeaf::new(key, condition, Some(filtered), format).with_options(table);
        Ok(FilterNode::Leaf(leaf))
    }

    fn compile_order(&mut self, sorts: &[SortRequest]) -> QueryResult<SetOrder> {
        let mut resolved = Vec::with_capacity(sorts.len());
        for sort in sorts {
            if sort.relation_key.is_empty() {
                return Err(CompileError::sort_invalid("sort is missing a relation key").into());
            }
            let format = match sort.format {
                Some(format) => format,
                None => match self.store.relation_format_by_key(&sort.relation_key) {
                    Ok(format) => format,
                    Err(StoreError::UnknownRelation(_)) => RelationFormat::ShortText,
                    Err(e) => return Err(e.into()),
                },
            };
            if format.is_option() {
                self.options.load(self.store, &sort.relation_key)?;
            }
            let mut sort = sort.clone();
            sort.format = Some(format);
            resolved.push(sort);
        }
        Ok(extract_order(&resolved))
    }
}

/// Compiles `query` against `store` with `defaults`
pub fn compile<S: ObjectStore + ?Sized>(
    store: &S,
    query: &Query,
    defaults: &DefaultFilters,
) -> QueryResult<Filters> {
    Compiler::new(store).compile(query, defaults)
}

fn flatten_top_level<'r>(
    requests: &'r [FilterRequest],
    out: &mut Vec<&'r FilterRequest>,
) -> CompileResult<()> {
    for request in requests {
        if request.operator == FilterOperator::And {
            validate_combinator(request)?;
            flatten_top_level(&request.nested_filters, out)?;
        } else {
            out.push(request);
        }
    }
    Ok(())
}

fn validate_combinator(request: &FilterRequest) -> CompileResult<()> {
    if request.nested_filters.is_empty() {
        return Err(CompileError::invalid(format!(
            "{:?} combinator has no nested filters",
            request.operator
        )));
    }
    if !request.relation_key.is_empty() || request.condition.is_some() {
        return Err(CompileError::invalid(
            "combinator must not carry a relation key or condition",
        ));
    }
    Ok(())
}

/// Coerces a filter value to the relation format
fn normalize_value(
    key: &str,
    condition: Condition,
    format: RelationFormat,
    raw: &Value,
) -> CompileResult<Value> {
    let value = match format {
        RelationFormat::Checkbox => match raw {
            Value::Bool(_) => raw.clone(),
            _ => {
                return Err(CompileError::value_invalid(
                    key,
                    "checkbox filters need a boolean value",
                ))
            }
        },
        RelationFormat::Number => normalize_number(key, raw)?,
        RelationFormat::Date => normalize_date(key, raw)?,
        f if f.is_option() || f.is_reference() => match raw {
            Value::String(s) => Value::Id(s.clone()),
            Value::StringList(l) => Value::IdList(l.clone()),
            other => other.clone(),
        },
        _ => raw.clone(),
    };
    if condition.is_list_condition() && format != RelationFormat::Checkbox {
        Ok(value.into_list())
    } else {
        Ok(value)
    }
}

fn normalize_number(key: &str, raw: &Value) -> CompileResult<Value> {
    let invalid = || CompileError::value_invalid(key, format!("'{}' is not a number", raw));
    match raw {
        Value::Int(_) | Value::Float(_) | Value::IntList(_) | Value::FloatList(_) => {
            Ok(raw.clone())
        }
        Value::String(s) | Value::Id(s) => parse_number(s).ok_or_else(invalid),
        Value::StringList(l) | Value::IdList(l) => l
            .iter()
            .map(|s| s.trim().parse::<i64>().ok())
            .collect::<Option<Vec<_>>>()
            .map(Value::IntList)
            .ok_or_else(invalid),
        Value::Bool(_) => Err(invalid()),
    }
}

fn normalize_date(key: &str, raw: &Value) -> CompileResult<Value> {
    let invalid = || CompileError::value_invalid(key, format!("'{}' is not a date", raw));
    let day = |ts: Option<i64>| ts.and_then(checked_day_start).ok_or_else(invalid);
    match raw {
        Value::Int(ts) => day(Some(*ts)).map(Value::Int),
        Value::Float(ts) => day(float_timestamp(*ts)).map(Value::Int),
        Value::String(s) | Value::Id(s) => day(parse_timestamp(s)).map(Value::Int),
        Value::IntList(l) => l
            .iter()
            .map(|ts| day(Some(*ts)))
            .collect::<CompileResult<Vec<_>>>()
            .map(Value::IntList),
        Value::FloatList(l) => l
            .iter()
            .map(|ts| day(float_timestamp(*ts)))
            .collect::<CompileResult<Vec<_>>>()
            .map(Value::IntList),
        Value::StringList(l) | Value::IdList(l) => l
            .iter()
            .map(|s| day(parse_timestamp(s)))
            .collect::<CompileResult<Vec<_>>>()
            .map(Value::IntList),
        Value::Bool(_) => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;
    use crate::options::RelationOption;
    use crate::order::Order;
    use crate::store::MemoryStore;

    fn store() -> MemoryStore {
        MemoryStore::new("space1")
            .with_relation("priority", RelationFormat::Number)
            .with_relation("due", RelationFormat::Date)
            .with_option(RelationOption::new("s1", "status", "Todo"))
            .with_option(RelationOption::new("s2", "status", "Done"))
    }

    fn compile_filters(filters: Vec<FilterRequest>) -> QueryResult<Filters> {
        let mut query = Query::new("space1");
        query.filters = filters;
        compile(&store(), &query, &DefaultFilters::standard())
    }

    fn error_code(result: QueryResult<Filters>) -> &'static str {
        result.unwrap_err().code()
    }

    #[test]
    fn test_defaults_only() {
        let filters = compile_filters(vec![]).unwrap();
        assert_eq!(filters.slot_count(), 3);
    }

    #[test]
    fn test_override_keeps_default_slot() {
        let filters = compile_filters(vec![FilterRequest::leaf(
            "isArchived",
            Condition::Equal,
            true,
        )])
        .unwrap();

        assert_eq!(filters.slot_count(), 3);
        let first = filters.root().children()[0].as_leaf().unwrap();
        assert_eq!(first.relation_key(), "isArchived");
        assert_eq!(first.condition(), Condition::Equal);
    }

    #[test]
    fn test_second_leaf_on_default_key_is_appended() {
        let filters = compile_filters(vec![
            FilterRequest::leaf("isDeleted", Condition::Equal, true),
            FilterRequest::leaf("isDeleted", Condition::NotEqual, false),
        ])
        .unwrap();
        assert_eq!(filters.slot_count(), 4);
    }

    #[test]
    fn test_nested_and_is_flattened() {
        let filters = compile_filters(vec![FilterRequest::and(vec![
            FilterRequest::leaf("name", Condition::Equal, "a"),
            FilterRequest::and(vec![FilterRequest::leaf("priority", Condition::Less, 3i64)]),
        ])])
        .unwrap();
        assert_eq!(filters.slot_count(), 5);
    }

    #[test]
    fn test_leaf_without_key_fails() {
        let code = error_code(compile_filters(vec![FilterRequest::leaf("", Condition::Equal, "x")]));
        assert_eq!(code, "OBJQ_FILTER_INVALID");
    }

    #[test]
    fn test_empty_combinator_fails() {
        assert_eq!(error_code(compile_filters(vec![FilterRequest::or(vec![])])), "OBJQ_FILTER_INVALID");
        assert_eq!(error_code(compile_filters(vec![FilterRequest::and(vec![])])), "OBJQ_FILTER_INVALID");
    }

    #[test]
    fn test_combinator_with_key_fails() {
        let mut request = FilterRequest::or(vec![FilterRequest::check("name", Condition::Exists)]);
        request.relation_key = "name".into();
        assert_eq!(error_code(compile_filters(vec![request])), "OBJQ_FILTER_INVALID");
    }

    #[test]
    fn test_leaf_with_nested_filters_fails() {
        let mut request = FilterRequest::leaf("name", Condition::Equal, "x");
        request.nested_filters = vec![FilterRequest::check("name", Condition::Exists)];
        assert_eq!(error_code(compile_filters(vec![request])), "OBJQ_FILTER_INVALID");
    }

    #[test]
    fn test_missing_value_fails() {
        let request = FilterRequest::check("name", Condition::Equal);
        assert_eq!(error_code(compile_filters(vec![request])), "OBJQ_FILTER_VALUE_REQUIRED");
    }

    #[test]
    fn test_unsupported_pairing_fails() {
        let request = FilterRequest::leaf("priority", Condition::Like, "1");
        assert_eq!(error_code(compile_filters(vec![request])), "OBJQ_CONDITION_UNSUPPORTED");

        let request = FilterRequest::leaf("status", Condition::Greater, "s1");
        assert_eq!(error_code(compile_filters(vec![request])), "OBJQ_CONDITION_UNSUPPORTED");
    }

    #[test]
    fn test_checkbox_requires_bool() {
        let request = FilterRequest::leaf("isHidden", Condition::Equal, "yes");
        assert_eq!(error_code(compile_filters(vec![request])), "OBJQ_FILTER_VALUE_INVALID");
    }

    #[test]
    fn test_number_strings_are_normalized() {
        let filters = compile_filters(vec![FilterRequest::leaf("priority", Condition::Greater, "2")]).unwrap();
        let leaf = filters.root().children()[3].as_leaf().unwrap();
        assert_eq!(leaf.value(), Some(&Value::Int(2)));

        let bad = FilterRequest::leaf("priority", Condition::Greater, "high");
        assert_eq!(error_code(compile_filters(vec![bad])), "OBJQ_FILTER_VALUE_INVALID");
    }

    #[test]
    fn test_dates_are_normalized_to_day_start() {
        let filters = compile_filters(vec![FilterRequest::leaf(
            "due",
            Condition::Equal,
            "2024-01-02T15:30:00Z",
        )])
        .unwrap();
        let leaf = filters.root().children()[3].as_leaf().unwrap();
        assert_eq!(leaf.value(), Some(&Value::Int(1_704_153_600)));
    }

    #[test]
    fn test_out_of_range_date_is_rejected() {
        let result = compile_filters(vec![FilterRequest::leaf(
            "due",
            Condition::Equal,
            Value::Float(-1e19),
        )]);
        assert_eq!(error_code(result), "OBJQ_FILTER_VALUE_INVALID");

        let result = compile_filters(vec![FilterRequest::leaf(
            "due",
            Condition::In,
            Value::IntList(vec![0, i64::MIN]),
        )]);
        assert_eq!(error_code(result), "OBJQ_FILTER_VALUE_INVALID");
    }

    #[test]
    fn test_float_list_number_filter() {
        let filters = compile_filters(vec![FilterRequest::leaf(
            "priority",
            Condition::In,
            Value::FloatList(vec![1.5, 2.0]),
        )])
        .unwrap();
        let leaf = filters.root().children()[3].as_leaf().unwrap();
        assert_eq!(leaf.value(), Some(&Value::FloatList(vec![1.5, 2.0])));
    }

    #[test]
    fn test_list_conditions_wrap_scalars() {
        let filters = compile_filters(vec![FilterRequest::leaf("type", Condition::In, "ot-page")]).unwrap();
        let leaf = filters.root().children()[3].as_leaf().unwrap();
        assert_eq!(leaf.value(), Some(&Value::ids(["ot-page"])));
    }

    #[test]
    fn test_unresolvable_option_degrades_leaf() {
        let filters = compile_filters(vec![FilterRequest::leaf("status", Condition::Equal, "gone")]).unwrap();

        assert_eq!(filters.slot_count(), 4);
        assert_eq!(filters.unresolved_count(), 1);
        assert!(!filters.matches(&Record::new("a").with("status", Value::id("gone"))));
    }

    #[test]
    fn test_partially_resolvable_options_keep_resolved_ids() {
        let filters = compile_filters(vec![FilterRequest::leaf(
            "status",
            Condition::In,
            Value::strings(["s1", "gone"]),
        )])
        .unwrap();
        let leaf = filters.root().children()[3].as_leaf().unwrap();

        assert!(!leaf.is_unresolved());
        assert_eq!(leaf.value(), Some(&Value::ids(["s1"])));
        assert!(filters.matches(&Record::new("a").with("status", Value::id("s1"))));
    }

    #[test]
    fn test_unknown_relation_degrades_leaf() {
        let filters = compile_filters(vec![FilterRequest::leaf("nope", Condition::Equal, "x")]).unwrap();
        assert_eq!(filters.unresolved_count(), 1);
        assert!(!filters.matches(&Record::new("a").with("nope", "x")));
    }

    #[test]
    fn test_unknown_relation_presence_check_still_applies() {
        let filters = compile_filters(vec![FilterRequest::check("nope", Condition::Exists)]).unwrap();
        assert_eq!(filters.unresolved_count(), 0);
        assert!(filters.matches(&Record::new("a").with("nope", "x")));
        assert!(!filters.matches(&Record::new("b")));
    }

    #[test]
    fn test_sort_format_is_resolved_from_store() {
        let mut query = Query::new("space1");
        query.sorts = vec![SortRequest::asc("due")];
        let filters = compile(&store(), &query, &DefaultFilters::none()).unwrap();

        match &filters.order()[0] {
            Order::Key(key) => {
                assert_eq!(key.format, RelationFormat::Date);
                assert!(key.include_time);
            }
            Order::Custom(_) => panic!("expected key order"),
        }
    }

    #[test]
    fn test_sort_on_status_loads_options() {
        let mut query = Query::new("space1");
        query.sorts = vec![SortRequest::asc("status")];
        let filters = compile(&store(), &query, &DefaultFilters::none()).unwrap();
        assert!(filters.options().table("status").is_some());
    }

    #[test]
    fn test_sort_without_key_fails() {
        let mut query = Query::new("space1");
        query.sorts = vec![SortRequest::asc("")];
        let err = compile(&store(), &query, &DefaultFilters::none()).unwrap_err();
        assert_eq!(err.code(), "OBJQ_SORT_INVALID");
    }
}
