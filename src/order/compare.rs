//! Record comparison under a `SetOrder`

use std::cmp::Ordering;

use crate::model::{day_start, Record, RelationFormat, Scalar, Value};
use crate::options::OptionResolver;

use super::collation::{CollationBuffer, Collator};
use super::extractor::{CustomOrder, KeyOrder, Order};
use super::sort::{EmptyPlacement, SortDirection};

/// Stable in-place sort of `records`
pub fn sort_records(
    records: &mut [Record],
    order: &[Order],
    options: &OptionResolver,
    collator: &dyn Collator,
    scratch: &mut CollationBuffer,
) {
    if order.is_empty() {
        return;
    }
    let mut comparator = RecordComparator {
        options,
        collator,
        scratch,
    };
    records.sort_by(|a, b| comparator.compare(a, b, order));
}

struct RecordComparator<'a> {
    options: &'a OptionResolver,
    collator: &'a dyn Collator,
    scratch: &'a mut CollationBuffer,
}

impl RecordComparator<'_> {
    fn compare(&mut self, a: &Record, b: &Record, order: &[Order]) -> Ordering {
        for key in order {
            let ordering = match key {
                Order::Key(k) => self.compare_key(a, b, k),
                Order::Custom(c) => custom_rank(a, c).cmp(&custom_rank(b, c)),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    fn compare_key(&mut self, a: &Record, b: &Record, key: &KeyOrder) -> Ordering {
        let left = a.get(&key.relation_key);
        let right = b.get(&key.relation_key);

        if let Some(placement) = key.empty_placement {
            let (left_empty, right_empty) = (is_empty(left), is_empty(right));
            if left_empty || right_empty {
                let ordering = right_empty.cmp(&left_empty);
                return match placement {
                    EmptyPlacement::Start => ordering,
                    EmptyPlacement::End => ordering.reverse(),
                };
            }
        }

        // Absent sorts lowest
        let ordering = match (left, right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(l), Some(r)) => self.compare_values(l, r, key),
        };
        match key.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    /// Element-wise lexicographic comparison, shorter list first on ties
    fn compare_values(&mut self, left: &Value, right: &Value, key: &KeyOrder) -> Ordering {
        let options = self.options;
        let left = sort_elements(options, left, key);
        let right = sort_elements(options, right, key);
        for (l, r) in left.iter().zip(&right) {
            let ordering = self.compare_scalars(l, r, key.format);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        left.len().cmp(&right.len())
    }

    fn compare_scalars(&mut self, l: &Scalar<'_>, r: &Scalar<'_>, format: RelationFormat) -> Ordering {
        match (l, r) {
            (Scalar::Str(a), Scalar::Str(b)) if format.is_text() || format.is_option() => {
                self.collator.compare(a, b, self.scratch)
            }
            _ => l.compare(r).unwrap_or_else(|| type_rank(l).cmp(&type_rank(r))),
        }
    }
}

/// Elements as they sort: option ids become option text (unresolved ids
/// are skipped), dates are truncated to the day unless time is included.
fn sort_elements<'v>(options: &'v OptionResolver, value: &'v Value, key: &KeyOrder) -> Vec<Scalar<'v>> {
    if key.format.is_option() {
        return value
            .elements()
            .filter_map(|e| e.as_str())
            .filter_map(|id| options.resolve(&key.relation_key, id).ok())
            .map(|option| Scalar::Str(option.text.as_str()))
            .collect();
    }
    value
        .elements()
        .map(|e| match (key.format, e) {
            (RelationFormat::Date, Scalar::Int(ts)) if !key.include_time => {
                Scalar::Int(day_start(ts))
            }
            (RelationFormat::Date, Scalar::Float(ts)) if !key.include_time => {
                Scalar::Int(day_start(ts as i64))
            }
            (_, e) => e,
        })
        .collect()
}

fn type_rank(scalar: &Scalar<'_>) -> u8 {
    match scalar {
        Scalar::Bool(_) => 0,
        Scalar::Int(_) | Scalar::Float(_) => 1,
        Scalar::Str(_) => 2,
    }
}

fn is_empty(value: Option<&Value>) -> bool {
    value.map_or(true, Value::is_blank)
}

/// Position of the record's value in the custom list; unlisted values rank
/// after every listed one
fn custom_rank(record: &Record, order: &CustomOrder) -> usize {
    let Some(value) = record.get(&order.relation_key) else {
        return order.values.len();
    };
    let Some(first) = value.elements().next() else {
        return order.values.len();
    };
    order
        .values
        .iter()
        .position(|candidate| candidate.elements().next().map_or(false, |c| c.same(&first)))
        .unwrap_or(order.values.len())
}
