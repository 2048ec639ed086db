//! Typed relation values
//!
//! A relation that is not set has no `Value` at all: lookups return `None`.
//! Zero, the empty string, `false` and empty lists are ordinary values and
//! are never treated as absence, except by the Empty/NotEmpty conditions.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as Json;

use super::date::parse_timestamp;
use super::format::RelationFormat;

/// A stored or requested relation value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    StringList(Vec<String>),
    /// Reference to another object (or option) by id
    Id(String),
    IdList(Vec<String>),
    IntList(Vec<i64>),
    FloatList(Vec<f64>),
}

/// Borrowed view of a single element of a value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'a str),
}

impl<'a> Scalar<'a> {
    /// Compares two scalars of compatible kinds.
    ///
    /// Integers and floats compare numerically; strings byte-wise.
    /// Incompatible kinds return None.
    pub fn compare(&self, other: &Scalar<'_>) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => Some(a.cmp(b)),
            (Scalar::Int(a), Scalar::Int(b)) => Some(a.cmp(b)),
            (Scalar::Str(a), Scalar::Str(b)) => Some(a.cmp(b)),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                _ => None,
            },
        }
    }

    /// Equality under `compare`
    pub fn same(&self, other: &Scalar<'_>) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(n) => Some(*n as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Iterator over the elements of a value (a scalar yields itself once)
pub struct Elements<'a> {
    value: &'a Value,
    pos: usize,
}

impl<'a> Iterator for Elements<'a> {
    type Item = Scalar<'a>;

    fn next(&mut self) -> Option<Scalar<'a>> {
        let pos = self.pos;
        self.pos += 1;
        match self.value {
            Value::StringList(list) | Value::IdList(list) => {
                list.get(pos).map(|s| Scalar::Str(s.as_str()))
            }
            Value::IntList(list) => list.get(pos).map(|n| Scalar::Int(*n)),
            Value::FloatList(list) => list.get(pos).map(|f| Scalar::Float(*f)),
            _ if pos > 0 => None,
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Int(n) => Some(Scalar::Int(*n)),
            Value::Float(f) => Some(Scalar::Float(*f)),
            Value::String(s) | Value::Id(s) => Some(Scalar::Str(s.as_str())),
        }
    }
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn id(s: impl Into<String>) -> Self {
        Value::Id(s.into())
    }

    pub fn strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::StringList(items.into_iter().map(Into::into).collect())
    }

    pub fn ids<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::IdList(items.into_iter().map(Into::into).collect())
    }

    /// Iterates the value's elements
    pub fn elements(&self) -> Elements<'_> {
        Elements {
            value: self,
            pos: 0,
        }
    }

    /// Returns true for list variants
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            Value::StringList(_) | Value::IdList(_) | Value::IntList(_) | Value::FloatList(_)
        )
    }

    /// Number of elements (1 for scalars)
    pub fn len(&self) -> usize {
        match self {
            Value::StringList(l) | Value::IdList(l) => l.len(),
            Value::IntList(l) => l.len(),
            Value::FloatList(l) => l.len(),
            _ => 1,
        }
    }

    /// Present but carrying nothing: "", 0, false or an empty list
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Bool(b) => !b,
            Value::Int(n) => *n == 0,
            Value::Float(f) => *f == 0.0,
            Value::String(s) | Value::Id(s) => s.is_empty(),
            Value::StringList(l) | Value::IdList(l) => l.is_empty(),
            Value::IntList(l) => l.is_empty(),
            Value::FloatList(l) => l.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Id(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Converts the value into its list form (scalars become one element lists)
    pub fn into_list(self) -> Value {
        match self {
            Value::String(s) => Value::StringList(vec![s]),
            Value::Id(s) => Value::IdList(vec![s]),
            Value::Int(n) => Value::IntList(vec![n]),
            Value::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Value::IntList(vec![f as i64])
            }
            Value::Float(f) => Value::FloatList(vec![f]),
            Value::Bool(b) => Value::StringList(vec![b.to_string()]),
            other => other,
        }
    }

    /// Interprets untyped JSON.
    ///
    /// Returns None for null, objects and arrays mixing strings and numbers.
    /// Numeric arrays holding any non-integer become float lists.
    pub fn from_json(json: &Json) -> Option<Value> {
        match json {
            Json::Null | Json::Object(_) => None,
            Json::Bool(b) => Some(Value::Bool(*b)),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Some(Value::Int(i)),
                None => n.as_f64().map(Value::Float),
            },
            Json::String(s) => Some(Value::String(s.clone())),
            Json::Array(items) => {
                if items.iter().all(Json::is_string) {
                    Some(Value::StringList(
                        items
                            .iter()
                            .filter_map(|v| v.as_str().map(str::to_string))
                            .collect(),
                    ))
                } else if items.iter().all(Json::is_i64) {
                    Some(Value::IntList(items.iter().filter_map(Json::as_i64).collect()))
                } else if items.iter().all(Json::is_number) {
                    Some(Value::FloatList(items.iter().filter_map(Json::as_f64).collect()))
                } else {
                    None
                }
            }
        }
    }

    /// Interprets a raw stored JSON value according to a relation format.
    ///
    /// Null yields None (absent). Values that do not fit the format fall
    /// back to the untyped interpretation.
    pub fn from_raw(json: &Json, format: RelationFormat) -> Option<Value> {
        if json.is_null() {
            return None;
        }
        let typed = match (format, json) {
            (RelationFormat::Date, Json::Number(n)) => {
                n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).map(Value::Int)
            }
            (RelationFormat::Date, Json::String(s)) => parse_timestamp(s).map(Value::Int),
            (RelationFormat::Number, Json::String(s)) => parse_number(s),
            (f, Json::String(s)) if f.is_option() || f.is_reference() => {
                Some(Value::Id(s.clone()))
            }
            (f, Json::Array(items)) if f.is_option() || f.is_reference() => items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(Value::IdList),
            _ => None,
        };
        typed.or_else(|| Value::from_json(json))
    }

    /// Converts to JSON
    pub fn to_json(&self) -> Json {
        match self {
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(n) => Json::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::String(s) | Value::Id(s) => Json::String(s.clone()),
            Value::StringList(l) | Value::IdList(l) => {
                Json::Array(l.iter().cloned().map(Json::String).collect())
            }
            Value::IntList(l) => Json::Array(l.iter().map(|n| Json::from(*n)).collect()),
            Value::FloatList(l) => Json::Array(
                l.iter()
                    .map(|f| {
                        serde_json::Number::from_f64(*f)
                            .map(Json::Number)
                            .unwrap_or(Json::Null)
                    })
                    .collect(),
            ),
        }
    }
}

/// Parses a numeric string as Int when integral, Float otherwise
pub(crate) fn parse_number(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Value::Int(n));
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Value::Float)
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = Json::deserialize(deserializer)?;
        Value::from_json(&json).ok_or_else(|| {
            <D::Error as serde::de::Error>::custom(format!("unsupported relation value: {}", json))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_zero_and_empty_are_values_not_absence() {
        assert_eq!(Value::from_json(&json!(0)), Some(Value::Int(0)));
        assert_eq!(Value::from_json(&json!("")), Some(Value::string("")));
        assert_eq!(Value::from_json(&json!(null)), None);
        assert!(Value::Int(0).is_blank());
        assert!(Value::string("").is_blank());
        assert!(!Value::Int(7).is_blank());
    }

    #[test]
    fn test_raw_interpretation_by_format() {
        assert_eq!(
            Value::from_raw(&json!("opt1"), RelationFormat::Status),
            Some(Value::id("opt1"))
        );
        assert_eq!(
            Value::from_raw(&json!(["a", "b"]), RelationFormat::Tag),
            Some(Value::ids(["a", "b"]))
        );
        assert_eq!(
            Value::from_raw(&json!("1970-01-02"), RelationFormat::Date),
            Some(Value::Int(86_400))
        );
        assert_eq!(
            Value::from_raw(&json!("12.5"), RelationFormat::Number),
            Some(Value::Float(12.5))
        );
        assert_eq!(
            Value::from_raw(&json!("plain"), RelationFormat::ShortText),
            Some(Value::string("plain"))
        );
    }

    #[test]
    fn test_elements_of_scalars_and_lists() {
        let scalar = Value::Int(3);
        assert_eq!(scalar.elements().collect::<Vec<_>>(), vec![Scalar::Int(3)]);

        let list = Value::ids(["x", "y"]);
        assert_eq!(
            list.elements().collect::<Vec<_>>(),
            vec![Scalar::Str("x"), Scalar::Str("y")]
        );
        assert_eq!(Value::IntList(vec![]).elements().count(), 0);
    }

    #[test]
    fn test_numeric_comparison_crosses_int_and_float() {
        assert!(Scalar::Int(2).same(&Scalar::Float(2.0)));
        assert_eq!(
            Scalar::Float(1.5).compare(&Scalar::Int(2)),
            Some(Ordering::Less)
        );
        assert_eq!(Scalar::Str("1").compare(&Scalar::Int(1)), None);
    }

    #[test]
    fn test_mixed_arrays_are_rejected() {
        assert_eq!(Value::from_json(&json!(["a", 1])), None);
        assert!(serde_json::from_value::<Value>(json!({"k": 1})).is_err());
    }

    #[test]
    fn test_numeric_arrays_with_floats() {
        assert_eq!(
            Value::from_json(&json!([1.5, 2])),
            Some(Value::FloatList(vec![1.5, 2.0]))
        );
        assert_eq!(
            Value::from_raw(&json!([1.5, 2.0]), RelationFormat::Number),
            Some(Value::FloatList(vec![1.5, 2.0]))
        );
        let parsed: Value = serde_json::from_value(json!([0.25, 3])).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(
            parsed.elements().collect::<Vec<_>>(),
            vec![Scalar::Float(0.25), Scalar::Float(3.0)]
        );
        assert_eq!(parsed.to_json(), json!([0.25, 3.0]));
    }

    #[test]
    fn test_into_list_wraps_scalars() {
        assert_eq!(Value::Int(10).into_list(), Value::IntList(vec![10]));
        assert_eq!(Value::id("a").into_list(), Value::ids(["a"]));
        assert_eq!(Value::ids(["a"]).into_list(), Value::ids(["a"]));
        assert_eq!(Value::Float(1.5).into_list(), Value::FloatList(vec![1.5]));
    }
}
