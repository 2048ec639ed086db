//! Records: an object id plus its relation details

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as Json};

use super::bundle::RELATION_ID;
use super::format::RelationFormat;
use super::value::Value;

/// A single object as seen by the query engine
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: String,
    details: BTreeMap<String, Value>,
}

impl Record {
    /// Creates a record whose `id` relation mirrors the object id
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let mut details = BTreeMap::new();
        details.insert(RELATION_ID.to_string(), Value::Id(id.clone()));
        Self { id, details }
    }

    /// Builder-style detail setter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a detail. Setting `id` is ignored: the id is fixed at creation.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        if key == RELATION_ID {
            return;
        }
        self.details.insert(key, value.into());
    }

    /// Removes a detail, making it absent
    pub fn unset(&mut self, key: &str) -> Option<Value> {
        if key == RELATION_ID {
            return None;
        }
        self.details.remove(key)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the value of a relation, None when the relation is not set
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }

    /// Returns a string-like detail
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Iterates details in key order
    pub fn details(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.details.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Builds a record from a raw JSON object.
    ///
    /// `format_of` supplies the format used to interpret each key. Null
    /// values are dropped (absent). Fails without an `id` string, or when a
    /// non-null value has no `Value` form.
    pub fn from_json_object(
        object: &Map<String, Json>,
        format_of: impl Fn(&str) -> RelationFormat,
    ) -> Result<Self, String> {
        let id = object
            .get(RELATION_ID)
            .and_then(Json::as_str)
            .ok_or_else(|| "no string id".to_string())?;
        let mut record = Record::new(id);
        for (key, raw) in object {
            if raw.is_null() {
                continue;
            }
            let value = Value::from_raw(raw, format_of(key))
                .ok_or_else(|| format!("unsupported value for '{}': {}", key, raw))?;
            record.set(key.as_str(), value);
        }
        Ok(record)
    }

    /// Converts to a flat JSON object
    pub fn to_json(&self) -> Json {
        Json::Object(
            self.details
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.details.len()))?;
        for (key, value) in &self.details {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
