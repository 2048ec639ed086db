//! Date object suggestions
//!
//! A search can imply a date object that has no stored record yet: either
//! the full text reads as a date, or an `id` filter names date object ids.
//! Such objects are built in memory and offered alongside stored results.

use chrono::{Datelike, Days, NaiveDate};

use crate::model::bundle::{
    ObjectLayout, RELATION_ID, RELATION_LAYOUT, RELATION_NAME, RELATION_RESOLVED_LAYOUT,
    RELATION_SPACE_ID, RELATION_TIMESTAMP,
};
use crate::model::{parse_timestamp, DateObject, Record, Value};
use crate::query::Query;

/// Turns free text into a calendar day
pub trait DateParser: Send + Sync {
    /// Returns the day `text` names, relative to `today`
    fn parse(&self, text: &str, today: NaiveDate) -> Option<NaiveDate>;
}

/// Keyword and fixed-format date parser.
///
/// Day-first forms win over month-first ones. Forms without a year take
/// the current one. Plain numbers are never dates.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleDateParser;

const FULL_FORMATS: &[&str] = &[
    "%d.%m.%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%m/%d/%Y",
    "%b %d %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

// Parsed with the current year appended after the separator
const YEARLESS_FORMATS: &[(&str, &str)] = &[
    ("%d %b", " "),
    ("%d %B", " "),
    ("%b %d", " "),
    ("%B %d", " "),
    ("%d.%m", "."),
];

impl DateParser for SimpleDateParser {
    fn parse(&self, text: &str, today: NaiveDate) -> Option<NaiveDate> {
        let raw = text.trim();
        if raw.is_empty() || raw.parse::<i64>().is_ok() {
            return None;
        }

        match raw.to_lowercase().as_str() {
            "date" | "today" => return Some(today),
            "tomorrow" => return today.checked_add_days(Days::new(1)),
            "yesterday" => return today.checked_sub_days(Days::new(1)),
            _ => {}
        }

        if let Some(ts) = parse_timestamp(raw) {
            return chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive());
        }

        for format in FULL_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
                return Some(date);
            }
        }

        for (format, separator) in YEARLESS_FORMATS {
            let with_year = format!("{}{}{}", raw, separator, today.year());
            let format = format!("{}{}%Y", format, separator);
            if let Ok(date) = NaiveDate::parse_from_str(&with_year, &format) {
                return Some(date);
            }
        }

        None
    }
}

/// Date object ids a query implies.
///
/// A date read from the full text takes priority. Otherwise the date object
/// ids among the values of the first top-level `id` filter are used.
pub fn suggest_date_ids(query: &Query, parser: &dyn DateParser, today: NaiveDate) -> Vec<String> {
    if let Some(day) = parser.parse(&query.full_text, today) {
        return vec![DateObject::day(day).id()];
    }

    query
        .filters
        .iter()
        .find(|f| f.relation_key == RELATION_ID)
        .and_then(|f| f.value.as_ref())
        .map(|value| {
            value
                .elements()
                .filter_map(|e| e.as_str())
                .filter(|id| DateObject::from_id(id).is_some())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Builds the in-memory record of a date object
pub fn date_record(object: &DateObject, space_id: &str) -> Record {
    let layout = ObjectLayout::Date.code();
    Record::new(object.id())
        .with(RELATION_NAME, object.name())
        .with(RELATION_LAYOUT, layout)
        .with(RELATION_RESOLVED_LAYOUT, layout)
        .with(RELATION_TIMESTAMP, object.timestamp())
        .with(RELATION_SPACE_ID, Value::id(space_id))
}
