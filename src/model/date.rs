//! Date normalization and date object identifiers
//!
//! Dates are stored as unix seconds (UTC). A date object is a virtual object
//! whose id encodes either a calendar day (`_date_2024-01-02`) or an instant
//! (`_date_2024-01-02-15-04-05Z`).

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

const SECONDS_PER_DAY: i64 = 86_400;

/// Prefix shared by every date object id
pub const DATE_OBJECT_PREFIX: &str = "_date_";

const DAY_ID_FORMAT: &str = "%Y-%m-%d";
const TIME_ID_FORMAT: &str = "%Y-%m-%d-%H-%M-%SZ";

/// Parses a textual date into unix seconds.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc().timestamp());
        }
    }
    NaiveDate::parse_from_str(raw, DAY_ID_FORMAT)
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc().timestamp())
}

/// Truncates a timestamp to the start of its UTC day.
///
/// Saturates at `i64::MIN` for the few timestamps whose day starts below it.
pub fn day_start(timestamp: i64) -> i64 {
    timestamp
        .div_euclid(SECONDS_PER_DAY)
        .saturating_mul(SECONDS_PER_DAY)
}

/// Start of the UTC day of `timestamp`, or None outside the calendar range
pub fn checked_day_start(timestamp: i64) -> Option<i64> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)?;
    timestamp
        .div_euclid(SECONDS_PER_DAY)
        .checked_mul(SECONDS_PER_DAY)
}

/// Converts a float timestamp to whole seconds, or None when it is not
/// finite or does not fit an `i64`
pub fn float_timestamp(timestamp: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (timestamp.is_finite() && timestamp >= -LIMIT && timestamp < LIMIT)
        .then(|| timestamp.trunc() as i64)
}

/// A virtual date object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateObject {
    at: NaiveDateTime,
    include_time: bool,
}

impl DateObject {
    /// Date object covering a whole day
    pub fn day(date: NaiveDate) -> Self {
        Self {
            at: date.and_time(NaiveTime::MIN),
            include_time: false,
        }
    }

    /// Date object for a precise instant
    pub fn instant(at: NaiveDateTime) -> Self {
        Self {
            at,
            include_time: true,
        }
    }

    /// Parses a date object id, returning None for any other id
    pub fn from_id(id: &str) -> Option<Self> {
        let rest = id.strip_prefix(DATE_OBJECT_PREFIX)?;
        if let Ok(at) = NaiveDateTime::parse_from_str(rest, TIME_ID_FORMAT) {
            return Some(Self::instant(at));
        }
        NaiveDate::parse_from_str(rest, DAY_ID_FORMAT)
            .ok()
            .map(Self::day)
    }

    /// Returns the object id
    pub fn id(&self) -> String {
        let format = if self.include_time {
            TIME_ID_FORMAT
        } else {
            DAY_ID_FORMAT
        };
        format!("{}{}", DATE_OBJECT_PREFIX, self.at.format(format))
    }

    /// Human readable name, e.g. `02 Jan 2024`
    pub fn name(&self) -> String {
        if self.include_time {
            self.at.format("%d %b %Y %H:%M").to_string()
        } else {
            self.at.format("%d %b %Y").to_string()
        }
    }

    /// Unix seconds of the object's instant (day start for day objects)
    pub fn timestamp(&self) -> i64 {
        self.at.and_utc().timestamp()
    }

    pub fn include_time(&self) -> bool {
        self.include_time
    }
}
