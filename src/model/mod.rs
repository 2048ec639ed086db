//! Value and format model
//!
//! Typed relation values, the closed set of relation formats, records and
//! the table of well-known system relations.

pub mod bundle;
mod date;
mod format;
mod record;
mod value;

pub use date::{
    checked_day_start, day_start, float_timestamp, parse_timestamp, DateObject, DATE_OBJECT_PREFIX,
};
pub use format::RelationFormat;
pub use record::Record;
pub use value::{Elements, Scalar, Value};
pub(crate) use value::parse_number;
