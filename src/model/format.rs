//! Relation formats
//!
//! The closed set of value types a relation can declare. The format decides
//! how raw stored values are interpreted, which filter conditions apply and
//! how values sort.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared type of a relation's values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationFormat {
    /// Single line text
    ShortText,
    /// Multi line text
    LongText,
    /// Integer or floating point number
    Number,
    /// Unix timestamp in seconds (UTC)
    Date,
    /// Boolean flag
    Checkbox,
    /// Single option id resolved through the option table
    Status,
    /// Option id list resolved through the option table
    Tag,
    /// Object id references
    Object,
    /// File object id references
    File,
    Email,
    Url,
    Phone,
    Emoji,
    /// Relation id references
    Relations,
}

impl RelationFormat {
    /// Returns the wire name of this format
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationFormat::ShortText => "shorttext",
            RelationFormat::LongText => "longtext",
            RelationFormat::Number => "number",
            RelationFormat::Date => "date",
            RelationFormat::Checkbox => "checkbox",
            RelationFormat::Status => "status",
            RelationFormat::Tag => "tag",
            RelationFormat::Object => "object",
            RelationFormat::File => "file",
            RelationFormat::Email => "email",
            RelationFormat::Url => "url",
            RelationFormat::Phone => "phone",
            RelationFormat::Emoji => "emoji",
            RelationFormat::Relations => "relations",
        }
    }

    /// Free text formats compared with collation
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            RelationFormat::ShortText
                | RelationFormat::LongText
                | RelationFormat::Email
                | RelationFormat::Url
                | RelationFormat::Phone
                | RelationFormat::Emoji
        )
    }

    /// Formats whose values are option ids
    pub fn is_option(&self) -> bool {
        matches!(self, RelationFormat::Status | RelationFormat::Tag)
    }

    /// Formats whose values are object ids
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            RelationFormat::Object | RelationFormat::File | RelationFormat::Relations
        )
    }

    /// Formats that naturally hold ordered magnitudes
    pub fn is_ordinal(&self) -> bool {
        matches!(self, RelationFormat::Number | RelationFormat::Date) || self.is_text()
    }
}

impl fmt::Display for RelationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
