//! Well-known relation keys and object layouts
//!
//! Formats for system relations are fixed; stores consult this table for
//! keys they have no explicit metadata for.

use super::format::RelationFormat;

pub const RELATION_ID: &str = "id";
pub const RELATION_NAME: &str = "name";
pub const RELATION_DESCRIPTION: &str = "description";
pub const RELATION_SNIPPET: &str = "snippet";
pub const RELATION_TYPE: &str = "type";
pub const RELATION_LAYOUT: &str = "layout";
pub const RELATION_RESOLVED_LAYOUT: &str = "resolvedLayout";
pub const RELATION_SPACE_ID: &str = "spaceId";
pub const RELATION_IS_ARCHIVED: &str = "isArchived";
pub const RELATION_IS_DELETED: &str = "isDeleted";
pub const RELATION_IS_HIDDEN: &str = "isHidden";
pub const RELATION_CREATED_DATE: &str = "createdDate";
pub const RELATION_LAST_MODIFIED_DATE: &str = "lastModifiedDate";
pub const RELATION_TIMESTAMP: &str = "timestamp";
pub const RELATION_TAG: &str = "tag";
pub const RELATION_STATUS: &str = "status";

/// Object layouts, stored as integers under `layout` / `resolvedLayout`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum ObjectLayout {
    Basic = 0,
    Profile = 1,
    Todo = 2,
    Set = 3,
    ObjectType = 4,
    Relation = 5,
    File = 6,
    Note = 9,
    Space = 10,
    Collection = 14,
    Date = 17,
    SpaceView = 18,
}

impl ObjectLayout {
    pub fn code(self) -> i64 {
        self as i64
    }
}

/// Returns the fixed format of a well-known relation
pub fn relation_format(key: &str) -> Option<RelationFormat> {
    let format = match key {
        RELATION_ID | RELATION_TYPE | RELATION_SPACE_ID => RelationFormat::Object,
        RELATION_NAME | RELATION_SNIPPET => RelationFormat::ShortText,
        RELATION_DESCRIPTION => RelationFormat::LongText,
        RELATION_LAYOUT | RELATION_RESOLVED_LAYOUT => RelationFormat::Number,
        RELATION_IS_ARCHIVED | RELATION_IS_DELETED | RELATION_IS_HIDDEN => {
            RelationFormat::Checkbox
        }
        RELATION_CREATED_DATE | RELATION_LAST_MODIFIED_DATE | RELATION_TIMESTAMP => {
            RelationFormat::Date
        }
        RELATION_TAG => RelationFormat::Tag,
        RELATION_STATUS => RelationFormat::Status,
        _ => return None,
    };
    Some(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_relation_formats() {
        assert_eq!(relation_format("isDeleted"), Some(RelationFormat::Checkbox));
        assert_eq!(relation_format("type"), Some(RelationFormat::Object));
        assert_eq!(relation_format("createdDate"), Some(RelationFormat::Date));
        assert_eq!(relation_format("someUserRelation"), None);
    }

    #[test]
    fn test_layout_codes() {
        assert_eq!(ObjectLayout::Space.code(), 10);
        assert_eq!(ObjectLayout::SpaceView.code(), 18);
    }
}
