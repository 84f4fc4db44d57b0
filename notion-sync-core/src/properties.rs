//! Record → Notion page property mapping.
//!
//! The mapping table is fixed: each entry pairs a Notion property name with
//! the record field it is read from and the property type it is written as.

use serde_json::{json, Map, Value};

use crate::models::Record;

/// Notion property types this crate writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Title,
    RichText,
    Select,
    Date,
}

/// (Notion property, record field, kind)
pub const PROPERTY_MAPPING: &[(&str, &str, PropertyKind)] = &[
    ("Name", "name", PropertyKind::Title),
    ("UID", "uid", PropertyKind::RichText),
    ("Status", "status", PropertyKind::Select),
    ("Reviewer Name", "reviewer_name", PropertyKind::RichText),
    ("Review Date", "review_date", PropertyKind::Date),
    ("Next Follow Up", "next_follow_up", PropertyKind::Date),
    ("Date Added", "date_added", PropertyKind::Date),
    ("Platform", "platform", PropertyKind::Select),
    ("Socials", "socials", PropertyKind::RichText),
];

/// Notion property holding the record uid, used for existence lookups.
pub const UID_PROPERTY: &str = "UID";

/// Fields an update may touch. uid, name and date_added are fixed at creation.
pub const MUTABLE_FIELDS: &[&str] = &[
    "status",
    "platform",
    "socials",
    "reviewer_name",
    "review_date",
    "next_follow_up",
];

impl PropertyKind {
    /// Property payload for `content`, or `None` when the kind skips it.
    pub fn payload(self, content: String) -> Option<Value> {
        match self {
            PropertyKind::Title => Some(json!({ "title": [{ "text": { "content": content } }] })),
            PropertyKind::RichText => {
                Some(json!({ "rich_text": [{ "text": { "content": content } }] }))
            }
            PropertyKind::Select => Some(json!({ "select": { "name": content } })),
            PropertyKind::Date if content.is_empty() => None,
            PropertyKind::Date => Some(json!({ "date": { "start": content } })),
        }
    }
}

/// Format every mapped field present in `record`.
pub fn format_properties(record: &Record) -> Map<String, Value> {
    format_fields(record, |_| true)
}

/// Format only the mutable fields present in `record`.
pub fn format_update_properties(record: &Record) -> Map<String, Value> {
    format_fields(record, |field| MUTABLE_FIELDS.contains(&field))
}

fn format_fields<F>(record: &Record, include: F) -> Map<String, Value>
where
    F: Fn(&str) -> bool,
{
    let mut properties = Map::new();
    for (property, field, kind) in PROPERTY_MAPPING {
        if !include(field) {
            continue;
        }
        let Some(value) = record.get(field) else {
            continue;
        };
        if let Some(payload) = kind.payload(value.to_string()) {
            properties.insert(property.to_string(), payload);
        }
    }
    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;
    use chrono::NaiveDate;

    fn as_value(map: Map<String, Value>) -> Value {
        Value::Object(map)
    }

    #[test]
    fn test_status_formats_as_select() {
        let record = Record::new().with("status", "Active");
        assert_eq!(
            as_value(format_properties(&record)),
            json!({"Status": {"select": {"name": "Active"}}})
        );
    }

    #[test]
    fn test_uid_formats_as_rich_text() {
        let record = Record::new().with("uid", "123");
        assert_eq!(
            as_value(format_properties(&record)),
            json!({"UID": {"rich_text": [{"text": {"content": "123"}}]}})
        );
    }

    #[test]
    fn test_full_record_covers_every_kind() {
        let record = Record::new()
            .with("uid", "u-7")
            .with("name", "Ada Lovelace")
            .with("status", "Contacted")
            .with("reviewer_name", "Grace")
            .with("review_date", FieldValue::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()))
            .with("next_follow_up", "2024-06-01")
            .with("date_added", FieldValue::Null)
            .with("platform", "X")
            .with("socials", "@ada")
            .with("sync_status", "pending");

        assert_eq!(
            as_value(format_properties(&record)),
            json!({
                "Name": {"title": [{"text": {"content": "Ada Lovelace"}}]},
                "UID": {"rich_text": [{"text": {"content": "u-7"}}]},
                "Status": {"select": {"name": "Contacted"}},
                "Reviewer Name": {"rich_text": [{"text": {"content": "Grace"}}]},
                "Review Date": {"date": {"start": "2024-05-01"}},
                "Next Follow Up": {"date": {"start": "2024-06-01"}},
                "Platform": {"select": {"name": "X"}},
                "Socials": {"rich_text": [{"text": {"content": "@ada"}}]}
            })
        );
    }

    #[test]
    fn test_empty_date_is_omitted_but_empty_text_is_kept() {
        let record = Record::new().with("review_date", "").with("socials", "");
        let properties = format_properties(&record);
        assert!(!properties.contains_key("Review Date"));
        assert_eq!(
            properties.get("Socials"),
            Some(&json!({"rich_text": [{"text": {"content": ""}}]}))
        );
    }

    #[test]
    fn test_non_text_values_are_stringified() {
        let record = Record::new()
            .with("uid", FieldValue::Integer(991))
            .with("status", FieldValue::Bool(true));
        assert_eq!(
            as_value(format_properties(&record)),
            json!({
                "UID": {"rich_text": [{"text": {"content": "991"}}]},
                "Status": {"select": {"name": "true"}}
            })
        );
    }

    #[test]
    fn test_update_skips_immutable_fields() {
        let record = Record::new()
            .with("uid", "u-1")
            .with("name", "Ada")
            .with("date_added", "2024-01-01")
            .with("status", "Done")
            .with("platform", "Reddit");

        assert_eq!(
            as_value(format_update_properties(&record)),
            json!({
                "Status": {"select": {"name": "Done"}},
                "Platform": {"select": {"name": "Reddit"}}
            })
        );
    }
}
