use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A single column/field value as read from a backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%dT%H:%M:%S")),
            FieldValue::TimestampTz(ts) => f.write_str(&ts.to_rfc3339()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// One row/document fetched from the local database, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Non-null value for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    /// The natural key. Null and empty uids both count as missing.
    pub fn uid(&self) -> Option<String> {
        self.get("uid")
            .map(|v| v.to_string())
            .filter(|uid| !uid.is_empty())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_missing_null_or_empty() {
        assert!(Record::new().uid().is_none());
        assert!(Record::new().with("uid", FieldValue::Null).uid().is_none());
        assert!(Record::new().with("uid", "").uid().is_none());
        assert_eq!(Record::new().with("uid", "abc").uid().as_deref(), Some("abc"));
        assert_eq!(
            Record::new().with("uid", FieldValue::Integer(42)).uid().as_deref(),
            Some("42")
        );
    }

    #[test]
    fn test_dates_render_as_iso() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(FieldValue::Date(date).to_string(), "2024-03-09");

        let ts = date.and_hms_opt(14, 5, 0).unwrap();
        assert_eq!(FieldValue::Timestamp(ts).to_string(), "2024-03-09T14:05:00");
        assert_eq!(
            FieldValue::TimestampTz(ts.and_utc()).to_string(),
            "2024-03-09T14:05:00+00:00"
        );
    }

    #[test]
    fn test_record_serializes_as_flat_object() {
        let record = Record::new()
            .with("uid", "u-1")
            .with("status", FieldValue::Null)
            .with("count", FieldValue::Integer(3));
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({"uid": "u-1", "status": null, "count": 3})
        );
    }
}
