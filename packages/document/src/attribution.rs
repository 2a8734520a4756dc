//! Attribution records carried by top-level blocks.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Identity of the person editing notes, supplied by the host application
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Who last edited a block, and when
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributionRecord {
    pub last_edited_by: Option<User>,
    pub last_edited_at: Option<DateTime<Utc>>,
}

impl AttributionRecord {
    pub fn stamped(user: User, at: DateTime<Utc>) -> Self {
        Self {
            last_edited_by: Some(user),
            last_edited_at: Some(at),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.last_edited_by.is_none() && self.last_edited_at.is_none()
    }

    pub fn editor_name(&self) -> Option<&str> {
        self.last_edited_by.as_ref().map(|user| user.name.as_str())
    }

    /// Edit time in the wire format (`2026-10-15T09:30:00.000Z`)
    pub fn edited_at_iso(&self) -> Option<String> {
        self.last_edited_at
            .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            "lastEditedBy".to_string(),
            match &self.last_edited_by {
                Some(user) => serde_json::json!({ "id": user.id, "name": user.name }),
                None => Value::Null,
            },
        );
        map.insert(
            "lastEditedAt".to_string(),
            self.edited_at_iso().map(Value::String).unwrap_or(Value::Null),
        );
        Value::Object(map)
    }

    /// Permissive read: ill-typed fields become `None` instead of failing
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;

        let last_edited_by = match map.get("lastEditedBy") {
            None | Some(Value::Null) => None,
            Some(raw) => match serde_json::from_value::<User>(raw.clone()) {
                Ok(user) => Some(user),
                Err(err) => {
                    warn!(error = %err, "Ignoring malformed lastEditedBy");
                    None
                }
            },
        };

        let last_edited_at = match map.get("lastEditedAt").and_then(Value::as_str) {
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(at) => Some(at.with_timezone(&Utc)),
                Err(err) => {
                    warn!(value = raw, error = %err, "Ignoring malformed lastEditedAt");
                    None
                }
            },
            None => None,
        };

        Some(Self {
            last_edited_by,
            last_edited_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_wire_shape() {
        let at = Utc.with_ymd_and_hms(2026, 10, 15, 9, 30, 0).unwrap();
        let record = AttributionRecord::stamped(User::new("u1", "Dana"), at);

        let value = record.to_value();
        assert_eq!(value["lastEditedBy"]["name"], "Dana");
        assert_eq!(value["lastEditedAt"], "2026-10-15T09:30:00.000Z");

        assert_eq!(AttributionRecord::from_value(&value), Some(record));
    }

    #[test]
    fn test_malformed_fields_default_to_none() {
        let value = serde_json::json!({ "lastEditedBy": 42, "lastEditedAt": "yesterday" });
        let record = AttributionRecord::from_value(&value).unwrap();

        assert!(record.is_empty());
        assert!(AttributionRecord::from_value(&Value::Null).is_none());
    }
}
