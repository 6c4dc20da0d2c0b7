// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity records appended by the `/api/activity` endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stored activity record.
///
/// `id` and `timestamp` are assigned by the server when the activity is
/// recorded. Any other fields supplied by the caller are kept verbatim in
/// `fields` and flattened back into the record on serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Creation time in epoch milliseconds, as a string
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub class_id: String,
    /// Creation time (ISO 8601, millisecond precision)
    #[serde(default)]
    pub timestamp: String,
    /// Caller-supplied fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Keys whose values are kept as strings even when stored as numbers.
const ID_KEYS: [&str; 4] = ["id", "userId", "classId", "timestamp"];

impl Activity {
    /// Parse a stored record, tolerating numeric ids.
    ///
    /// Older files may hold `userId`/`classId` as numbers; those are
    /// converted to their decimal string form rather than rejected.
    pub fn from_stored(mut value: Value) -> Result<Self, serde_json::Error> {
        if let Value::Object(fields) = &mut value {
            for key in ID_KEYS {
                let number = match fields.get(key) {
                    Some(Value::Number(n)) => n.to_string(),
                    _ => continue,
                };
                fields.insert(key.to_string(), Value::String(number));
            }
        }
        serde_json::from_value(value)
    }
}

/// A validated activity that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub user_id: String,
    pub class_id: String,
    pub fields: Map<String, Value>,
}

impl NewActivity {
    /// Build from an arbitrary JSON body.
    ///
    /// Returns `None` unless the body is an object carrying a non-empty
    /// `userId` and `classId`. Numeric ids are accepted and kept in their
    /// string form. Caller-supplied `id` and `timestamp` are
    /// dropped since both are server-assigned.
    pub fn from_json(body: Value) -> Option<Self> {
        let Value::Object(mut fields) = body else {
            return None;
        };

        let user_id = take_id(&mut fields, "userId")?;
        let class_id = take_id(&mut fields, "classId")?;
        fields.remove("id");
        fields.remove("timestamp");

        Some(Self {
            user_id,
            class_id,
            fields,
        })
    }

    /// Attach server-assigned fields.
    pub fn into_activity(self, id: String, timestamp: String) -> Activity {
        Activity {
            id,
            user_id: self.user_id,
            class_id: self.class_id,
            timestamp,
            fields: self.fields,
        }
    }
}

fn take_id(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}
