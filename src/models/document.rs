// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! The single persisted document holding all application state.

use super::Activity;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Entire persisted state of a deployment.
///
/// Users and classes are opaque to the server; they are stored exactly as
/// the frontend sends them. Missing collections default to empty so a
/// partially written file still loads, and a single malformed activity or
/// timestamp is dropped instead of failing the whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub users: Vec<Value>,
    #[serde(default)]
    pub classes: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_activities")]
    pub activities: Vec<Activity>,
    /// Last write time (ISO 8601), `None` until the first save
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<String>,
}

fn lenient_activities<'de, D>(deserializer: D) -> Result<Vec<Activity>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match Activity::from_stored(value) {
            Ok(activity) => Some(activity),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping unreadable activity record");
                None
            }
        })
        .collect())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        Value::Null => Ok(None),
        other => {
            tracing::warn!(value = %other, "Ignoring non-string updatedAt");
            Ok(None)
        }
    }
}

/// The users/classes view served by `/api/snapshot`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub users: Vec<Value>,
    pub classes: Vec<Value>,
    pub updated_at: Option<String>,
}

impl From<Document> for Snapshot {
    fn from(doc: Document) -> Self {
        Self {
            users: doc.users,
            classes: doc.classes,
            updated_at: doc.updated_at,
        }
    }
}
