// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! [`Database`] presents one logical document over two backends: the local
//! JSON file, which is always written and serves all synchronous reads, and
//! an optional remote mirror that receives every write in the background.
//! The façade never returns an error to its caller; failures are
//! logged and replaced by a default document or a no-op.

pub mod firestore;
pub mod local;
pub mod remote;

pub use firestore::FirestoreStore;
pub use local::{LocalStore, LocalStoreError};
pub use remote::{BackendState, RemoteError, RemoteStore, DISCRIMINATOR};

use crate::models::{Activity, Document, NewActivity, Snapshot};
use crate::time_utils::{format_utc_rfc3339, now_rfc3339};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Collection names as constants.
pub mod collections {
    /// Holds the single discriminated database record.
    pub const DB_COLLECTIONS: &str = "dbcollections";
}

/// Persistence façade over the local file and the remote mirror.
pub struct Database<R = FirestoreStore> {
    local: LocalStore,
    remote: Arc<R>,
    /// Serializes read-modify-write cycles on the local document.
    write_lock: Mutex<()>,
}

impl<R: RemoteStore> Database<R> {
    pub fn new(local: LocalStore, remote: Arc<R>) -> Self {
        Self {
            local,
            remote,
            write_lock: Mutex::new(()),
        }
    }

    /// Current remote backend state.
    pub fn backend_state(&self) -> BackendState {
        self.remote.state()
    }

    /// Read the document from the local file.
    pub fn load(&self) -> Document {
        self.local.load()
    }

    /// Read the document, preferring the remote copy when it is reachable.
    ///
    /// Falls back to the local file when the remote store is unavailable,
    /// has no record, or fails.
    pub async fn load_authoritative(&self) -> Document {
        if !self.remote.is_available() {
            return self.local.load();
        }

        match self.remote.load().await {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                tracing::debug!("No remote document yet, reading local database");
                self.local.load()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Remote read failed, reading local database");
                self.local.load()
            }
        }
    }

    /// Stamp `updatedAt`, write locally, and mirror to the remote store.
    ///
    /// The local write happens before this returns. The remote write is
    /// spawned and never awaited; its outcome is only logged.
    pub fn save(&self, mut doc: Document) -> Document {
        doc.updated_at = Some(now_rfc3339());
        self.local.save(&doc);
        self.mirror(&doc);
        doc
    }

    fn mirror(&self, doc: &Document) {
        let state = self.remote.state();
        if !state.is_available() {
            tracing::trace!(?state, "Remote store unavailable, skipping mirror");
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime available, skipping remote mirror");
            return;
        };

        let remote = Arc::clone(&self.remote);
        let doc = doc.clone();
        runtime.spawn(async move {
            if let Err(e) = remote.upsert(&doc).await {
                tracing::error!(error = %e, "Failed to mirror database to remote store");
            }
        });
    }

    // ─── Snapshot Operations ─────────────────────────────────────

    /// Users and classes as last saved.
    pub fn snapshot(&self) -> Snapshot {
        self.load().into()
    }

    /// Replace users and classes, keeping recorded activities.
    pub fn replace_snapshot(&self, users: Vec<Value>, classes: Vec<Value>) -> Document {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut doc = self.load();
        doc.users = users;
        doc.classes = classes;
        let doc = self.save(doc);

        tracing::info!(
            users = doc.users.len(),
            classes = doc.classes.len(),
            "Snapshot saved"
        );
        doc
    }

    // ─── Activity Operations ─────────────────────────────────────

    /// Assign an id and timestamp to a new activity and append it.
    pub fn record_activity(&self, new: NewActivity) -> Activity {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut doc = self.load();
        let (id, timestamp) = next_activity_id(&doc.activities, Utc::now().timestamp_millis());
        let activity = new.into_activity(id, timestamp);

        doc.activities.push(activity.clone());
        let doc = self.save(doc);

        tracing::info!(
            activity_id = %activity.id,
            user_id = %activity.user_id,
            class_id = %activity.class_id,
            total = doc.activities.len(),
            "Activity recorded"
        );
        activity
    }

    /// All activities, or only those for `class_id`, in insertion order.
    pub fn activities(&self, class_id: Option<&str>) -> Vec<Activity> {
        let activities = self.load().activities;
        match class_id {
            Some(class_id) => activities
                .into_iter()
                .filter(|a| a.class_id == class_id)
                .collect(),
            None => activities,
        }
    }
}

/// Pick an id for a new activity from the creation time in milliseconds.
///
/// The id is bumped one millisecond at a time until it does not collide with
/// an existing activity. The timestamp is derived from the same instant.
fn next_activity_id(existing: &[Activity], now_millis: i64) -> (String, String) {
    let taken: HashSet<&str> = existing.iter().map(|a| a.id.as_str()).collect();
    let mut millis = now_millis;
    let mut id = millis.to_string();
    while taken.contains(id.as_str()) {
        millis += 1;
        id = millis.to_string();
    }

    let timestamp = Utc
        .timestamp_millis_opt(millis)
        .single()
        .map(format_utc_rfc3339)
        .unwrap_or_else(now_rfc3339);

    (id, timestamp)
}
