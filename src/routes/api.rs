// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for snapshots and activities.
//!
//! Handlers validate the request shape and hand off to [`crate::db::Database`];
//! nothing past validation can fail.

use crate::error::{AppError, Result};
use crate::models::{Activity, NewActivity, Snapshot};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Snapshot and activity routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/snapshot", get(get_snapshot).post(save_snapshot))
        .route("/api/activity", post(record_activity))
        .route("/api/activities", get(list_activities))
        .route("/api/activities/{class_id}", get(list_class_activities))
}

/// Unwrap a JSON body, turning malformed JSON into a 400 and an oversized
/// body into a 413.
fn json_body(body: std::result::Result<Json<Value>, JsonRejection>) -> Result<Value> {
    body.map(|Json(value)| value).map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(e.body_text())
        } else {
            AppError::BadRequest(e.body_text())
        }
    })
}

// ─── Snapshot ────────────────────────────────────────────────

async fn get_snapshot(State(state): State<Arc<AppState>>) -> Json<Snapshot> {
    Json(state.db.snapshot())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSavedResponse {
    pub status: &'static str,
    pub updated_at: Option<String>,
}

/// Replace users and classes.
///
/// Both `users` and `classes` must be arrays; anything else is rejected
/// before the database is touched.
async fn save_snapshot(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<SnapshotSavedResponse>> {
    let mut body = json_body(body)?;

    let users = take_array(&mut body, "users");
    let classes = take_array(&mut body, "classes");
    let (Some(users), Some(classes)) = (users, classes) else {
        return Err(AppError::BadRequest(
            "Invalid snapshot: 'users' and 'classes' must be arrays".to_string(),
        ));
    };

    let doc = state.db.replace_snapshot(users, classes);

    Ok(Json(SnapshotSavedResponse {
        status: "ok",
        updated_at: doc.updated_at,
    }))
}

fn take_array(body: &mut Value, key: &str) -> Option<Vec<Value>> {
    match body.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    }
}

// ─── Activities ──────────────────────────────────────────────

#[derive(Serialize)]
pub struct ActivityRecordedResponse {
    pub status: &'static str,
    pub activity: Activity,
}

/// Append an activity. `userId` and `classId` are required.
async fn record_activity(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<ActivityRecordedResponse>> {
    let new = NewActivity::from_json(json_body(body)?).ok_or_else(|| {
        AppError::BadRequest("Invalid activity: 'userId' and 'classId' are required".to_string())
    })?;

    let activity = state.db.record_activity(new);

    Ok(Json(ActivityRecordedResponse {
        status: "ok",
        activity,
    }))
}

#[derive(Serialize)]
pub struct ActivitiesResponse {
    pub activities: Vec<Activity>,
}

async fn list_activities(State(state): State<Arc<AppState>>) -> Json<ActivitiesResponse> {
    Json(ActivitiesResponse {
        activities: state.db.activities(None),
    })
}

async fn list_class_activities(
    State(state): State<Arc<AppState>>,
    Path(class_id): Path<String>,
) -> Json<ActivitiesResponse> {
    Json(ActivitiesResponse {
        activities: state.db.activities(Some(&class_id)),
    })
}
