// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod api;

use crate::db::BackendState;
use crate::error::AppError;
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::extract::{DefaultBodyLimit, State};
use axum::handler::HandlerWithoutStateExt;
use axum::http::Uri;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Largest accepted request body (snapshots carry the whole class roster).
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: now_rfc3339(),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DbStatusResponse {
    pub status: String,
    pub remote_connected: bool,
    pub backend_state: BackendState,
    pub database: String,
    pub timestamp: String,
}

/// Which backend is currently serving as the mirror.
async fn db_status(State(state): State<Arc<AppState>>) -> Json<DbStatusResponse> {
    let backend_state = state.db.backend_state();
    let remote_connected = backend_state.is_available();

    Json(DbStatusResponse {
        status: "ok".to_string(),
        remote_connected,
        backend_state,
        database: if remote_connected {
            "Firestore"
        } else {
            "Local JSON"
        }
        .to_string(),
        timestamp: now_rfc3339(),
    })
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No endpoint at {}", uri.path()))
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/db-status", get(db_status))
        .merge(api::routes());

    // Static frontend files, falling through to the JSON 404
    let router = match &state.config.static_dir {
        Some(dir) => {
            tracing::info!(path = %dir.display(), "Serving static files");
            router.fallback_service(ServeDir::new(dir).not_found_service(not_found.into_service()))
        }
        None => router.fallback(not_found),
    };

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
