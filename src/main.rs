// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Classbook API Server
//!
//! Serves the snapshot and activity endpoints, persisting to a local JSON
//! file and mirroring to Firestore when a project is configured.

use classbook_api::{
    config::Config,
    db::{Database, FirestoreStore, LocalStore},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging()?;

    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Classbook API");

    // Remote mirror connects in the background; the local file serves
    // everything until (and unless) it comes up.
    let remote = FirestoreStore::spawn(config.firestore_project_id.clone());
    let local = LocalStore::new(&config.db_path);
    tracing::info!(path = %config.db_path.display(), "Using local database file");

    let state = Arc::new(AppState {
        config: config.clone(),
        db: Database::new(local, remote),
    });

    let app = classbook_api::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("classbook_api=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
