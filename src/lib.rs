// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Classbook: storage backend for users, classes, and activities
//!
//! This crate provides a small REST API over a single JSON document that is
//! persisted to a local file and mirrored to Firestore when available.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod time_utils;

use config::Config;
use db::Database;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
}
