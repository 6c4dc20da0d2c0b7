// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Remote mirror abstraction.
//!
//! The remote store holds a copy of the same [`Document`] keyed by a fixed
//! discriminator. It is optional and best-effort: implementations report
//! their connection state through [`RemoteStore::state`] and never panic
//! on failure.

use crate::models::Document;
use serde::Serialize;
use std::future::Future;

/// Key identifying the one logical document in the remote collection.
pub const DISCRIMINATOR: &str = "maindb";

/// Connection lifecycle of a remote store.
///
/// `Unconfigured` is terminal. `Connecting` moves to `Connected` or
/// `Disconnected`, and any runtime failure moves `Connected` to
/// `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum BackendState {
    Unconfigured,
    Connecting,
    Connected,
    Disconnected,
}

impl BackendState {
    pub fn is_available(self) -> bool {
        self == BackendState::Connected
    }
}

/// A remote document store that mirrors the local database.
pub trait RemoteStore: Send + Sync + 'static {
    /// Current connection state.
    fn state(&self) -> BackendState;

    /// Whether reads and writes should be attempted right now.
    fn is_available(&self) -> bool {
        self.state().is_available()
    }

    /// Fetch the document. `Ok(None)` when no record exists yet.
    fn load(&self) -> impl Future<Output = Result<Option<Document>, RemoteError>> + Send;

    /// Create or replace the document.
    fn upsert(&self, doc: &Document) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

/// Errors from remote store operations.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Remote store not connected ({0:?})")]
    NotConnected(BackendState),

    #[error("Remote store error: {0}")]
    Backend(String),
}
