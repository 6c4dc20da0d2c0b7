// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use classbook_api::config::Config;
use classbook_api::db::{BackendState, Database, FirestoreStore, LocalStore, RemoteError, RemoteStore};
use classbook_api::models::Document;
use classbook_api::routes::create_router;
use classbook_api::AppState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// In-memory remote store with controllable state and failures.
///
/// Every upsert attempt is reported on the channel returned by
/// [`FakeRemote::new`], whether it succeeds or not.
#[allow(dead_code)]
pub struct FakeRemote {
    state: Mutex<BackendState>,
    stored: Mutex<Option<Document>>,
    fail: AtomicBool,
    hang: AtomicBool,
    attempts: mpsc::UnboundedSender<Document>,
}

#[allow(dead_code)]
impl FakeRemote {
    pub fn new(state: BackendState) -> (Arc<Self>, mpsc::UnboundedReceiver<Document>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let fake = Arc::new(Self {
            state: Mutex::new(state),
            stored: Mutex::new(None),
            fail: AtomicBool::new(false),
            hang: AtomicBool::new(false),
            attempts: tx,
        });
        (fake, rx)
    }

    pub fn set_state(&self, state: BackendState) {
        *self.state.lock().unwrap() = state;
    }

    /// Make every operation fail (and mark the store disconnected).
    pub fn fail_operations(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// Make upserts never complete.
    pub fn hang_upserts(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }

    pub fn set_stored(&self, doc: Option<Document>) {
        *self.stored.lock().unwrap() = doc;
    }

    pub fn stored(&self) -> Option<Document> {
        self.stored.lock().unwrap().clone()
    }

    fn check_failure(&self) -> Result<(), RemoteError> {
        if self.fail.load(Ordering::SeqCst) {
            self.set_state(BackendState::Disconnected);
            return Err(RemoteError::Backend("injected failure".to_string()));
        }
        Ok(())
    }
}

impl RemoteStore for FakeRemote {
    fn state(&self) -> BackendState {
        *self.state.lock().unwrap()
    }

    async fn load(&self) -> Result<Option<Document>, RemoteError> {
        self.check_failure()?;
        Ok(self.stored())
    }

    async fn upsert(&self, doc: &Document) -> Result<(), RemoteError> {
        let _ = self.attempts.send(doc.clone());
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.check_failure()?;
        self.set_stored(Some(doc.clone()));
        Ok(())
    }
}

/// Local store in a fresh temp directory.
#[allow(dead_code)]
pub fn temp_local_store() -> (LocalStore, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = LocalStore::new(dir.path().join("db.json"));
    (store, dir)
}

/// Database over a temp file and the given remote.
#[allow(dead_code)]
pub fn test_database<R: RemoteStore>(remote: Arc<R>) -> (Database<R>, TempDir) {
    let (local, dir) = temp_local_store();
    (Database::new(local, remote), dir)
}

/// Create a test app backed by a temp file with no remote configured.
/// Returns the router, the shared state, and the temp dir guard.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, TempDir) {
    let (local, dir) = temp_local_store();
    let mut config = Config::test_default();
    config.db_path = local.path().to_path_buf();

    let state = Arc::new(AppState {
        config,
        db: Database::new(local, Arc::new(FirestoreStore::unconfigured())),
    });

    (create_router(state.clone()), state, dir)
}

/// Build a JSON POST request.
#[allow(dead_code)]
pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a GET request.
#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
