// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore-backed remote mirror.
//!
//! The whole database lives in a single document (`dbcollections/maindb`)
//! tagged with the discriminator and a server-set timestamp. The connection
//! is opened on a background task so startup never waits on the network.

use crate::db::collections;
use crate::db::remote::{BackendState, RemoteError, RemoteStore, DISCRIMINATOR};
use crate::models::Document;
use crate::time_utils::now_rfc3339;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// Remote record wrapping the embedded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RemoteRecord {
    #[serde(rename = "type")]
    kind: String,
    data: Document,
    #[serde(rename = "createdAt")]
    created_at: String,
}

enum Connection {
    Unconfigured,
    Connecting,
    Connected(firestore::FirestoreDb),
    Disconnected,
}

impl Connection {
    fn state(&self) -> BackendState {
        match self {
            Connection::Unconfigured => BackendState::Unconfigured,
            Connection::Connecting => BackendState::Connecting,
            Connection::Connected(_) => BackendState::Connected,
            Connection::Disconnected => BackendState::Disconnected,
        }
    }
}

/// Firestore remote store.
pub struct FirestoreStore {
    connection: RwLock<Connection>,
}

impl FirestoreStore {
    /// A store with no project configured. Permanently inert.
    pub fn unconfigured() -> Self {
        Self {
            connection: RwLock::new(Connection::Unconfigured),
        }
    }

    /// A store waiting for [`FirestoreStore::connect`] to finish.
    pub fn connecting() -> Self {
        Self {
            connection: RwLock::new(Connection::Connecting),
        }
    }

    /// Create the store and start connecting in the background.
    ///
    /// With no project ID the store stays `Unconfigured`. Must be called
    /// from within a Tokio runtime when a project ID is given.
    pub fn spawn(project_id: Option<String>) -> Arc<Self> {
        let Some(project_id) = project_id else {
            tracing::info!("No Firestore project configured, using local JSON only");
            return Arc::new(Self::unconfigured());
        };

        let store = Arc::new(Self::connecting());
        let handle = Arc::clone(&store);
        tokio::spawn(async move {
            handle.connect(&project_id).await;
        });
        store
    }

    /// Open the Firestore client and record the outcome.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn connect(&self, project_id: &str) {
        let result = if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            Self::create_emulator_client(project_id).await
        } else {
            firestore::FirestoreDb::new(project_id)
                .await
                .map_err(|e| RemoteError::Backend(format!("Failed to connect to Firestore: {}", e)))
        };

        match result {
            Ok(client) => {
                tracing::info!(project = project_id, "Connected to Firestore");
                self.set(Connection::Connected(client));
            }
            Err(e) => {
                tracing::warn!(
                    project = project_id,
                    error = %e,
                    "Firestore unavailable, using local JSON"
                );
                self.set(Connection::Disconnected);
            }
        }
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(
        project_id: &str,
    ) -> Result<firestore::FirestoreDb, RemoteError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| RemoteError::Backend(format!("Failed to connect to Firestore Emulator: {}", e)))
    }

    fn set(&self, connection: Connection) {
        *self
            .connection
            .write()
            .unwrap_or_else(PoisonError::into_inner) = connection;
    }

    /// Get a client handle, or an error if not connected.
    fn get_client(&self) -> Result<firestore::FirestoreDb, RemoteError> {
        match &*self
            .connection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
        {
            Connection::Connected(client) => Ok(client.clone()),
            other => Err(RemoteError::NotConnected(other.state())),
        }
    }

    /// Record a runtime failure: the store is marked disconnected so later
    /// operations skip it.
    fn fail(&self, e: firestore::errors::FirestoreError) -> RemoteError {
        tracing::warn!(error = %e, "Firestore operation failed, marking remote store disconnected");
        self.set(Connection::Disconnected);
        RemoteError::Backend(e.to_string())
    }
}

impl RemoteStore for FirestoreStore {
    fn state(&self) -> BackendState {
        self.connection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .state()
    }

    async fn load(&self) -> Result<Option<Document>, RemoteError> {
        let client = self.get_client()?;

        let record: Option<RemoteRecord> = client
            .fluent()
            .select()
            .by_id_in(collections::DB_COLLECTIONS)
            .obj()
            .one(DISCRIMINATOR)
            .await
            .map_err(|e| self.fail(e))?;

        Ok(record
            .filter(|r| r.kind == DISCRIMINATOR)
            .map(|r| r.data))
    }

    async fn upsert(&self, doc: &Document) -> Result<(), RemoteError> {
        let client = self.get_client()?;

        let record = RemoteRecord {
            kind: DISCRIMINATOR.to_string(),
            data: doc.clone(),
            created_at: now_rfc3339(),
        };

        let _: () = client
            .fluent()
            .update()
            .in_col(collections::DB_COLLECTIONS)
            .document_id(DISCRIMINATOR)
            .object(&record)
            .execute()
            .await
            .map_err(|e| self.fail(e))?;

        tracing::debug!("Database mirrored to Firestore");
        Ok(())
    }
}
