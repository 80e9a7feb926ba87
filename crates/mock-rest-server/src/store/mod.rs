//! Durable storage for mock definitions.
//!
//! The store exclusively owns persisted mocks. The registry and the
//! dispatcher only ever see copies handed out by a [`MockStore`].
//!
//! Backends:
//! - `memory`: [`InMemoryMockStore`], lost on restart
//! - `sqlite`: [`SqliteMockStore`], one table keyed by id with a
//!   `(method, path, created_at)` index

mod inmemory;
mod sqlite;

pub use inmemory::InMemoryMockStore;
pub use sqlite::SqliteMockStore;

use crate::config::{StorageBackend, StorageConfig};
use crate::mock::{HttpMethod, MockDefinition, NewMock};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("mock {0} already exists")]
    DuplicateId(Uuid),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend-agnostic storage for mock definitions
#[async_trait]
pub trait MockStore: Send + Sync {
    /// Persist a mock, assigning an id if absent and stamping timestamps
    async fn put(&self, mock: NewMock) -> StoreResult<MockDefinition>;

    /// Point lookup by id
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<MockDefinition>>;

    /// Most recently created mock for an exact `(method, path)`.
    ///
    /// Highest `created_at` wins; equal timestamps fall back to insertion
    /// order, later insertion winning.
    async fn latest_by_route(
        &self,
        method: HttpMethod,
        path: &str,
    ) -> StoreResult<Option<MockDefinition>>;

    /// Remove a mock. Returns false if it did not exist.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    /// All stored mocks, in no particular order
    async fn list_all(&self) -> StoreResult<Vec<MockDefinition>>;
}

/// Create a MockStore based on configuration
pub fn create_mock_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn MockStore>> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory mock store");
            Ok(Arc::new(InMemoryMockStore::new()))
        }
        StorageBackend::Sqlite => {
            let store = SqliteMockStore::open(&config.path).map_err(|e| {
                anyhow::anyhow!("Failed to open sqlite store at {}: {e}", config.path.display())
            })?;
            tracing::info!(path = %config.path.display(), "Using sqlite mock store");
            Ok(Arc::new(store))
        }
    }
}

/// Current time truncated to microseconds, the precision both backends keep
pub(crate) fn now() -> DateTime<Utc> {
    DateTime::from_timestamp_micros(Utc::now().timestamp_micros()).unwrap_or_else(Utc::now)
}
