//! MockLifecycle - create, read and delete mocks.
//!
//! Every write goes to the store first and is then mirrored into the
//! registry, so the registry never indexes a mock the store does not have.

use super::error::ApiError;
use super::types::MockDefinition;
use super::validation::MockInput;
use crate::registry::MockRegistry;
use crate::store::MockStore;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub const NO_MOCKS_FOUND: &str = "No mocks found";

/// Authoring operations on mocks
pub struct MockLifecycle {
    store: Arc<dyn MockStore>,
    registry: Arc<MockRegistry>,
}

impl MockLifecycle {
    pub fn new(store: Arc<dyn MockStore>, registry: Arc<MockRegistry>) -> Self {
        Self { store, registry }
    }

    /// Validate, persist and register a new mock
    pub async fn create(&self, input: MockInput) -> Result<MockDefinition, ApiError> {
        let new_mock = input.validate()?;
        let mock = self.store.put(new_mock).await?;

        let installed = self.registry.register(mock.clone());
        info!(
            mock_id = %mock.id,
            method = %mock.method,
            path = %mock.path,
            new_route = installed,
            "Created mock"
        );
        Ok(mock)
    }

    /// Every stored mock. An empty store is reported as not found.
    pub async fn get_all(&self) -> Result<Vec<MockDefinition>, ApiError> {
        let mocks = self.store.list_all().await?;
        if mocks.is_empty() {
            return Err(ApiError::not_found(NO_MOCKS_FOUND));
        }
        Ok(mocks)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<MockDefinition, ApiError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Mock with id {id} not found")))
    }

    /// Delete a mock. Returns false if it did not exist.
    pub async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let removed = self.store.delete(id).await?;
        if removed {
            self.registry.forget(id);
            info!(mock_id = %id, "Deleted mock");
        }
        Ok(removed)
    }

    /// Rebuild the registry from the store, returning the number of mocks indexed
    pub async fn restore(&self) -> Result<usize, ApiError> {
        let mocks = self.store.list_all().await?;
        let count = self.registry.rebuild(mocks);
        info!(
            mocks = count,
            routes = self.registry.route_count(),
            "Restored mocks from store"
        );
        for route in self.registry.routes() {
            debug!(route = %route, "Restored route");
        }
        Ok(count)
    }
}
