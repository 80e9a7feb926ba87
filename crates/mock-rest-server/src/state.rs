//! Shared application state handed to every connection.

use crate::config::{ApiConfig, Config, DispatchConfig};
use crate::mock::MockLifecycle;
use crate::registry::MockRegistry;
use crate::store::MockStore;
use std::sync::Arc;

pub struct AppState {
    pub lifecycle: MockLifecycle,
    pub registry: Arc<MockRegistry>,
    pub store: Arc<dyn MockStore>,
    pub dispatch: DispatchConfig,
    pub api: ApiConfig,
}

impl AppState {
    /// Wire a store into a fresh registry and lifecycle
    pub fn new(store: Arc<dyn MockStore>, config: &Config) -> Self {
        let registry = Arc::new(MockRegistry::new());
        Self {
            lifecycle: MockLifecycle::new(Arc::clone(&store), Arc::clone(&registry)),
            registry,
            store,
            dispatch: config.dispatch.clone(),
            api: config.api.clone(),
        }
    }
}
