//! In-memory index of registered mocks and installed routes.
//!
//! The registry answers two questions at request time without touching the
//! store: "which mock has this id?" and "has this `(method, path)` ever been
//! registered?". Routes are installed on first registration and never
//! removed, so a route whose mocks were all deleted stays installed.
//!
//! Forgotten ids are remembered: a registration that arrives after the
//! matching `forget` (a create racing a delete of the same id) is dropped.

use crate::mock::{HttpMethod, MockDefinition, RouteKey};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Registered mocks, by route and by id
pub struct MockRegistry {
    state: RwLock<RegistryState>,
}

#[derive(Default)]
struct RegistryState {
    /// Installed routes and the mocks currently registered under each
    routes: HashMap<RouteKey, HashMap<Uuid, Arc<MockDefinition>>>,
    /// Id -> route, for O(1) lookup by correlation id
    index: HashMap<Uuid, RouteKey>,
    /// Ids deleted from the store; never registered again
    forgotten: HashSet<Uuid>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
        }
    }

    /// Register a mock. Returns true if its route was newly installed.
    ///
    /// Registering the same mock twice, or a mock already forgotten, is a
    /// no-op.
    pub fn register(&self, mock: MockDefinition) -> bool {
        let mut state = self.state.write();
        Self::register_locked(&mut *state, mock)
    }

    fn register_locked(state: &mut RegistryState, mock: MockDefinition) -> bool {
        let route = mock.route();
        let id = mock.id;
        if state.forgotten.contains(&id) {
            debug!(mock_id = %id, "Skipping registration of deleted mock");
            return false;
        }

        let installed = !state.routes.contains_key(&route);
        state
            .routes
            .entry(route.clone())
            .or_default()
            .insert(id, Arc::new(mock));
        state.index.insert(id, route.clone());

        if installed {
            debug!(route = %route, "Installed route");
        }
        installed
    }

    /// Drop a mock from the index. Its route stays installed.
    ///
    /// The id is remembered even if it was not registered yet. Returns false
    /// if the id was not registered.
    pub fn forget(&self, id: Uuid) -> bool {
        let mut state = self.state.write();
        state.forgotten.insert(id);
        let Some(route) = state.index.remove(&id) else {
            return false;
        };
        if let Some(mocks) = state.routes.get_mut(&route) {
            mocks.remove(&id);
        }
        true
    }

    /// Look up a registered mock by id, regardless of route
    pub fn find(&self, id: Uuid) -> Option<Arc<MockDefinition>> {
        let state = self.state.read();
        let route = state.index.get(&id)?;
        state.routes.get(route)?.get(&id).cloned()
    }

    pub fn has_route(&self, method: HttpMethod, path: &str) -> bool {
        self.state
            .read()
            .routes
            .contains_key(&RouteKey::new(method, path))
    }

    pub fn route_count(&self) -> usize {
        self.state.read().routes.len()
    }

    pub fn mock_count(&self) -> usize {
        self.state.read().index.len()
    }

    /// Installed routes, sorted by method then path
    pub fn routes(&self) -> Vec<RouteKey> {
        let mut routes: Vec<RouteKey> = self.state.read().routes.keys().cloned().collect();
        routes.sort();
        routes
    }

    /// Replace the whole index with `mocks`
    pub fn rebuild(&self, mocks: impl IntoIterator<Item = MockDefinition>) -> usize {
        let mut fresh = RegistryState::default();
        for mock in mocks {
            Self::register_locked(&mut fresh, mock);
        }
        let count = fresh.index.len();
        *self.state.write() = fresh;
        count
    }
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::NewMock;
    use chrono::Utc;

    fn mock(method: HttpMethod, path: &str) -> MockDefinition {
        NewMock::new(method, path, 200).into_definition(Uuid::new_v4(), Utc::now())
    }

    #[test]
    fn test_register_installs_route_once() {
        let registry = MockRegistry::new();
        assert!(registry.register(mock(HttpMethod::Get, "/orders")));
        assert!(!registry.register(mock(HttpMethod::Get, "/orders")));
        assert!(registry.register(mock(HttpMethod::Post, "/orders")));

        assert_eq!(registry.route_count(), 2);
        assert_eq!(registry.mock_count(), 3);
    }

    #[test]
    fn test_register_same_mock_twice_is_noop() {
        let registry = MockRegistry::new();
        let m = mock(HttpMethod::Get, "/a");
        registry.register(m.clone());
        assert!(!registry.register(m.clone()));
        assert_eq!(registry.mock_count(), 1);
        assert_eq!(registry.find(m.id).as_deref(), Some(&m));
    }

    #[test]
    fn test_route_match_is_exact() {
        let registry = MockRegistry::new();
        registry.register(mock(HttpMethod::Get, "/orders"));

        assert!(registry.has_route(HttpMethod::Get, "/orders"));
        assert!(!registry.has_route(HttpMethod::Get, "/orders/"));
        assert!(!registry.has_route(HttpMethod::Get, "/Orders"));
        assert!(!registry.has_route(HttpMethod::Put, "/orders"));
    }

    #[test]
    fn test_forget_keeps_route() {
        let registry = MockRegistry::new();
        let m = mock(HttpMethod::Delete, "/orders");
        registry.register(m.clone());

        assert!(registry.forget(m.id));
        assert!(!registry.forget(m.id));
        assert!(registry.find(m.id).is_none());
        assert!(registry.has_route(HttpMethod::Delete, "/orders"));
        assert_eq!(registry.mock_count(), 0);
    }

    #[test]
    fn test_forget_before_register_wins() {
        let registry = MockRegistry::new();
        let m = mock(HttpMethod::Get, "/late");

        assert!(!registry.forget(m.id));
        assert!(!registry.register(m.clone()));
        assert!(registry.find(m.id).is_none());
        assert!(!registry.has_route(HttpMethod::Get, "/late"));
        assert_eq!(registry.mock_count(), 0);
    }

    #[test]
    fn test_routes_sorted() {
        let registry = MockRegistry::new();
        registry.register(mock(HttpMethod::Post, "/b"));
        registry.register(mock(HttpMethod::Get, "/z"));
        registry.register(mock(HttpMethod::Get, "/a"));

        let listed: Vec<String> = registry.routes().iter().map(|r| r.to_string()).collect();
        assert_eq!(listed, vec!["GET /a", "GET /z", "POST /b"]);
    }

    #[test]
    fn test_rebuild_replaces_index() {
        let registry = MockRegistry::new();
        let old = mock(HttpMethod::Get, "/old");
        registry.register(old.clone());

        let restored = vec![mock(HttpMethod::Get, "/a"), mock(HttpMethod::Get, "/a")];
        assert_eq!(registry.rebuild(restored.clone()), 2);

        assert!(registry.find(old.id).is_none());
        assert!(!registry.has_route(HttpMethod::Get, "/old"));
        assert_eq!(registry.route_count(), 1);
        for m in &restored {
            assert!(registry.find(m.id).is_some());
        }
    }

    #[test]
    fn test_concurrent_register_installs_one_route() {
        let registry = Arc::new(MockRegistry::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.register(mock(HttpMethod::Get, "/race")))
            })
            .collect();

        let installed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|installed| *installed)
            .count();

        assert_eq!(installed, 1);
        assert_eq!(registry.route_count(), 1);
        assert_eq!(registry.mock_count(), 16);
    }
}
