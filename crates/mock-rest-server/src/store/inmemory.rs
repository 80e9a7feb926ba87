use super::{now, MockStore, StoreError, StoreResult};
use crate::mock::{HttpMethod, MockDefinition, NewMock, RouteKey};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory implementation of MockStore
///
/// Every mutation happens under a single write lock, so readers never see a
/// half-inserted record. Useful for testing and single-instance deployments.
pub struct InMemoryMockStore {
    records: RwLock<Records>,
}

#[derive(Default)]
struct Records {
    by_id: HashMap<Uuid, StoredMock>,
    /// Ids per route, in insertion order
    by_route: HashMap<RouteKey, Vec<Uuid>>,
    next_seq: u64,
}

struct StoredMock {
    seq: u64,
    mock: MockDefinition,
}

impl InMemoryMockStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Records::default()),
        }
    }

    fn insert(&self, mock: NewMock, now: DateTime<Utc>) -> StoreResult<MockDefinition> {
        let mut records = self.records.write();

        let id = mock.id.unwrap_or_else(Uuid::new_v4);
        if records.by_id.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }

        let mock = mock.into_definition(id, now);
        let seq = records.next_seq;
        records.next_seq += 1;

        records.by_route.entry(mock.route()).or_default().push(id);
        records.by_id.insert(
            id,
            StoredMock {
                seq,
                mock: mock.clone(),
            },
        );
        Ok(mock)
    }
}

impl Default for InMemoryMockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MockStore for InMemoryMockStore {
    async fn put(&self, mock: NewMock) -> StoreResult<MockDefinition> {
        self.insert(mock, now())
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<MockDefinition>> {
        let records = self.records.read();
        Ok(records.by_id.get(&id).map(|stored| stored.mock.clone()))
    }

    async fn latest_by_route(
        &self,
        method: HttpMethod,
        path: &str,
    ) -> StoreResult<Option<MockDefinition>> {
        let records = self.records.read();
        let Some(ids) = records.by_route.get(&RouteKey::new(method, path)) else {
            return Ok(None);
        };

        Ok(ids
            .iter()
            .filter_map(|id| records.by_id.get(id))
            .max_by_key(|stored| (stored.mock.created_at, stored.seq))
            .map(|stored| stored.mock.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut records = self.records.write();
        let Some(removed) = records.by_id.remove(&id) else {
            return Ok(false);
        };

        let route = removed.mock.route();
        let route_empty = match records.by_route.get_mut(&route) {
            Some(ids) => {
                ids.retain(|existing| *existing != id);
                ids.is_empty()
            }
            None => false,
        };
        if route_empty {
            records.by_route.remove(&route);
        }
        Ok(true)
    }

    async fn list_all(&self) -> StoreResult<Vec<MockDefinition>> {
        let records = self.records.read();
        let mut stored: Vec<&StoredMock> = records.by_id.values().collect();
        stored.sort_by_key(|s| s.seq);
        Ok(stored.into_iter().map(|s| s.mock.clone()).collect())
    }
}
