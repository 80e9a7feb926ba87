//! SQLite-backed mock store.
//!
//! One `mock_data` table keyed by `id`. `seq` is an AUTOINCREMENT column
//! recording insertion order; timestamps are stored as microseconds since
//! the Unix epoch so that ordering is a plain integer comparison.

use super::{now, MockStore, StoreError, StoreResult};
use crate::mock::{HttpMethod, MockDefinition, NewMock};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS mock_data (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    method TEXT NOT NULL,
    path TEXT NOT NULL,
    status_code INTEGER NOT NULL,
    headers TEXT,
    body TEXT,
    delay_millis INTEGER,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_mock_data_route
    ON mock_data (method, path, created_at_us DESC, seq DESC);
"#;

const SELECT_COLUMNS: &str = "id, method, path, status_code, headers, body, delay_millis, \
     created_at_us, updated_at_us";

/// SQLite implementation of MockStore
///
/// A single connection guarded by a mutex; every call runs on the blocking
/// thread pool so store I/O never stalls the async workers.
pub struct SqliteMockStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMockStore {
    /// Open (or create) the database file and apply the schema
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;
        debug!(path = %path.display(), "Opened sqlite mock store");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            f(&*conn)
        })
        .await?
    }
}

#[async_trait]
impl MockStore for SqliteMockStore {
    async fn put(&self, mock: NewMock) -> StoreResult<MockDefinition> {
        self.with_conn(move |conn| insert_blocking(conn, mock, now()))
            .await
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<MockDefinition>> {
        self.with_conn(move |conn| {
            let sql = format!("SELECT {SELECT_COLUMNS} FROM mock_data WHERE id = ?1");
            conn.query_row(&sql, params![id.to_string()], read_row)
                .optional()?
                .map(StoredRow::into_definition)
                .transpose()
        })
        .await
    }

    async fn latest_by_route(
        &self,
        method: HttpMethod,
        path: &str,
    ) -> StoreResult<Option<MockDefinition>> {
        let path = path.to_owned();
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {SELECT_COLUMNS} FROM mock_data \
                 WHERE method = ?1 AND path = ?2 \
                 ORDER BY created_at_us DESC, seq DESC LIMIT 1"
            );
            conn.query_row(&sql, params![method.as_str(), path], read_row)
                .optional()?
                .map(StoredRow::into_definition)
                .transpose()
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        self.with_conn(move |conn| {
            let removed = conn.execute(
                "DELETE FROM mock_data WHERE id = ?1",
                params![id.to_string()],
            )?;
            Ok(removed > 0)
        })
        .await
    }

    async fn list_all(&self) -> StoreResult<Vec<MockDefinition>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {SELECT_COLUMNS} FROM mock_data ORDER BY seq");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], read_row)?;
            let mut mocks = Vec::new();
            for row in rows {
                mocks.push(row?.into_definition()?);
            }
            Ok(mocks)
        })
        .await
    }
}

fn insert_blocking(
    conn: &Connection,
    mock: NewMock,
    now: DateTime<Utc>,
) -> StoreResult<MockDefinition> {
    let id = mock.id.unwrap_or_else(Uuid::new_v4);
    let mock = mock.into_definition(id, now);

    let headers = mock.headers.as_ref().map(serde_json::to_string).transpose()?;
    let body = mock.body.as_ref().map(serde_json::to_string).transpose()?;
    let delay_millis = mock.delay_millis.map(|ms| ms as i64);

    let inserted = conn.execute(
        "INSERT INTO mock_data \
         (id, method, path, status_code, headers, body, delay_millis, created_at_us, updated_at_us) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            id.to_string(),
            mock.method.as_str(),
            mock.path,
            mock.status_code,
            headers,
            body,
            delay_millis,
            mock.created_at.timestamp_micros(),
            mock.updated_at.timestamp_micros(),
        ],
    );

    match inserted {
        Ok(_) => Ok(mock),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == ErrorCode::ConstraintViolation =>
        {
            Err(StoreError::DuplicateId(id))
        }
        Err(e) => Err(e.into()),
    }
}

/// Column values as stored, before conversion into domain types
struct StoredRow {
    id: String,
    method: String,
    path: String,
    status_code: i64,
    headers: Option<String>,
    body: Option<String>,
    delay_millis: Option<i64>,
    created_at_us: i64,
    updated_at_us: i64,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<StoredRow> {
    Ok(StoredRow {
        id: row.get(0)?,
        method: row.get(1)?,
        path: row.get(2)?,
        status_code: row.get(3)?,
        headers: row.get(4)?,
        body: row.get(5)?,
        delay_millis: row.get(6)?,
        created_at_us: row.get(7)?,
        updated_at_us: row.get(8)?,
    })
}

impl StoredRow {
    fn into_definition(self) -> StoreResult<MockDefinition> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| StoreError::Corrupt(format!("id {}: {e}", self.id)))?;
        let method = self
            .method
            .parse::<HttpMethod>()
            .map_err(|e| StoreError::Corrupt(format!("mock {id}: {e}")))?;
        let status_code = u16::try_from(self.status_code)
            .map_err(|_| StoreError::Corrupt(format!("mock {id}: status {}", self.status_code)))?;
        let delay_millis = self
            .delay_millis
            .map(u64::try_from)
            .transpose()
            .map_err(|_| StoreError::Corrupt(format!("mock {id}: negative delay")))?;

        Ok(MockDefinition {
            id,
            method,
            path: self.path,
            status_code,
            headers: self.headers.as_deref().map(serde_json::from_str).transpose()?,
            body: self.body.as_deref().map(serde_json::from_str).transpose()?,
            delay_millis,
            created_at: from_micros(id, self.created_at_us)?,
            updated_at: from_micros(id, self.updated_at_us)?,
        })
    }
}

fn from_micros(id: Uuid, micros: i64) -> StoreResult<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| StoreError::Corrupt(format!("mock {id}: timestamp {micros}")))
}
