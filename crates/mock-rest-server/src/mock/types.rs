//! Type definitions for mock definitions.
//!
//! This module contains the structs and enums shared by the store, the
//! registry and the dispatcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

// ============================================================================
// HTTP Method
// ============================================================================

/// HTTP methods a mock can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsing is exact: `get` is not `GET`.
impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .iter()
            .find(|m| m.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unsupported HTTP method: {s}"))
    }
}

// ============================================================================
// Route Key
// ============================================================================

/// Exact `(method, path)` pair identifying a dynamic route
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RouteKey {
    pub method: HttpMethod,
    pub path: String,
}

impl RouteKey {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

// ============================================================================
// Mock Definitions
// ============================================================================

/// A stored mock: the canned response served for a `(method, path)`.
///
/// Immutable once created; `id`, `created_at` and `updated_at` are assigned
/// by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockDefinition {
    pub id: Uuid,
    pub method: HttpMethod,
    pub path: String,
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_millis: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MockDefinition {
    pub fn route(&self) -> RouteKey {
        RouteKey::new(self.method, self.path.clone())
    }

    /// Artificial delay before responding, if any
    pub fn delay(&self) -> Option<Duration> {
        self.delay_millis
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

/// A validated mock that has not been stored yet.
///
/// `id` is normally `None`; the store generates one on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMock {
    pub id: Option<Uuid>,
    pub method: HttpMethod,
    pub path: String,
    pub status_code: u16,
    pub headers: Option<HashMap<String, String>>,
    pub body: Option<serde_json::Value>,
    pub delay_millis: Option<u64>,
}

impl NewMock {
    pub fn new(method: HttpMethod, path: impl Into<String>, status_code: u16) -> Self {
        Self {
            id: None,
            method,
            path: path.into(),
            status_code,
            headers: None,
            body: None,
            delay_millis: None,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_delay(mut self, delay_millis: u64) -> Self {
        self.delay_millis = Some(delay_millis);
        self
    }

    /// Stamp the store-assigned fields
    pub fn into_definition(self, id: Uuid, now: DateTime<Utc>) -> MockDefinition {
        MockDefinition {
            id,
            method: self.method,
            path: self.path,
            status_code: self.status_code,
            headers: self.headers,
            body: self.body,
            delay_millis: self.delay_millis,
            created_at: now,
            updated_at: now,
        }
    }
}
