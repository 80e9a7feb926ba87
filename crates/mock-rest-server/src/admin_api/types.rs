//! Request parsing helpers for the admin API.

use crate::mock::{ApiError, ValidationErrors};
use bytes::Bytes;
use hyper::body::Incoming;
use hyper::Request;
use uuid::Uuid;

/// Query parameters accepted by the single-mock endpoints
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MockQuery {
    /// Raw `id` (or `uuid`) value, percent-decoded
    pub id: Option<String>,
}

impl MockQuery {
    /// Parse query parameters from query string
    pub fn parse(query: Option<&str>) -> Self {
        let mut params = Self::default();
        let Some(q) = query else {
            return params;
        };

        for param in q.split('&') {
            let (key, value) = param.split_once('=').unwrap_or((param, ""));
            if matches!(key, "id" | "uuid") && params.id.is_none() {
                let decoded = urlencoding::decode(value)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| value.to_string());
                params.id = Some(decoded);
            }
        }
        params
    }

    /// The requested mock id; missing or malformed ids are validation errors
    pub fn require_id(&self) -> Result<Uuid, ApiError> {
        let raw = self
            .id
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ValidationErrors::single("id", "field required"))?;

        Uuid::parse_str(raw).map_err(|_| {
            ValidationErrors::single("id", format!("invalid UUID '{raw}'")).into()
        })
    }
}

pub async fn collect_body(req: Request<Incoming>) -> Result<Bytes, String> {
    use http_body_util::BodyExt;
    req.collect()
        .await
        .map(|c| c.to_bytes())
        .map_err(|e| format!("Failed to read request body: {e}"))
}
