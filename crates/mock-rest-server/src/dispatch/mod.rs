//! Request-time mock selection.
//!
//! Every inbound request passes through [`dispatch`] before the admin
//! router. A request carrying a correlation id is answered from the mock
//! with that id, or rejected. A request without one is answered from the
//! newest mock for its exact `(method, path)`; if none exists it passes
//! through, unless the route was installed earlier, in which case it is a
//! 404.

mod response;

pub use response::{render_mock, serve_mock};

use crate::mock::{ApiError, HttpMethod, MockDefinition, MOCK_NOT_FOUND};
use crate::state::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Request, Response};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Outcome of dispatching one request
pub enum Dispatch {
    /// The dispatcher answered, with a mock or an error
    Served(Response<Full<Bytes>>),
    /// No mock applies; hand the request to the next router
    PassThrough,
}

/// The parts of a request that mock selection looks at
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    /// Method as sent, for error messages
    pub method_name: String,
    /// `None` when the method is outside the supported set
    pub method: Option<HttpMethod>,
    /// Percent-decoded request path
    pub path: String,
    /// Correlation header value, `None` when absent or empty
    pub correlation_id: Option<String>,
}

impl DispatchRequest {
    pub fn from_request<B>(req: &Request<B>, correlation_header: &str) -> Self {
        let method_name = req.method().as_str().to_string();
        let correlation_id = req
            .headers()
            .get(correlation_header)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).trim().to_string())
            .filter(|v| !v.is_empty());

        Self {
            method: method_name.parse().ok(),
            method_name,
            path: decode_path(req.uri().path()),
            correlation_id,
        }
    }
}

/// Mocks are registered with decoded paths; raw form is kept if it is not UTF-8
fn decode_path(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Answer a request from the registered mocks, or let it pass
pub async fn dispatch(req: &DispatchRequest, state: &AppState) -> Dispatch {
    match resolve(req, state).await {
        Ok(Some(mock)) => {
            debug!(
                mock_id = %mock.id,
                method = %req.method_name,
                path = %req.path,
                "Serving mock"
            );
            Dispatch::Served(serve_mock(&mock).await)
        }
        Ok(None) => Dispatch::PassThrough,
        Err(e) => Dispatch::Served(e.into_response()),
    }
}

/// Pick the mock for a request.
///
/// `Ok(None)` means no mock applies and the request should pass through.
pub async fn resolve(
    req: &DispatchRequest,
    state: &AppState,
) -> Result<Option<Arc<MockDefinition>>, ApiError> {
    if let Some(raw) = &req.correlation_id {
        let id = parse_correlation_id(raw)?;
        let mock = state
            .registry
            .find(id)
            .ok_or_else(|| ApiError::not_found(MOCK_NOT_FOUND))?;

        if req.method != Some(mock.method) {
            return Err(ApiError::MethodMismatch(req.method_name.clone()));
        }
        if mock.path != req.path {
            return Err(ApiError::PathMismatch(req.path.clone()));
        }
        return Ok(Some(mock));
    }

    let Some(method) = req.method else {
        return Ok(None);
    };

    match state.store.latest_by_route(method, &req.path).await? {
        Some(mock) => Ok(Some(Arc::new(mock))),
        None if state.registry.has_route(method, &req.path) => {
            Err(ApiError::not_found(MOCK_NOT_FOUND))
        }
        None => Ok(None),
    }
}

pub fn parse_correlation_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::MalformedCorrelationId(raw.to_string()))
}
