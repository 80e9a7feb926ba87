//! System handlers: banner and health.

use crate::response::json_response;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

/// GET / - Service banner
pub fn handle_root() -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &serde_json::json!({"message": "Hello World"}))
}

/// GET /health - Health check
pub fn handle_health() -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &serde_json::json!({"status": "ok"}))
}
