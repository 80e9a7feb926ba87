//! HTTP response helpers shared by the dispatcher and the admin API.

use crate::mock::FieldError;
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::CONTENT_TYPE;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Error body returned by every failing endpoint: `{"detail": "..."}`.
///
/// Validation failures additionally list the offending fields.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

/// Create a JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(json) => build_response_with_headers(
            status,
            [(CONTENT_TYPE.as_str(), "application/json")],
            json,
        ),
        Err(e) => build_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!(r#"{{"detail": "An error occurred: {e}"}}"#),
        ),
    }
}

/// Build an HTTP response with the given status and body.
///
/// Falls back to a bare 500 if the builder rejects its input.
pub fn build_response(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .body(Full::new(body.into()))
        .unwrap_or_else(|_| internal_error_fallback())
}

/// Build an HTTP response with headers.
pub fn build_response_with_headers(
    status: StatusCode,
    headers: impl IntoIterator<Item = (impl AsRef<str>, impl AsRef<str>)>,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(status);
    for (key, value) in headers {
        builder = builder.header(key.as_ref(), value.as_ref());
    }
    builder
        .body(Full::new(body.into()))
        .unwrap_or_else(|_| internal_error_fallback())
}

/// Response with a status and no body at all
pub fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    build_response(status, Bytes::new())
}

/// Create an error response with a `detail` message
pub fn error_response(status: StatusCode, detail: &str) -> Response<Full<Bytes>> {
    json_response(
        status,
        &ErrorBody {
            detail: detail.to_string(),
            errors: Vec::new(),
        },
    )
}

/// Create a not found response
pub fn not_found() -> Response<Full<Bytes>> {
    error_response(StatusCode::NOT_FOUND, "Not Found")
}

/// Create a method not allowed response
pub fn method_not_allowed() -> Response<Full<Bytes>> {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

fn internal_error_fallback() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from("Internal Server Error")));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
