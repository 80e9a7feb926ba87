//! Turning a stored mock into an HTTP response.

use crate::mock::{ApiError, MockDefinition};
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use tracing::debug;

/// Wait out the mock's delay, then render it.
///
/// The sleep lives inside the request future, so it is cancelled together
/// with the request if the client goes away.
pub async fn serve_mock(mock: &MockDefinition) -> Response<Full<Bytes>> {
    if let Some(delay) = mock.delay() {
        debug!(mock_id = %mock.id, delay_ms = delay.as_millis() as u64, "Delaying mock response");
        tokio::time::sleep(delay).await;
    }

    render_mock(mock).unwrap_or_else(ApiError::into_response)
}

/// Build the response described by a mock, verbatim.
///
/// A present body is sent as JSON; the mock's own headers are applied last
/// and win over the default content type.
pub fn render_mock(mock: &MockDefinition) -> Result<Response<Full<Bytes>>, ApiError> {
    let status = StatusCode::from_u16(mock.status_code).map_err(|_| {
        ApiError::Internal(format!("invalid status code {}", mock.status_code))
    })?;

    let payload = match &mock.body {
        Some(body) => Bytes::from(
            serde_json::to_vec(body).map_err(|e| ApiError::Internal(e.to_string()))?,
        ),
        None => Bytes::new(),
    };

    let mut response = Response::new(Full::new(payload));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    if mock.body.is_some() {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    if let Some(custom) = &mock.headers {
        for (name, value) in custom {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ApiError::Internal(format!("invalid header name '{name}'")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ApiError::Internal(format!("invalid value for header '{name}'")))?;
            headers.insert(name, value);
        }
    }

    Ok(response)
}
