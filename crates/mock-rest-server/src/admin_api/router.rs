//! Route dispatch logic for the admin API.

use crate::admin_api::handlers::{mocks, system};
use crate::admin_api::types::collect_body;
use crate::response::{error_response, method_not_allowed, not_found};
use crate::state::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use tracing::debug;

/// Main request router
pub async fn route_request(req: Request<Incoming>, state: &AppState) -> Response<Full<Bytes>> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(|s| s.to_string());

    debug!("Admin API: {} {}", method, path);

    match (&method, path.as_str()) {
        (&Method::GET, "/") => return system::handle_root(),
        (&Method::GET, "/health") => return system::handle_health(),
        _ => {}
    }

    if path == state.api.base_path {
        return match method {
            Method::GET => mocks::handle_get(query.as_deref(), state).await,
            Method::POST => match collect_body(req).await {
                Ok(body) => mocks::handle_create(body, state).await,
                Err(e) => error_response(StatusCode::BAD_REQUEST, &e),
            },
            Method::DELETE => mocks::handle_delete(query.as_deref(), state).await,
            _ => method_not_allowed(),
        };
    }

    not_found()
}
