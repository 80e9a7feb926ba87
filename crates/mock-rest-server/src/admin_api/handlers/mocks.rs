//! Mock CRUD handlers.

use crate::admin_api::types::MockQuery;
use crate::mock::{ApiError, MockInput, ValidationErrors};
use crate::response::{empty_response, json_response};
use crate::state::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

/// POST /mocks - Create a mock
pub async fn handle_create(body: Bytes, state: &AppState) -> Response<Full<Bytes>> {
    let input: MockInput = match serde_json::from_slice(&body) {
        Ok(input) => input,
        Err(e) => {
            return ApiError::from(ValidationErrors::single(
                "body",
                format!("Invalid mock JSON: {e}"),
            ))
            .into_response()
        }
    };

    match state.lifecycle.create(input).await {
        Ok(mock) => json_response(StatusCode::CREATED, &mock),
        Err(e) => e.into_response(),
    }
}

/// GET /mocks - List every mock, or fetch one with `?id=`
pub async fn handle_get(query: Option<&str>, state: &AppState) -> Response<Full<Bytes>> {
    let params = MockQuery::parse(query);
    if params.id.is_none() {
        return match state.lifecycle.get_all().await {
            Ok(mocks) => json_response(StatusCode::OK, &mocks),
            Err(e) => e.into_response(),
        };
    }

    let result = match params.require_id() {
        Ok(id) => state.lifecycle.get_by_id(id).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(mock) => json_response(StatusCode::OK, &mock),
        Err(e) => e.into_response(),
    }
}

/// DELETE /mocks?id= - Remove a mock
pub async fn handle_delete(query: Option<&str>, state: &AppState) -> Response<Full<Bytes>> {
    let id = match MockQuery::parse(query).require_id() {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match state.lifecycle.delete(id).await {
        Ok(true) => empty_response(StatusCode::OK),
        Ok(false) => ApiError::not_found(format!("Mock with id {id} not found")).into_response(),
        Err(e) => e.into_response(),
    }
}
