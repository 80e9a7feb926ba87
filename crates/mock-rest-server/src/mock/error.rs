//! Errors surfaced by the dispatcher and the lifecycle API.

use super::validation::ValidationErrors;
use crate::response::{json_response, ErrorBody};
use crate::store::StoreError;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use thiserror::Error;
use tracing::{debug, error};

pub const MOCK_NOT_FOUND: &str = "Mock data not found for this endpoint";

/// Application-level failures and their HTTP translation.
///
/// Everything except `Persistence` and `Internal` is expected client-side
/// signaling and is not logged as a fault.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("{0}")]
    NotFound(String),
    #[error("Invalid UUID format: {0}")]
    MalformedCorrelationId(String),
    #[error("Method {0} not allowed for this endpoint")]
    MethodMismatch(String),
    #[error("Path {0} not allowed for this endpoint")]
    PathMismatch(String),
    #[error("An error occurred: {0}")]
    Persistence(#[from] StoreError),
    #[error("An error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(detail: impl Into<String>) -> Self {
        ApiError::NotFound(detail.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) | ApiError::PathMismatch(_) => StatusCode::NOT_FOUND,
            ApiError::MalformedCorrelationId(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodMismatch(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Persistence(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert into a `{"detail": ...}` response
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let status = self.status();
        match &self {
            ApiError::Persistence(e) => error!(error = %e, "Mock store failure"),
            ApiError::Internal(reason) => error!(reason = %reason, "Internal error while serving mock"),
            other => debug!(status = status.as_u16(), "{}", other),
        }

        let detail = self.to_string();
        let errors = match self {
            ApiError::Validation(v) => v.errors,
            _ => Vec::new(),
        };
        json_response(status, &ErrorBody { detail, errors })
    }
}
