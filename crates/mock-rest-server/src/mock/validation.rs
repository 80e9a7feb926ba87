//! Validation of mock creation payloads.

use super::types::{HttpMethod, NewMock};
use hyper::header::{HeaderName, HeaderValue};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub const MIN_STATUS_CODE: i64 = 100;
pub const MAX_STATUS_CODE: i64 = 699;
pub const MAX_DELAY_MILLIS: i64 = 5000;

/// One or more non-empty segments, no trailing slash
static PATH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/[^/]+(/[^/]+)*$").expect("path pattern is valid"));

/// Raw create payload as sent by a mock author.
///
/// Every field is optional here so that validation can report all missing or
/// malformed fields at once. Legacy field names (`uri`, `status_code`,
/// `delay`) are accepted as aliases.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockInput {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default, alias = "uri")]
    pub path: Option<String>,
    #[serde(default, alias = "status_code")]
    pub status_code: Option<i64>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<serde_json::Value>,
    #[serde(default, alias = "delay")]
    pub delay_millis: Option<i64>,
}

/// A single offending field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All field errors found in a payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed: {}", join_field_errors(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }

    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl MockInput {
    /// Check every field and produce a storable mock
    pub fn validate(self) -> Result<NewMock, ValidationErrors> {
        let mut errors = Vec::new();

        let method = match self.method.as_deref() {
            None => {
                errors.push(FieldError::new("method", "field required"));
                None
            }
            Some(raw) => match raw.parse::<HttpMethod>() {
                Ok(m) => Some(m),
                Err(_) => {
                    let allowed: Vec<&str> = HttpMethod::ALL.iter().map(|m| m.as_str()).collect();
                    errors.push(FieldError::new(
                        "method",
                        format!("must be one of {}", allowed.join(", ")),
                    ));
                    None
                }
            },
        };

        let path = match self.path {
            None => {
                errors.push(FieldError::new("path", "field required"));
                None
            }
            Some(p) => match check_path(&p) {
                Ok(()) => Some(p),
                Err(message) => {
                    errors.push(FieldError::new("path", message));
                    None
                }
            },
        };

        let status_code = match self.status_code {
            None => {
                errors.push(FieldError::new("statusCode", "field required"));
                None
            }
            Some(code) if (MIN_STATUS_CODE..=MAX_STATUS_CODE).contains(&code) => Some(code as u16),
            Some(_) => {
                errors.push(FieldError::new(
                    "statusCode",
                    format!("must be between {MIN_STATUS_CODE} and {MAX_STATUS_CODE}"),
                ));
                None
            }
        };

        if let Some(headers) = &self.headers {
            for (name, value) in headers {
                if HeaderName::from_bytes(name.as_bytes()).is_err() {
                    errors.push(FieldError::new(
                        "headers",
                        format!("invalid header name '{name}'"),
                    ));
                } else if HeaderValue::from_str(value).is_err() {
                    errors.push(FieldError::new(
                        "headers",
                        format!("invalid value for header '{name}'"),
                    ));
                }
            }
        }

        let delay_millis = match self.delay_millis {
            None => None,
            Some(ms) if (0..=MAX_DELAY_MILLIS).contains(&ms) => Some(ms as u64),
            Some(_) => {
                errors.push(FieldError::new(
                    "delayMillis",
                    format!("must be between 0 and {MAX_DELAY_MILLIS}"),
                ));
                None
            }
        };

        match (method, path, status_code) {
            (Some(method), Some(path), Some(status_code)) if errors.is_empty() => Ok(NewMock {
                id: None,
                method,
                path,
                status_code,
                headers: self.headers,
                body: self.body.filter(|b| !b.is_null()),
                delay_millis,
            }),
            _ => Err(ValidationErrors { errors }),
        }
    }
}

fn check_path(path: &str) -> Result<(), &'static str> {
    if !path.starts_with('/') {
        return Err("must start with '/'");
    }
    if !PATH_PATTERN.is_match(path) {
        return Err("must be a path of non-empty segments, e.g. /api/v1/users");
    }
    Ok(())
}
