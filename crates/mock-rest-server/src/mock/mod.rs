//! Mock definitions and their authoring lifecycle.

mod error;
mod lifecycle;
mod types;
mod validation;

pub use error::{ApiError, MOCK_NOT_FOUND};
pub use lifecycle::{MockLifecycle, NO_MOCKS_FOUND};
pub use types::{HttpMethod, MockDefinition, NewMock, RouteKey};
pub use validation::{
    FieldError, MockInput, ValidationErrors, MAX_DELAY_MILLIS, MAX_STATUS_CODE, MIN_STATUS_CODE,
};
