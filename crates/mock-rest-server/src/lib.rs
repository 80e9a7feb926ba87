//! Mock REST server library.
//!
//! Register canned HTTP responses through the `/mocks` API and have them
//! served back by exact `(method, path)` or by correlation id.

pub mod admin_api;
pub mod config;
pub mod dispatch;
pub mod mock;
pub mod registry;
pub mod response;
pub mod server;
pub mod state;
pub mod store;

pub use config::Config;
pub use registry::MockRegistry;
pub use server::{serve, MockServer};
pub use state::AppState;
