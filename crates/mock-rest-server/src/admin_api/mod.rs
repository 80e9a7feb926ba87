//! Authoring REST API for mocks.
//!
//! Provides:
//! - Creating, listing, fetching and deleting mocks under a configurable
//!   base path (default `/mocks`)
//! - A service banner at `/` and a health endpoint
//!
//! Requests reach this router only after the dispatcher passed on them.

mod handlers;
mod router;
mod types;

pub use router::route_request;
pub use types::MockQuery;
