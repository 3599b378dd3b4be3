//! # hq-api
//!
//! HTTP surface of BranchHQ: axum handlers for every route family, a
//! shared error-to-HTTP mapping, and the route table. Handlers validate
//! required fields, perform one repository or file-service call, and
//! return a JSON payload; failures all render as `{"message"}` bodies.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use extractors::{AppState, PgFileService};
pub use routes::router;
