//! Axum extractors for request handling
//!
//! Custom extractors for authentication, path parsing, query options and validation.

mod auth;
mod path;
mod target_query;
mod validated;

pub use auth::{AuthUser, OptionalAuthUser, ServiceCaller};
pub use path::{EntityPath, NotificationIdPath, PathParams, TargetPath};
pub use target_query::TargetQuery;
pub use validated::ValidatedJson;
