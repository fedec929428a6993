//! JSON surfaces: a public content router and an admin router for cache control.
//!
//! Both are served on separate listeners; see `main.rs`.

mod admin;
mod error;
mod middleware;
mod public;
mod state;

pub use admin::build_admin_router;
pub use error::{ApiError, ApiErrorBody, ApiErrorMessage, codes};
pub use middleware::{CONTENT_ORIGIN_HEADER, ContentOrigin, route_namespace};
pub use public::build_router;
pub use state::{AdminState, HttpState};
