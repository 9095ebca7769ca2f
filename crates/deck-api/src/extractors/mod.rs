//! Axum extractors for request handling
//!
//! Cookie-based authentication, client context, typed path ids and
//! validated bodies and queries.

mod auth;
mod client;
mod path;
mod validated;

pub use auth::{AdminUser, MaybeClaims, SessionCookie};
pub use client::ClientContext;
pub use path::IdPath;
pub use validated::{ValidatedJson, ValidatedQuery};
