//! # deck-api
//!
//! HTTP surface of the study deck backend, built with Axum. Credentials
//! travel as cookies; see [`cookies`].

pub mod cookies;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run};
pub use state::AppState;
