//! Route handlers
//!
//! Thin adapters from HTTP to the service layer, grouped by area.

pub mod admin;
pub mod auth;
pub mod content;
pub mod health;
pub mod payment;
