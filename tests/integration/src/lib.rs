//! Integration test utilities for the study deck API
//!
//! Boots the real router over in-memory stores and a fake payment gateway,
//! and drives it over HTTP with explicit cookie handling.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
