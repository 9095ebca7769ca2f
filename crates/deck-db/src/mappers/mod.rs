//! Entity to model mappers
//!
//! Conversions between domain entities (deck-core) and database models.
//! Stored enum columns are parsed strictly: an unknown value is reported as a
//! database error rather than silently defaulted.

mod account;
mod content;

pub use account::{account_from_model, login_attempt_from_model};
