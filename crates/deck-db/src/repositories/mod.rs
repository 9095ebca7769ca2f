//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in deck-core.

mod account;
mod content;
mod error;

pub use account::PgAccountRepository;
pub use content::PgContentRepository;
