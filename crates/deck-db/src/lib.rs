//! # deck-db
//!
//! Credential and content store: repository traits from `deck-core`
//! implemented over PostgreSQL (SQLx) and over in-memory `DashMap`s.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use deck_db::pool::{create_pool, PoolConfig};
//! use deck_db::PgAccountRepository;
//! use deck_core::AccountRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolConfig::default()).await?;
//!     let accounts = PgAccountRepository::new(pool);
//!     accounts.ping().await?;
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::{MemoryAccountRepository, MemoryContentRepository};
pub use pool::{apply_schema, create_pool, PgPool, PoolConfig};
pub use repositories::{PgAccountRepository, PgContentRepository};
