//! In-memory store
//!
//! `DashMap`-backed implementations of the repository traits with the same
//! atomicity guarantees as the PostgreSQL ones: each operation on an account
//! runs under that account's shard lock. Used by tests and local development.

mod account;
mod content;

pub use account::MemoryAccountRepository;
pub use content::MemoryContentRepository;
