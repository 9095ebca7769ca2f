//! Database models - SQLx-compatible structs for PostgreSQL tables

mod account;
mod content;

pub(crate) use account::ACCOUNT_COLUMNS;
pub use account::{AccountModel, LoginAttemptModel, PaymentModel};
pub use content::{ChapterModel, FlashcardModel, NoteModel, TopicModel};
