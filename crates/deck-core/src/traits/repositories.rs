//! Repository traits (ports) - define the interface for data access
//!
//! These traits follow the Repository pattern from Domain-Driven Design.
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.
//!
//! Every `AccountRepository` method is one atomic unit for the account it
//! touches. Implementations must not expose a half-applied write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    Account, Chapter, DeviceLock, Flashcard, LoginAttempt, Note, PaymentApplication,
    SessionRecord, Topic,
};
use crate::error::DomainError;
use crate::value_objects::{AccountId, ChapterId, TopicId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Account Repository
// ============================================================================

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Check the store is reachable
    async fn ping(&self) -> RepoResult<()>;

    /// Find account by ID
    async fn find_by_id(&self, id: AccountId) -> RepoResult<Option<Account>>;

    /// Find account by username (exact match)
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<Account>>;

    /// Check whether the username or the email is already taken
    async fn exists(&self, username: &str, email: &str) -> RepoResult<bool>;

    /// Create a new account. Fails with `AccountAlreadyExists` on a
    /// username or email collision.
    async fn create(&self, account: &Account, password_hash: &str) -> RepoResult<()>;

    /// Hard delete an account and everything it owns
    async fn delete(&self, id: AccountId) -> RepoResult<()>;

    /// List accounts, oldest first
    async fn list(&self, limit: i64, offset: i64) -> RepoResult<Vec<Account>>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: AccountId) -> RepoResult<Option<String>>;

    // ------------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------------

    /// Replace the account's session record
    async fn set_session(&self, id: AccountId, session: &SessionRecord) -> RepoResult<()>;

    /// Stamp last activity, only if `token` is still the current session token.
    /// Returns whether a session was touched.
    async fn touch_session(&self, id: AccountId, token: &str, at: DateTime<Utc>)
        -> RepoResult<bool>;

    /// Remove the session record. Returns whether one existed.
    async fn clear_session(&self, id: AccountId) -> RepoResult<bool>;

    /// Accounts whose session expires after `now`
    async fn list_active_sessions(&self, now: DateTime<Utc>) -> RepoResult<Vec<Account>>;

    // ------------------------------------------------------------------------
    // Device lock and payments
    // ------------------------------------------------------------------------

    /// Record the device lock if none exists. Returns whether it was created.
    async fn create_device_lock(&self, id: AccountId, lock: &DeviceLock) -> RepoResult<bool>;

    /// Remember which account a gateway order was created for
    async fn record_order(&self, id: AccountId, order_id: &str) -> RepoResult<()>;

    /// Account the order was created for, if the order is known
    async fn find_order_owner(&self, order_id: &str) -> RepoResult<Option<AccountId>>;

    /// Apply a verified payment: premium status, new expiry, total, history
    /// and device lock (if unset), all or nothing.
    ///
    /// A payment id that was already applied to any account is rejected with
    /// `PaymentAlreadyApplied` before anything is written.
    async fn apply_payment(
        &self,
        id: AccountId,
        application: &PaymentApplication,
    ) -> RepoResult<Account>;

    /// Append a login attempt and keep only the newest `keep` entries
    async fn record_login_attempt(
        &self,
        id: AccountId,
        attempt: &LoginAttempt,
        keep: usize,
    ) -> RepoResult<()>;
}

// ============================================================================
// Content Repository
// ============================================================================

/// Read-only access to study content. Listings are ordered by position.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn list_topics(&self) -> RepoResult<Vec<Topic>>;

    async fn find_topic(&self, id: TopicId) -> RepoResult<Option<Topic>>;

    async fn list_chapters(&self, topic_id: TopicId) -> RepoResult<Vec<Chapter>>;

    async fn find_chapter(&self, id: ChapterId) -> RepoResult<Option<Chapter>>;

    async fn list_flashcards(&self, chapter_id: ChapterId) -> RepoResult<Vec<Flashcard>>;

    async fn list_notes(&self, chapter_id: ChapterId) -> RepoResult<Vec<Note>>;
}
