//! # deck-core
//!
//! Domain layer containing accounts, sessions, device locks, content entities,
//! repository traits, and the entitlement policy.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod policy;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Account, Chapter, DeviceLock, Flashcard, LoginAttempt, LoginOutcome, Note, PaymentApplication,
    PaymentOrder, PaymentRecord, SessionRecord, Topic, PAYMENT_STATUS_CAPTURED,
};
pub use error::DomainError;
pub use policy::{
    evaluate_access, is_entitled, AccessDecision, Caller, DeviceCheck, DeviceLockPolicy,
};
pub use traits::{AccountRepository, ContentRepository, PaymentGateway, RepoResult};
pub use value_objects::{
    AccountId, ChapterId, ContentId, DeviceFingerprint, IdParseError, Role, SubscriptionStatus,
    TopicId,
};
