//! Value objects - immutable types that represent domain concepts

mod fingerprint;
mod ids;
mod role;

pub use fingerprint::DeviceFingerprint;
pub use ids::{AccountId, ChapterId, ContentId, IdParseError, TopicId};
pub use role::{Role, SubscriptionStatus};
