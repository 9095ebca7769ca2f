//! Server-side session record

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::DeviceFingerprint;

/// One active login. An account holds at most one; a newer record replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Opaque, unguessable token mirrored in the `sessionToken` cookie
    pub token: String,
    pub device_fingerprint: DeviceFingerprint,
    pub user_agent: String,
    pub ip_address: String,
    pub login_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Create a session starting at `now` and lasting `ttl`
    pub fn new(
        token: String,
        device_fingerprint: DeviceFingerprint,
        user_agent: String,
        ip_address: String,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            token,
            device_fingerprint,
            user_agent,
            ip_address,
            login_at: now,
            last_activity_at: now,
            expires_at: now + ttl,
        }
    }

    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Idle longer than `idle_timeout` since the last recorded activity
    pub fn is_idle(&self, now: DateTime<Utc>, idle_timeout: Duration) -> bool {
        now - self.last_activity_at > idle_timeout
    }
}
