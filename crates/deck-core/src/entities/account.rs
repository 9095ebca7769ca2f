//! Account entity - identity, subscription, session and device-lock state

use chrono::{DateTime, Utc};

use super::{DeviceLock, LoginAttempt, PaymentRecord, SessionRecord};
use crate::value_objects::{AccountId, Role, SubscriptionStatus};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// A user account.
///
/// The password hash is deliberately not part of the entity; repositories
/// hand it out separately for credential checks only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub subscription_status: SubscriptionStatus,
    /// `None` means a non-expiring subscription
    pub subscription_expires_at: Option<DateTime<Utc>>,
    /// Sum of all captured payments, in minor currency units
    pub total_paid: i64,
    /// Oldest first
    pub payments: Vec<PaymentRecord>,
    pub session: Option<SessionRecord>,
    pub device_lock: Option<DeviceLock>,
    /// Oldest first, bounded by the store
    pub login_attempts: Vec<LoginAttempt>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new free-tier user account
    pub fn new(id: AccountId, username: String, email: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            email,
            role: Role::User,
            subscription_status: SubscriptionStatus::Free,
            subscription_expires_at: None,
            total_paid: 0,
            payments: Vec::new(),
            session: None,
            device_lock: None,
            login_attempts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the role
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Set the subscription tier and expiry
    #[must_use]
    pub fn with_subscription(
        mut self,
        status: SubscriptionStatus,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.subscription_status = status;
        self.subscription_expires_at = expires_at;
        self
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// True iff a session record exists and has not expired
    pub fn has_active_session(&self, now: DateTime<Utc>) -> bool {
        self.session.as_ref().is_some_and(|s| !s.is_expired(now))
    }

    /// True iff a device lock has been recorded
    pub fn has_device_lock(&self) -> bool {
        self.device_lock.is_some()
    }

    /// Whole days left on a dated subscription, rounded up.
    ///
    /// `None` when the subscription has no expiry. Zero once it has lapsed.
    pub fn subscription_days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        let expires_at = self.subscription_expires_at?;
        let seconds = (expires_at - now).num_seconds();
        if seconds <= 0 {
            return Some(0);
        }
        Some((seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY)
    }

    /// Check whether a payment id has already been applied to this account
    pub fn has_payment(&self, payment_id: &str) -> bool {
        self.payments.iter().any(|p| p.payment_id == payment_id)
    }
}
