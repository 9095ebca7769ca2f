//! Entitlement evaluator

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entities::Account;
use crate::value_objects::{Role, SubscriptionStatus};

/// Who is asking, after token verification and account lookup
#[derive(Debug, Clone, Copy)]
pub enum Caller<'a> {
    /// No token, or a token that failed verification
    Anonymous,
    /// Trial token: authenticated, never premium
    Trial(&'a Account),
    /// Regular login token, resolved against live account state
    Account(&'a Account),
}

impl<'a> Caller<'a> {
    pub fn account(&self) -> Option<&'a Account> {
        match self {
            Self::Anonymous => None,
            Self::Trial(account) | Self::Account(account) => Some(account),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

/// Outcome of an access check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    Granted,
    /// Premium resource and no authenticated caller
    LoginRequired,
    /// Authenticated caller without premium entitlement
    UpgradeRequired,
    /// Entitled caller on a device other than the locked one
    DeviceNotAuthorized,
}

impl AccessDecision {
    #[inline]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Decide whether `account` may access a resource.
///
/// Non-premium resources are always allowed. For premium resources, admins are
/// entitled unconditionally; otherwise the subscription must be premium and
/// either non-expiring or expiring strictly after `now`.
pub fn is_entitled(account: &Account, resource_is_premium: bool, now: DateTime<Utc>) -> bool {
    if !resource_is_premium {
        return true;
    }

    match account.role {
        Role::Admin => true,
        Role::User => match account.subscription_status {
            SubscriptionStatus::Premium => account
                .subscription_expires_at
                .is_none_or(|expires_at| expires_at > now),
            SubscriptionStatus::Free => false,
        },
    }
}

/// Decide access for a caller, distinguishing "login required" from
/// "upgrade required".
///
/// Device-lock policy is applied separately by the caller, since it needs the
/// request fingerprint.
pub fn evaluate_access(
    caller: Caller<'_>,
    resource_is_premium: bool,
    now: DateTime<Utc>,
) -> AccessDecision {
    if !resource_is_premium {
        return AccessDecision::Granted;
    }

    match caller {
        Caller::Anonymous => AccessDecision::LoginRequired,
        Caller::Trial(_) => AccessDecision::UpgradeRequired,
        Caller::Account(account) => {
            if is_entitled(account, true, now) {
                AccessDecision::Granted
            } else {
                AccessDecision::UpgradeRequired
            }
        }
    }
}
