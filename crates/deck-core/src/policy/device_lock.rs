//! Device-lock policy

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entities::Account;
use crate::value_objects::DeviceFingerprint;

/// Result of comparing a request fingerprint with an account's device lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCheck {
    /// No lock recorded yet
    Unlocked,
    Match,
    Mismatch,
}

impl DeviceCheck {
    pub fn of(account: &Account, fingerprint: &DeviceFingerprint) -> Self {
        match &account.device_lock {
            None => Self::Unlocked,
            Some(lock) if lock.matches(fingerprint) => Self::Match,
            Some(_) => Self::Mismatch,
        }
    }

    #[inline]
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch)
    }
}

/// What to do when an entitled caller arrives from a device other than the
/// locked one. The lock itself is never overwritten under any policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceLockPolicy {
    /// Mismatches are not reported
    Ignore,
    /// Mismatches are logged and surfaced, access is still granted
    #[default]
    Flag,
    /// Mismatches deny premium access
    Deny,
}

impl DeviceLockPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Flag => "flag",
            Self::Deny => "deny",
        }
    }

    /// Whether premium access is allowed given a device check
    pub fn permits(&self, check: DeviceCheck) -> bool {
        !(matches!(self, Self::Deny) && check.is_mismatch())
    }

    /// Whether a mismatch should be reported
    pub fn reports(&self, check: DeviceCheck) -> bool {
        !matches!(self, Self::Ignore) && check.is_mismatch()
    }
}

impl fmt::Display for DeviceLockPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceLockPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "flag" => Ok(Self::Flag),
            "deny" => Ok(Self::Deny),
            other => Err(format!("unknown device lock policy: {other}")),
        }
    }
}
