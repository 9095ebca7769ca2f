//! Device lock - binds premium entitlement to the device that paid

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::DeviceFingerprint;

/// The single device authorized to exercise an account's premium entitlement.
///
/// Created once when a payment is verified and never overwritten afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceLock {
    pub fingerprint: DeviceFingerprint,
    pub locked_at: DateTime<Utc>,
}

impl DeviceLock {
    pub fn new(fingerprint: DeviceFingerprint, locked_at: DateTime<Utc>) -> Self {
        Self {
            fingerprint,
            locked_at,
        }
    }

    #[inline]
    pub fn matches(&self, fingerprint: &DeviceFingerprint) -> bool {
        &self.fingerprint == fingerprint
    }
}
