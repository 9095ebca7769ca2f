//! Device fingerprint value object

use serde::{Deserialize, Serialize};
use std::fmt;

/// Heuristic identifier of a client device, derived from request headers.
///
/// Low entropy: distinct devices sharing browser, locale and encoding collide.
/// Used for fraud deterrence only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceFingerprint(String);

impl DeviceFingerprint {
    /// Wrap an already derived fingerprint
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DeviceFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DeviceFingerprint {
    fn from(value: String) -> Self {
        Self(value)
    }
}
