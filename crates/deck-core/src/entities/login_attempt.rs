//! Login attempt history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::DeviceFingerprint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginOutcome {
    Success,
    Failure,
}

impl LoginOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "failure" => Some(Self::Failure),
            _ => None,
        }
    }
}

/// A single login attempt against an existing account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAttempt {
    pub outcome: LoginOutcome,
    pub ip_address: String,
    pub user_agent: String,
    pub device_fingerprint: DeviceFingerprint,
    pub attempted_at: DateTime<Utc>,
}
