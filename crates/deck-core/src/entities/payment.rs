//! Payment records and orders

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DeviceLock;

/// Status recorded for payments that passed signature verification
pub const PAYMENT_STATUS_CAPTURED: &str = "captured";

/// Immutable record of a verified payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub order_id: String,
    pub payment_id: String,
    /// Minor currency units
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub paid_at: DateTime<Utc>,
}

/// Everything a verified payment changes on an account, applied atomically
#[derive(Debug, Clone)]
pub struct PaymentApplication {
    pub record: PaymentRecord,
    /// New expiry, computed from verification time (renewals do not stack)
    pub subscription_expires_at: DateTime<Utc>,
    /// Lock to record if the account has none yet
    pub device_lock: DeviceLock,
}

/// An order created at the payment gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
}
