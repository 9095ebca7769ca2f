//! Account, payment and login-attempt database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Column list shared by every account query
pub(crate) const ACCOUNT_COLUMNS: &str = r"
    id, username, email, role, subscription_status, subscription_expires_at, total_paid,
    session_token, session_fingerprint, session_user_agent, session_ip,
    session_login_at, session_last_activity_at, session_expires_at,
    device_lock_fingerprint, device_locked_at, created_at, updated_at
";

/// Database model for the accounts table (without the password hash)
#[derive(Debug, Clone, FromRow)]
pub struct AccountModel {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub subscription_status: String,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub total_paid: i64,
    pub session_token: Option<String>,
    pub session_fingerprint: Option<String>,
    pub session_user_agent: Option<String>,
    pub session_ip: Option<String>,
    pub session_login_at: Option<DateTime<Utc>>,
    pub session_last_activity_at: Option<DateTime<Utc>>,
    pub session_expires_at: Option<DateTime<Utc>>,
    pub device_lock_fingerprint: Option<String>,
    pub device_locked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for the payments table
#[derive(Debug, Clone, FromRow)]
pub struct PaymentModel {
    pub id: i64,
    pub account_id: Uuid,
    pub order_id: String,
    pub payment_id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub paid_at: DateTime<Utc>,
}

/// Database model for the login_attempts table
#[derive(Debug, Clone, FromRow)]
pub struct LoginAttemptModel {
    pub id: i64,
    pub account_id: Uuid,
    pub outcome: String,
    pub ip_address: String,
    pub user_agent: String,
    pub device_fingerprint: String,
    pub attempted_at: DateTime<Utc>,
}
