//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use chrono::{DateTime, Utc};
use deck_core::{AccountId, Role, SubscriptionStatus};
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Auth Requests
// ============================================================================

/// Account signup request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 128, message = "Password must be 1-128 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request naming an account by username (trial session, order creation, token refresh)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UsernameRequest {
    #[validate(length(min = 1, max = 32, message = "Username must be 1-32 characters"))]
    pub username: String,
}

// ============================================================================
// Payment Requests
// ============================================================================

/// Payment callback forwarded by the client after checkout
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyPaymentRequest {
    #[validate(length(min = 1, max = 32))]
    pub username: String,

    #[serde(alias = "razorpay_order_id")]
    #[validate(length(min = 1, max = 128))]
    pub order_id: String,

    #[serde(alias = "razorpay_payment_id")]
    #[validate(length(min = 1, max = 128))]
    pub payment_id: String,

    #[serde(alias = "razorpay_signature")]
    #[validate(length(min = 1, max = 256))]
    pub signature: String,
}

// ============================================================================
// Admin Requests
// ============================================================================

/// Force logout of another account
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForceLogoutRequest {
    #[serde(alias = "userId")]
    pub user_id: AccountId,
}

/// Account created by an administrator, with any role or tier
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAccountRequest {
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 128, message = "Password must be 1-128 characters"))]
    pub password: String,

    #[serde(default)]
    pub role: Role,

    #[serde(default)]
    pub subscription_status: SubscriptionStatus,

    /// Absent means a non-expiring subscription
    pub subscription_expires_at: Option<DateTime<Utc>>,
}

/// Offset pagination for account listings
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct ListAccountsQuery {
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    #[serde(default = "default_limit")]
    pub limit: i64,

    #[validate(range(min = 0, message = "Offset must not be negative"))]
    #[serde(default)]
    pub offset: i64,
}

impl Default for ListAccountsQuery {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

fn default_limit() -> i64 {
    50
}
