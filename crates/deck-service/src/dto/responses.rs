//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output. Secrets (bearer
//! and session tokens) never appear in a response body; they travel as
//! cookies, see [`IssuedCredentials`].

use chrono::{DateTime, Utc};
use deck_common::{IssuedToken, TokenKind};
use deck_core::{
    AccessDecision, AccountId, ChapterId, ContentId, DeviceCheck, LoginOutcome, Role,
    SubscriptionStatus, TopicId,
};
use serde::Serialize;

// ============================================================================
// Common Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Offset-paginated list
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, limit: i64, offset: i64) -> Self {
        let has_more = i64::try_from(data.len()).is_ok_and(|len| len == limit);
        Self {
            data,
            pagination: PaginationMeta {
                limit,
                offset,
                has_more,
            },
        }
    }
}

/// Pagination metadata
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub limit: i64,
    pub offset: i64,
    /// A full page was returned; another request may yield more
    pub has_more: bool,
}

// ============================================================================
// Account / Auth Responses
// ============================================================================

/// Account as shown to its owner and to administrators
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub id: AccountId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub subscription_status: SubscriptionStatus,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub total_paid: i64,
    pub device_locked: bool,
    pub created_at: DateTime<Utc>,
}

/// Body returned alongside freshly issued cookies
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub account: AccountResponse,
    pub token_kind: TokenKind,
    /// Bearer token lifetime in seconds
    pub expires_in: i64,
}

/// Server session token and its lifetime in seconds
#[derive(Debug, Clone)]
pub struct SessionTicket {
    pub token: String,
    pub max_age: i64,
}

/// Credentials produced by login, trial, payment and refresh flows.
///
/// Not serialized; the HTTP layer turns the tokens into cookies and sends
/// [`IssuedCredentials::response`] as the body.
#[derive(Debug, Clone)]
pub struct IssuedCredentials {
    pub token: IssuedToken,
    /// Absent for trial tokens, which have no server session
    pub session: Option<SessionTicket>,
    pub account: AccountResponse,
}

impl IssuedCredentials {
    pub fn response(&self) -> AuthResponse {
        AuthResponse {
            account: self.account.clone(),
            token_kind: self.token.claims.kind,
            expires_in: self.token.expires_in,
        }
    }
}

/// Caller snapshot for `GET /me`
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_kind: Option<TokenKind>,
    /// Live role, re-read from the store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Live entitlement to premium content
    pub premium: bool,
    pub days_remaining: Option<i64>,
    /// Strong check: the `sessionToken` cookie matches the live session
    pub session_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceCheck>,
    pub device_mismatch: bool,
}

impl MeResponse {
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            username: None,
            token_kind: None,
            role: None,
            premium: false,
            days_remaining: None,
            session_valid: false,
            device: None,
            device_mismatch: false,
        }
    }
}

// ============================================================================
// Payment Responses
// ============================================================================

/// Gateway order created for checkout
#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    /// Public key id the checkout widget needs
    pub key_id: String,
}

/// Entitlement snapshot for `GET /payment/check-premium/:username`
#[derive(Debug, Clone, Serialize)]
pub struct PremiumStatusResponse {
    pub username: String,
    pub is_premium: bool,
    pub subscription_status: SubscriptionStatus,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    /// Whole days left, rounded up; `None` when the subscription never expires
    pub days_remaining: Option<i64>,
    pub device_locked: bool,
}

// ============================================================================
// Admin Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SessionInfoResponse {
    pub login_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub ip_address: String,
    pub user_agent: String,
    pub device_fingerprint: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceLockResponse {
    pub fingerprint: String,
    pub locked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginAttemptResponse {
    pub outcome: LoginOutcome,
    pub ip_address: String,
    pub user_agent: String,
    pub device_fingerprint: String,
    pub attempted_at: DateTime<Utc>,
}

/// Session introspection for one account
#[derive(Debug, Clone, Serialize)]
pub struct UserSessionResponse {
    pub account: AccountResponse,
    pub session: Option<SessionInfoResponse>,
    pub device_lock: Option<DeviceLockResponse>,
    /// Oldest first
    pub login_attempts: Vec<LoginAttemptResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActiveSessionResponse {
    pub account_id: AccountId,
    pub username: String,
    pub session: SessionInfoResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForceLogoutResponse {
    pub account_id: AccountId,
    /// Whether a session existed to clear
    pub session_cleared: bool,
}

// ============================================================================
// Content Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TopicResponse {
    pub id: TopicId,
    pub title: String,
    pub description: Option<String>,
    pub is_premium: bool,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChapterSummaryResponse {
    pub id: ChapterId,
    pub title: String,
    pub is_premium: bool,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicDetailResponse {
    pub topic: TopicResponse,
    pub chapters: Vec<ChapterSummaryResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlashcardResponse {
    pub id: ContentId,
    pub question: String,
    pub answer: String,
    pub is_premium: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoteResponse {
    pub id: ContentId,
    pub title: String,
    pub body: String,
    pub is_premium: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChapterDetailResponse {
    pub topic_id: TopicId,
    pub chapter: ChapterSummaryResponse,
    pub flashcards: Vec<FlashcardResponse>,
    pub notes: Vec<NoteResponse>,
    /// Premium items withheld from a caller without entitlement
    pub locked_items: usize,
    pub access: AccessDecision,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub store: String,
}

impl ReadinessResponse {
    pub fn ready(store_healthy: bool) -> Self {
        Self {
            status: if store_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                store: if store_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
