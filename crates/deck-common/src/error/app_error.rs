//! Application error types
//!
//! Unified error handling for the entire application. Server-side failures
//! carry their detail for logging but never expose it in a response body.

use deck_core::DomainError;
use std::fmt;

/// Message shown for every 5xx response
const GENERIC_SERVER_ERROR: &str = "Something went wrong. Please try again later.";

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    /// Same message whether the username or the password was wrong
    #[error("Wrong username or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Please log in to access premium content")]
    LoginRequired,

    // Authorization errors
    #[error("Premium subscription required")]
    UpgradeRequired,

    #[error("Access denied")]
    Forbidden,

    #[error("Premium access is locked to another device")]
    DeviceNotAuthorized,

    // Payment errors
    #[error("Payment verification failed")]
    SignatureInvalid,

    #[error("Payments are not available")]
    PaymentsUnavailable,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    // Infrastructure errors
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl AppError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::Validation(_) | Self::SignatureInvalid => 400,

            // 401 Unauthorized
            Self::InvalidCredentials | Self::Unauthenticated | Self::LoginRequired => 401,

            // 403 Forbidden
            Self::UpgradeRequired | Self::Forbidden | Self::DeviceNotAuthorized => 403,

            // 404 Not Found
            Self::NotFound(_) => 404,

            // 503 Service Unavailable
            Self::PaymentsUnavailable => 503,

            // 500 Internal Server Error
            Self::StoreUnavailable(_) | Self::Internal(_) => 500,

            Self::Domain(e) => Self::domain_status(e),
        }
    }

    /// Status for a domain error, shared with the service layer
    #[must_use]
    pub fn domain_status(err: &DomainError) -> u16 {
        if err.is_not_found() {
            404
        } else if err.is_validation() {
            400
        } else if err.is_conflict() {
            409
        } else if matches!(err, DomainError::GatewayError(_)) {
            502
        } else {
            500
        }
    }

    /// Public code for a domain error. Infrastructure failures collapse into
    /// one code so store internals never reach the caller.
    #[must_use]
    pub fn domain_code(err: &DomainError) -> &'static str {
        match err {
            DomainError::GatewayError(_) => "EXTERNAL_SERVICE_ERROR",
            e if e.is_infrastructure() => "STORE_UNAVAILABLE",
            e => e.code(),
        }
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::LoginRequired => "LOGIN_REQUIRED",
            Self::UpgradeRequired => "UPGRADE_REQUIRED",
            Self::Forbidden => "FORBIDDEN",
            Self::DeviceNotAuthorized => "DEVICE_NOT_AUTHORIZED",
            Self::SignatureInvalid => "SIGNATURE_INVALID",
            Self::PaymentsUnavailable => "PAYMENTS_UNAVAILABLE",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Domain(e) => Self::domain_code(e),
        }
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        let status = self.status_code();
        (500..600).contains(&status)
    }

    /// Message safe to return to the caller
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::PaymentsUnavailable => self.to_string(),
            _ if self.is_server_error() => GENERIC_SERVER_ERROR.to_string(),
            _ => self.to_string(),
        }
    }

    /// Create a not found error for a resource type
    #[must_use]
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::NotFound(resource.to_string())
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(msg: impl fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}
