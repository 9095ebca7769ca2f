//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{AccountId, ChapterId, TopicId};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Topic not found: {0}")]
    TopicNotFound(TopicId),

    #[error("Chapter not found: {0}")]
    ChapterNotFound(ChapterId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Username or email already in use")]
    AccountAlreadyExists,

    #[error("Payment already applied: {0}")]
    PaymentAlreadyApplied(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Payment gateway error: {0}")]
    GatewayError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::AccountNotFound(_) => "UNKNOWN_ACCOUNT",
            Self::TopicNotFound(_) => "UNKNOWN_TOPIC",
            Self::ChapterNotFound(_) => "UNKNOWN_CHAPTER",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::InvalidUsername(_) => "INVALID_USERNAME",

            // Conflict
            Self::AccountAlreadyExists => "ACCOUNT_ALREADY_EXISTS",
            Self::PaymentAlreadyApplied(_) => "PAYMENT_ALREADY_APPLIED",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::GatewayError(_) => "GATEWAY_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound(_) | Self::TopicNotFound(_) | Self::ChapterNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::InvalidEmail | Self::InvalidUsername(_)
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::AccountAlreadyExists | Self::PaymentAlreadyApplied(_)
        )
    }

    /// Check if this came from infrastructure rather than a business rule
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_) | Self::GatewayError(_) | Self::InternalError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DomainError::AccountNotFound(AccountId::generate());
        assert_eq!(err.code(), "UNKNOWN_ACCOUNT");

        let err = DomainError::PaymentAlreadyApplied("pay_1".to_string());
        assert_eq!(err.code(), "PAYMENT_ALREADY_APPLIED");
    }

    #[test]
    fn test_classification() {
        assert!(DomainError::ChapterNotFound(ChapterId::generate()).is_not_found());
        assert!(!DomainError::AccountAlreadyExists.is_not_found());
        assert!(DomainError::AccountAlreadyExists.is_conflict());
        assert!(DomainError::InvalidEmail.is_validation());
        assert!(DomainError::DatabaseError("timeout".to_string()).is_infrastructure());
        assert!(!DomainError::InvalidEmail.is_infrastructure());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::PaymentAlreadyApplied("pay_9".to_string());
        assert_eq!(err.to_string(), "Payment already applied: pay_9");
    }
}
