//! Errors returned by the application services
//!
//! Every variant converts losslessly into [`AppError`], which owns the
//! HTTP status and public code for each kind of failure.

use deck_common::AppError;
use deck_core::DomainError;
use std::fmt;

#[derive(Debug)]
pub enum ServiceError {
    /// Business rule or store failure raised below the service layer
    Domain(DomainError),

    /// Authentication, entitlement and payment outcomes
    App(AppError),

    NotFound { resource: &'static str, key: String },

    /// Input that passed DTO validation but breaks a service rule
    Rejected(String),

    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => e.fmt(f),
            Self::App(e) => e.fmt(f),
            Self::NotFound { resource, key } => write!(f, "{resource} not found: {key}"),
            Self::Rejected(msg) => f.write_str(msg),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::App(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    pub fn not_found(resource: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            key: key.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Wrong username or password
    pub fn invalid_credentials() -> Self {
        Self::App(AppError::InvalidCredentials)
    }

    pub fn unauthenticated() -> Self {
        Self::App(AppError::Unauthenticated)
    }

    pub fn forbidden() -> Self {
        Self::App(AppError::Forbidden)
    }

    /// Payment gateway or key secret not configured
    pub fn payments_unavailable() -> Self {
        Self::App(AppError::PaymentsUnavailable)
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => AppError::domain_status(e),
            Self::App(e) => e.status_code(),
            Self::NotFound { .. } => 404,
            Self::Rejected(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(e) => AppError::domain_code(e),
            Self::App(e) => e.error_code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Rejected(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::NotFound { resource, key } => AppError::not_found(format!("{resource} {key}")),
            ServiceError::Rejected(msg) => AppError::Validation(msg),
            ServiceError::Internal(msg) => AppError::internal(anyhow::anyhow!(msg)),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
