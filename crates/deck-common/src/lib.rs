//! # deck-common
//!
//! Shared utilities: configuration, error handling, telemetry, and the
//! security primitives (password hashing, bearer tokens, payment signatures,
//! device fingerprints).

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    derive_fingerprint, generate_session_token, hash_password, validate_password,
    verify_password, verify_payment_signature, Claims, IssuedToken, PasswordService,
    PaymentSignatureVerifier, TokenKind, TokenService,
};
pub use config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment, JwtConfig,
    PaymentConfig, RateLimitConfig, ServerConfig, SessionConfig,
};
pub use error::AppError;
pub use telemetry::{try_init_tracing, TracingConfig, TracingError};
