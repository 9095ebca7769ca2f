//! Bearer token issuing and verification
//!
//! Provides token encoding, decoding, and validation using the `jsonwebtoken` crate.
//! Tokens are stateless snapshots: they carry identity, role and subscription
//! tier as of issuance and are never checked against the session record here.

use chrono::{DateTime, Duration, Utc};
use deck_core::{Role, SubscriptionStatus};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::error::AppError;

/// What the token was issued for. Decides its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Login or payment by an account entitled to premium
    Paid,
    /// Login by an account without premium entitlement
    Free,
    /// Issued by username alone; never grants premium or admin
    Trial,
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    pub role: Role,
    pub subscription_status: SubscriptionStatus,
    pub kind: TokenKind,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn username(&self) -> &str {
        &self.sub
    }

    #[must_use]
    pub fn is_trial(&self) -> bool {
        self.kind == TokenKind::Trial
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// A freshly signed token and its lifetime in seconds
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
    pub claims: Claims,
}

/// Token service for encoding and decoding bearer tokens
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    paid_token_ttl: i64,
    free_token_ttl: i64,
}

impl TokenService {
    /// Create a new token service with the given secret and TTLs (seconds)
    #[must_use]
    pub fn new(secret: &str, paid_token_ttl: i64, free_token_ttl: i64) -> Self {
        // Expiry is exact: no clock-skew grace after `exp`
        let mut validation = Validation::default();
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            paid_token_ttl,
            free_token_ttl,
        }
    }

    #[must_use]
    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(&config.secret, config.paid_token_ttl, config.free_token_ttl)
    }

    /// Lifetime for a token kind. Trial tokens share the free TTL.
    #[must_use]
    pub fn ttl_for(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Paid => self.paid_token_ttl,
            TokenKind::Free | TokenKind::Trial => self.free_token_ttl,
        }
    }

    /// Issue a token using the TTL configured for its kind
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue(
        &self,
        username: &str,
        role: Role,
        subscription_status: SubscriptionStatus,
        kind: TokenKind,
    ) -> Result<IssuedToken, AppError> {
        self.issue_with_ttl(username, role, subscription_status, kind, self.ttl_for(kind))
    }

    /// Issue a token with an explicit TTL in seconds
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue_with_ttl(
        &self,
        username: &str,
        role: Role,
        subscription_status: SubscriptionStatus,
        kind: TokenKind,
        ttl: i64,
    ) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            role,
            subscription_status,
            kind,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl)).timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to encode JWT")))?;

        Ok(IssuedToken {
            token,
            expires_in: ttl,
            claims,
        })
    }

    /// Verify signature and expiry.
    ///
    /// Every failure collapses to `None`; callers cannot tell a forged token
    /// from an expired one.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .ok()
            .map(|data| data.claims)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("paid_token_ttl", &self.paid_token_ttl)
            .field("free_token_ttl", &self.free_token_ttl)
            .finish_non_exhaustive()
    }
}
