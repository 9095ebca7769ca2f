//! Service context - dependency container for services
//!
//! Holds the repositories, the payment gateway, and the security primitives
//! resolved once from configuration at startup.

use std::sync::Arc;

use chrono::Duration;
use deck_common::{
    AppConfig, PasswordService, PaymentConfig, PaymentSignatureVerifier, SessionConfig,
    TokenService,
};
use deck_core::traits::{AccountRepository, ContentRepository, PaymentGateway};
use deck_core::DeviceLockPolicy;

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// It provides access to:
/// - Account and content repositories
/// - The payment gateway and signature verifier (absent when payments are not configured)
/// - Token issuing and password hashing
/// - Session and payment settings
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    account_repo: Arc<dyn AccountRepository>,
    content_repo: Arc<dyn ContentRepository>,

    // Payments
    payment_gateway: Option<Arc<dyn PaymentGateway>>,
    signature_verifier: Option<PaymentSignatureVerifier>,

    // Security
    token_service: Arc<TokenService>,
    password_service: PasswordService,

    // Settings
    session_config: SessionConfig,
    payment_config: PaymentConfig,
}

impl ServiceContext {
    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    /// Get the account repository
    pub fn account_repo(&self) -> &dyn AccountRepository {
        self.account_repo.as_ref()
    }

    /// Get the content repository
    pub fn content_repo(&self) -> &dyn ContentRepository {
        self.content_repo.as_ref()
    }

    // === Payments ===

    /// Payment gateway, if configured
    pub fn payment_gateway(&self) -> Option<&dyn PaymentGateway> {
        self.payment_gateway.as_deref()
    }

    /// Callback signature verifier, if a key secret is configured
    pub fn signature_verifier(&self) -> Option<&PaymentSignatureVerifier> {
        self.signature_verifier.as_ref()
    }

    pub fn payment_config(&self) -> &PaymentConfig {
        &self.payment_config
    }

    // === Security ===

    /// Get the token service
    pub fn token_service(&self) -> &TokenService {
        self.token_service.as_ref()
    }

    /// Get the password service
    pub fn password_service(&self) -> &PasswordService {
        &self.password_service
    }

    // === Settings ===

    pub fn session_config(&self) -> &SessionConfig {
        &self.session_config
    }

    /// Server-side session lifetime
    pub fn session_ttl(&self) -> Duration {
        Duration::seconds(self.session_config.ttl)
    }

    /// Idle timeout, when enforced
    pub fn session_idle_timeout(&self) -> Option<Duration> {
        self.session_config.idle_timeout.map(Duration::seconds)
    }

    pub fn device_lock_policy(&self) -> DeviceLockPolicy {
        self.session_config.device_lock_policy
    }

    /// Number of login attempts kept per account
    pub fn login_history_limit(&self) -> usize {
        self.session_config.login_history_limit
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("payments_enabled", &self.payment_gateway.is_some())
            .field("session_config", &self.session_config)
            .finish_non_exhaustive()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    account_repo: Option<Arc<dyn AccountRepository>>,
    content_repo: Option<Arc<dyn ContentRepository>>,
    payment_gateway: Option<Arc<dyn PaymentGateway>>,
    token_service: Option<Arc<TokenService>>,
    session_config: Option<SessionConfig>,
    payment_config: Option<PaymentConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take token, session and payment settings from the application config
    pub fn config(self, config: &AppConfig) -> Self {
        self.token_service(Arc::new(TokenService::from_config(&config.jwt)))
            .session_config(config.session.clone())
            .payment_config(config.payment.clone())
    }

    pub fn account_repo(mut self, repo: Arc<dyn AccountRepository>) -> Self {
        self.account_repo = Some(repo);
        self
    }

    pub fn content_repo(mut self, repo: Arc<dyn ContentRepository>) -> Self {
        self.content_repo = Some(repo);
        self
    }

    pub fn payment_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.payment_gateway = Some(gateway);
        self
    }

    pub fn token_service(mut self, service: Arc<TokenService>) -> Self {
        self.token_service = Some(service);
        self
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = Some(config);
        self
    }

    pub fn payment_config(mut self, config: PaymentConfig) -> Self {
        self.payment_config = Some(config);
        self
    }

    /// Build the ServiceContext
    ///
    /// The signature verifier is derived from the payment key secret. A
    /// gateway without a key secret is discarded, since orders it creates
    /// could never be verified.
    ///
    /// # Errors
    /// Fails when a required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let payment_config = self
            .payment_config
            .ok_or_else(|| ServiceError::validation("payment_config is required"))?;

        let signature_verifier = payment_config
            .credentials()
            .map(|(_, secret)| PaymentSignatureVerifier::new(secret));
        let payment_gateway = self.payment_gateway.filter(|_| signature_verifier.is_some());

        Ok(ServiceContext {
            account_repo: self
                .account_repo
                .ok_or_else(|| ServiceError::validation("account_repo is required"))?,
            content_repo: self
                .content_repo
                .ok_or_else(|| ServiceError::validation("content_repo is required"))?,
            payment_gateway,
            signature_verifier,
            token_service: self
                .token_service
                .ok_or_else(|| ServiceError::validation("token_service is required"))?,
            password_service: PasswordService::new(),
            session_config: self
                .session_config
                .ok_or_else(|| ServiceError::validation("session_config is required"))?,
            payment_config,
        })
    }
}
