//! Authentication service
//!
//! Handles signup, login, trial tokens and logout.

use chrono::{DateTime, Utc};
use deck_common::{validate_password, Claims, TokenKind};
use deck_core::entities::{Account, LoginAttempt, LoginOutcome};
use deck_core::{is_entitled, AccountId, DomainError, Role, SubscriptionStatus};
use tracing::{debug, info, instrument, warn};

use crate::dto::{AccountResponse, IssuedCredentials, LoginRequest, SignupRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::session::{ClientInfo, SessionManager};

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a free account
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn signup(&self, request: SignupRequest) -> ServiceResult<AccountResponse> {
        let account = Account::new(AccountId::generate(), request.username, request.email);
        let account = self.register(account, &request.password).await?;

        info!(account_id = %account.id, "Account registered");
        Ok(AccountResponse::from(&account))
    }

    /// Validate, hash and persist a new account
    pub(crate) async fn register(&self, mut account: Account, password: &str) -> ServiceResult<Account> {
        validate_username(&account.username)?;
        validate_password(password)?;
        account.email = account.email.trim().to_lowercase();

        if self
            .ctx
            .account_repo()
            .exists(&account.username, &account.email)
            .await?
        {
            return Err(DomainError::AccountAlreadyExists.into());
        }

        let password_hash = self.ctx.password_service().hash(password)?;
        self.ctx.account_repo().create(&account, &password_hash).await?;
        Ok(account)
    }

    /// Login with username and password.
    ///
    /// Unknown usernames and wrong passwords fail identically.
    #[instrument(skip(self, request, client), fields(username = %request.username))]
    pub async fn login(
        &self,
        request: LoginRequest,
        client: &ClientInfo,
    ) -> ServiceResult<IssuedCredentials> {
        let Some(account) = self
            .ctx
            .account_repo()
            .find_by_username(&request.username)
            .await?
        else {
            self.ctx.password_service().verify_absent(&request.password);
            warn!(ip = %client.ip_address, "Login failed: unknown username");
            return Err(ServiceError::invalid_credentials());
        };

        let password_hash = self.ctx.account_repo().get_password_hash(account.id).await?;
        let valid = password_hash
            .is_some_and(|hash| self.ctx.password_service().verify(&request.password, &hash));

        let now = Utc::now();
        if !valid {
            self.record_attempt(&account, client, LoginOutcome::Failure, now)
                .await?;
            warn!(account_id = %account.id, ip = %client.ip_address, "Login failed: wrong password");
            return Err(ServiceError::invalid_credentials());
        }

        self.record_attempt(&account, client, LoginOutcome::Success, now)
            .await?;

        let session = SessionManager::new(self.ctx)
            .create_session(&account, client)
            .await?;

        let (status, kind) = token_snapshot(&account, now);
        let token = self
            .ctx
            .token_service()
            .issue(&account.username, account.role, status, kind)?;

        info!(account_id = %account.id, kind = ?kind, "Logged in");

        Ok(IssuedCredentials {
            token,
            session: Some(session),
            account: AccountResponse::from(&account),
        })
    }

    /// Issue a trial token for an existing account, by username alone.
    ///
    /// Trial tokens carry no session and never grant premium or admin access.
    #[instrument(skip(self))]
    pub async fn create_free_session(&self, username: &str) -> ServiceResult<IssuedCredentials> {
        let account = self
            .ctx
            .account_repo()
            .find_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::not_found("Account", username))?;

        if account.is_admin() {
            warn!(account_id = %account.id, "Trial token refused for admin account");
            return Err(ServiceError::forbidden());
        }

        let token = self.ctx.token_service().issue(
            &account.username,
            Role::User,
            SubscriptionStatus::Free,
            TokenKind::Trial,
        )?;

        debug!(account_id = %account.id, "Trial token issued");

        Ok(IssuedCredentials {
            token,
            session: None,
            account: AccountResponse::from(&account),
        })
    }

    /// Clear the server session if the presented session token is the live one.
    ///
    /// Always succeeds; the caller clears cookies regardless.
    #[instrument(skip(self, claims, session_token))]
    pub async fn logout(
        &self,
        claims: Option<&Claims>,
        session_token: Option<&str>,
    ) -> ServiceResult<()> {
        let (Some(claims), Some(token)) = (claims, session_token) else {
            return Ok(());
        };

        let Some(account) = self
            .ctx
            .account_repo()
            .find_by_username(claims.username())
            .await?
        else {
            return Ok(());
        };

        let sessions = SessionManager::new(self.ctx);
        if sessions.matches(&account, token, Utc::now()) {
            sessions.clear_session(account.id).await?;
            info!(account_id = %account.id, "Logged out");
        }
        Ok(())
    }

    async fn record_attempt(
        &self,
        account: &Account,
        client: &ClientInfo,
        outcome: LoginOutcome,
        at: DateTime<Utc>,
    ) -> ServiceResult<()> {
        let attempt = LoginAttempt {
            outcome,
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
            device_fingerprint: client.fingerprint.clone(),
            attempted_at: at,
        };
        self.ctx
            .account_repo()
            .record_login_attempt(account.id, &attempt, self.ctx.login_history_limit())
            .await?;
        Ok(())
    }
}

/// Subscription tier and token kind to embed for an account at `now`.
///
/// A lapsed premium subscription is reported as free.
pub(crate) fn token_snapshot(
    account: &Account,
    now: DateTime<Utc>,
) -> (SubscriptionStatus, TokenKind) {
    if is_entitled(account, true, now) {
        (account.subscription_status, TokenKind::Paid)
    } else {
        (SubscriptionStatus::Free, TokenKind::Free)
    }
}

/// Usernames are ASCII letters, digits, `_` and `-`
fn validate_username(username: &str) -> Result<(), DomainError> {
    let len = username.chars().count();
    if !(3..=32).contains(&len) {
        return Err(DomainError::InvalidUsername(
            "must be 3-32 characters".to_string(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(DomainError::InvalidUsername(
            "only letters, digits, '_' and '-' are allowed".to_string(),
        ));
    }
    Ok(())
}
