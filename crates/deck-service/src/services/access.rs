//! Access service
//!
//! Turns verified token claims into a caller backed by live account state,
//! then routes every premium check through the entitlement evaluator and the
//! device-lock policy.

use chrono::Utc;
use deck_common::{AppError, Claims, TokenKind};
use deck_core::entities::Account;
use deck_core::{evaluate_access, is_entitled, AccessDecision, Caller, DeviceCheck, DeviceFingerprint};
use tracing::{debug, instrument};

use crate::dto::MeResponse;

use super::context::ServiceContext;
use super::device_lock::DeviceLockManager;
use super::error::{ServiceError, ServiceResult};
use super::session::SessionManager;

/// Caller resolved against the store. Token claims are only a stale
/// snapshot; role and subscription are always taken from `account`.
#[derive(Debug, Clone, Default)]
pub struct ResolvedCaller {
    account: Option<Account>,
    kind: Option<TokenKind>,
}

impl ResolvedCaller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    pub fn token_kind(&self) -> Option<TokenKind> {
        self.kind
    }

    pub fn caller(&self) -> Caller<'_> {
        match (&self.account, self.kind) {
            (None, _) => Caller::Anonymous,
            (Some(account), Some(TokenKind::Trial)) => Caller::Trial(account),
            (Some(account), _) => Caller::Account(account),
        }
    }
}

/// Access service
pub struct AccessService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AccessService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Re-read the account named by `claims`.
    ///
    /// No claims, or claims for an account that no longer exists, resolve to
    /// an anonymous caller.
    #[instrument(skip(self, claims))]
    pub async fn resolve(&self, claims: Option<&Claims>) -> ServiceResult<ResolvedCaller> {
        let Some(claims) = claims else {
            return Ok(ResolvedCaller::anonymous());
        };

        let account = self
            .ctx
            .account_repo()
            .find_by_username(claims.username())
            .await?;

        if account.is_none() {
            debug!(username = %claims.username(), "Token names an unknown account");
            return Ok(ResolvedCaller::anonymous());
        }

        Ok(ResolvedCaller {
            account,
            kind: Some(claims.kind),
        })
    }

    /// Decide access to a resource for a resolved caller on a device.
    ///
    /// Admins are exempt from the device-lock policy.
    pub fn authorize(
        &self,
        caller: &ResolvedCaller,
        resource_is_premium: bool,
        fingerprint: &DeviceFingerprint,
    ) -> AccessDecision {
        let decision = evaluate_access(caller.caller(), resource_is_premium, Utc::now());
        if !decision.is_granted() || !resource_is_premium {
            return decision;
        }

        match caller.account() {
            Some(account) if !account.is_admin() => {
                let check = DeviceLockManager::new(self.ctx).check(account, fingerprint);
                if self.ctx.device_lock_policy().permits(check) {
                    AccessDecision::Granted
                } else {
                    AccessDecision::DeviceNotAuthorized
                }
            }
            _ => decision,
        }
    }

    /// Turn a decision into a result, mapping denials to their user-facing error
    pub fn ensure(decision: AccessDecision) -> ServiceResult<()> {
        match decision {
            AccessDecision::Granted => Ok(()),
            AccessDecision::LoginRequired => Err(AppError::LoginRequired.into()),
            AccessDecision::UpgradeRequired => Err(AppError::UpgradeRequired.into()),
            AccessDecision::DeviceNotAuthorized => Err(AppError::DeviceNotAuthorized.into()),
        }
    }

    /// Account behind a regular (non-trial) token
    #[instrument(skip(self, claims))]
    pub async fn require_account(&self, claims: Option<&Claims>) -> ServiceResult<Account> {
        let claims = claims.ok_or_else(ServiceError::unauthenticated)?;
        if claims.is_trial() {
            return Err(ServiceError::forbidden());
        }

        self.resolve(Some(claims))
            .await?
            .account
            .ok_or_else(ServiceError::unauthenticated)
    }

    /// Account behind a regular token whose live role is admin
    #[instrument(skip(self, claims))]
    pub async fn require_admin(&self, claims: Option<&Claims>) -> ServiceResult<Account> {
        let account = self.require_account(claims).await?;
        if !account.is_admin() {
            debug!(username = %account.username, "Admin access denied");
            return Err(ServiceError::forbidden());
        }
        Ok(account)
    }

    /// Snapshot of the caller: weak identity from the token, live
    /// entitlement, and the strong session check
    #[instrument(skip(self, claims, session_token, fingerprint))]
    pub async fn me(
        &self,
        claims: Option<&Claims>,
        session_token: Option<&str>,
        fingerprint: &DeviceFingerprint,
    ) -> ServiceResult<MeResponse> {
        let resolved = self.resolve(claims).await?;
        let Some(account) = resolved.account() else {
            return Ok(MeResponse::anonymous());
        };

        let now = Utc::now();
        let premium = !matches!(resolved.caller(), Caller::Trial(_)) && is_entitled(account, true, now);

        let session_valid = match session_token {
            Some(token) => {
                SessionManager::new(self.ctx)
                    .validate_session(account, token, now)
                    .await?
            }
            None => false,
        };

        let device = DeviceCheck::of(account, fingerprint);
        let device_mismatch = premium && self.ctx.device_lock_policy().reports(device);

        Ok(MeResponse {
            authenticated: true,
            username: Some(account.username.clone()),
            token_kind: resolved.token_kind(),
            role: Some(account.role),
            premium,
            days_remaining: account.subscription_days_remaining(now),
            session_valid,
            device: Some(device),
            device_mismatch,
        })
    }
}
