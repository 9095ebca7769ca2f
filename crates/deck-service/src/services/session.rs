//! Session manager
//!
//! Server-side sessions give revocable ("strong") authentication next to the
//! stateless bearer token. An account holds at most one session; creating a
//! new one silently supersedes the previous token.

use chrono::{DateTime, Utc};
use deck_common::generate_session_token;
use deck_core::entities::{Account, SessionRecord};
use deck_core::{AccountId, DeviceFingerprint};
use subtle::ConstantTimeEq;
use tracing::{debug, info, instrument};

use crate::dto::SessionTicket;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Request metadata recorded with sessions, locks and login attempts
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub fingerprint: DeviceFingerprint,
    pub user_agent: String,
    pub ip_address: String,
}

/// Session manager
pub struct SessionManager<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SessionManager<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a session for `account`, replacing any existing one
    #[instrument(skip(self, account, client), fields(account_id = %account.id))]
    pub async fn create_session(
        &self,
        account: &Account,
        client: &ClientInfo,
    ) -> ServiceResult<SessionTicket> {
        let token = generate_session_token();
        let record = SessionRecord::new(
            token.clone(),
            client.fingerprint.clone(),
            client.user_agent.clone(),
            client.ip_address.clone(),
            Utc::now(),
            self.ctx.session_ttl(),
        );

        self.ctx.account_repo().set_session(account.id, &record).await?;

        if account.session.is_some() {
            debug!("Previous session superseded");
        }
        info!(ip = %client.ip_address, "Session created");

        Ok(SessionTicket {
            token,
            max_age: self.ctx.session_config().ttl,
        })
    }

    /// True iff the account has a session that has not expired
    #[instrument(skip(self))]
    pub async fn has_active_session(&self, account_id: AccountId) -> ServiceResult<bool> {
        let account = self.load(account_id).await?;
        Ok(account.has_active_session(Utc::now()))
    }

    /// Delete the account's session. Returns whether one existed.
    #[instrument(skip(self))]
    pub async fn clear_session(&self, account_id: AccountId) -> ServiceResult<bool> {
        let cleared = self.ctx.account_repo().clear_session(account_id).await?;
        if cleared {
            info!("Session cleared");
        }
        Ok(cleared)
    }

    #[instrument(skip(self))]
    pub async fn get_session_info(&self, account_id: AccountId) -> ServiceResult<Option<SessionRecord>> {
        Ok(self.load(account_id).await?.session)
    }

    /// Strong authentication: the presented token must match the live
    /// session, which must be neither expired nor idle. Stamps activity on
    /// success.
    #[instrument(skip(self, account, token), fields(account_id = %account.id))]
    pub async fn validate_session(
        &self,
        account: &Account,
        token: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<bool> {
        if !self.matches(account, token, now) {
            return Ok(false);
        }

        // The store re-checks the token, so a session superseded since
        // `account` was read is not touched.
        let touched = self
            .ctx
            .account_repo()
            .touch_session(account.id, token, now)
            .await?;
        Ok(touched)
    }

    /// Token, expiry and idle checks against an already loaded account
    pub fn matches(&self, account: &Account, token: &str, now: DateTime<Utc>) -> bool {
        let Some(session) = account.session.as_ref() else {
            return false;
        };

        let token_matches: bool = session.token.as_bytes().ct_eq(token.as_bytes()).into();
        if !token_matches || session.is_expired(now) {
            return false;
        }

        match self.ctx.session_idle_timeout() {
            Some(idle) if session.is_idle(now, idle) => {
                debug!("Session idle beyond timeout");
                false
            }
            _ => true,
        }
    }

    async fn load(&self, account_id: AccountId) -> ServiceResult<Account> {
        self.ctx
            .account_repo()
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Account", account_id.to_string()))
    }
}
