//! Admin service
//!
//! Session introspection, forced logout and account administration. Callers
//! must already hold an admin account (see `AccessService::require_admin`).

use chrono::Utc;
use deck_core::entities::Account;
use deck_core::AccountId;
use tracing::{info, instrument, warn};

use crate::dto::{
    AccountResponse, ActiveSessionResponse, CreateAccountRequest, DeviceLockResponse,
    ForceLogoutResponse, ListAccountsQuery, LoginAttemptResponse, PaginatedResponse,
    SessionInfoResponse, UserSessionResponse,
};

use super::auth::AuthService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::session::SessionManager;

/// Admin service
pub struct AdminService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AdminService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Clear the target's server session.
    ///
    /// Bearer tokens already issued to the target stay valid until they
    /// expire; only session-bound checks fail afterwards.
    #[instrument(skip(self, admin), fields(admin = %admin.username))]
    pub async fn force_logout(
        &self,
        admin: &Account,
        target: AccountId,
    ) -> ServiceResult<ForceLogoutResponse> {
        let account = self.load(target).await?;
        let session_cleared = SessionManager::new(self.ctx)
            .clear_session(account.id)
            .await?;

        warn!(target = %account.username, session_cleared, "Forced logout");

        Ok(ForceLogoutResponse {
            account_id: account.id,
            session_cleared,
        })
    }

    /// Session, device lock and recent login attempts of one account
    #[instrument(skip(self))]
    pub async fn user_session(&self, target: AccountId) -> ServiceResult<UserSessionResponse> {
        let account = self.load(target).await?;
        let now = Utc::now();

        Ok(UserSessionResponse {
            session: account
                .session
                .as_ref()
                .map(|session| SessionInfoResponse::at(session, now)),
            device_lock: account.device_lock.as_ref().map(DeviceLockResponse::from),
            login_attempts: account
                .login_attempts
                .iter()
                .map(LoginAttemptResponse::from)
                .collect(),
            account: AccountResponse::from(&account),
        })
    }

    /// Every account whose session has not expired
    #[instrument(skip(self))]
    pub async fn active_sessions(&self) -> ServiceResult<Vec<ActiveSessionResponse>> {
        let now = Utc::now();
        let accounts = self.ctx.account_repo().list_active_sessions(now).await?;

        Ok(accounts
            .into_iter()
            .filter_map(|account| {
                let session = SessionInfoResponse::at(account.session.as_ref()?, now);
                Some(ActiveSessionResponse {
                    account_id: account.id,
                    username: account.username,
                    session,
                })
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn list_accounts(
        &self,
        query: ListAccountsQuery,
    ) -> ServiceResult<PaginatedResponse<AccountResponse>> {
        let accounts = self
            .ctx
            .account_repo()
            .list(query.limit, query.offset)
            .await?;

        Ok(PaginatedResponse::new(
            accounts.iter().map(AccountResponse::from).collect(),
            query.limit,
            query.offset,
        ))
    }

    /// Create an account with any role, tier and expiry
    #[instrument(skip(self, admin, request), fields(admin = %admin.username, username = %request.username))]
    pub async fn create_account(
        &self,
        admin: &Account,
        request: CreateAccountRequest,
    ) -> ServiceResult<AccountResponse> {
        let account = Account::new(AccountId::generate(), request.username, request.email)
            .with_role(request.role)
            .with_subscription(request.subscription_status, request.subscription_expires_at);

        let account = AuthService::new(self.ctx)
            .register(account, &request.password)
            .await?;

        info!(account_id = %account.id, role = %account.role, "Account created by admin");
        Ok(AccountResponse::from(&account))
    }

    /// Hard delete. Admins cannot delete their own account.
    #[instrument(skip(self, admin), fields(admin = %admin.username))]
    pub async fn delete_account(&self, admin: &Account, target: AccountId) -> ServiceResult<()> {
        if admin.id == target {
            return Err(ServiceError::validation("Admins cannot delete their own account"));
        }

        self.ctx.account_repo().delete(target).await?;

        warn!(account_id = %target, "Account deleted");
        Ok(())
    }

    async fn load(&self, id: AccountId) -> ServiceResult<Account> {
        self.ctx
            .account_repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Account", id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::LoginRequest;
    use crate::services::test_support::{client, test_context};
    use deck_core::{Role, SubscriptionStatus};

    async fn admin(ctx: &ServiceContext) -> Account {
        let admin = Account::new(AccountId::generate(), "root".to_string(), "root@x.com".to_string())
            .with_role(Role::Admin);
        ctx.account_repo().create(&admin, "hash").await.unwrap();
        admin
    }

    fn create_request(username: &str) -> CreateAccountRequest {
        CreateAccountRequest {
            username: username.to_string(),
            email: format!("{username}@x.com"),
            password: "pw".to_string(),
            role: Role::User,
            subscription_status: SubscriptionStatus::Premium,
            subscription_expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_force_logout_leaves_token_valid() {
        let t = test_context();
        let admin_account = admin(&t.ctx).await;
        let admins = AdminService::new(&t.ctx);

        let created = admins
            .create_account(&admin_account, create_request("alice"))
            .await
            .unwrap();
        let credentials = AuthService::new(&t.ctx)
            .login(
                LoginRequest {
                    username: "alice".to_string(),
                    password: "pw".to_string(),
                },
                &client("laptop"),
            )
            .await
            .unwrap();

        let sessions = SessionManager::new(&t.ctx);
        assert!(sessions.has_active_session(created.id).await.unwrap());

        let response = admins.force_logout(&admin_account, created.id).await.unwrap();
        assert!(response.session_cleared);
        assert!(!sessions.has_active_session(created.id).await.unwrap());

        // Stateless token is not revoked
        assert!(t.ctx.token_service().verify(&credentials.token.token).is_some());

        let again = admins.force_logout(&admin_account, created.id).await.unwrap();
        assert!(!again.session_cleared);
    }

    #[tokio::test]
    async fn test_user_session_and_active_sessions() {
        let t = test_context();
        let admin_account = admin(&t.ctx).await;
        let admins = AdminService::new(&t.ctx);

        let created = admins
            .create_account(&admin_account, create_request("alice"))
            .await
            .unwrap();
        let auth = AuthService::new(&t.ctx);
        let _ = auth
            .login(
                LoginRequest {
                    username: "alice".to_string(),
                    password: "nope".to_string(),
                },
                &client("laptop"),
            )
            .await;
        auth.login(
            LoginRequest {
                username: "alice".to_string(),
                password: "pw".to_string(),
            },
            &client("laptop"),
        )
        .await
        .unwrap();

        let introspection = admins.user_session(created.id).await.unwrap();
        assert!(introspection.session.unwrap().active);
        assert!(introspection.device_lock.is_none());
        assert_eq!(introspection.login_attempts.len(), 2);

        let active = admins.active_sessions().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].username, "alice");

        let missing = admins.user_session(AccountId::generate()).await.unwrap_err();
        assert_eq!(missing.status_code(), 404);
    }

    #[tokio::test]
    async fn test_account_administration() {
        let t = test_context();
        let admin_account = admin(&t.ctx).await;
        let admins = AdminService::new(&t.ctx);

        let created = admins
            .create_account(&admin_account, create_request("alice"))
            .await
            .unwrap();
        assert_eq!(created.subscription_status, SubscriptionStatus::Premium);
        assert!(created.subscription_expires_at.is_none());

        let duplicate = admins
            .create_account(&admin_account, create_request("alice"))
            .await
            .unwrap_err();
        assert_eq!(duplicate.status_code(), 409);

        let page = admins.list_accounts(ListAccountsQuery::default()).await.unwrap();
        assert_eq!(page.data.len(), 2);
        assert!(!page.pagination.has_more);

        let self_delete = admins
            .delete_account(&admin_account, admin_account.id)
            .await
            .unwrap_err();
        assert_eq!(self_delete.status_code(), 400);

        admins.delete_account(&admin_account, created.id).await.unwrap();
        let gone = admins.delete_account(&admin_account, created.id).await.unwrap_err();
        assert_eq!(gone.status_code(), 404);
    }
}
