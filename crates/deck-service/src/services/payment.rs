//! Payment service
//!
//! Order creation, callback verification, premium status and token refresh.
//! The callback signature is checked before anything touches the store, and
//! a callback only credits the account its order was created for.

use chrono::{Months, Utc};
use deck_common::{AppError, Claims};
use deck_core::entities::{Account, DeviceLock, PaymentApplication, PaymentRecord};
use deck_core::{is_entitled, DomainError, PAYMENT_STATUS_CAPTURED};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::dto::{
    AccountResponse, IssuedCredentials, OrderResponse, PremiumStatusResponse, VerifyPaymentRequest,
};

use super::access::AccessService;
use super::auth::token_snapshot;
use super::context::ServiceContext;
use super::device_lock::DeviceLockManager;
use super::error::{ServiceError, ServiceResult};
use super::session::{ClientInfo, SessionManager};

/// Payment service
pub struct PaymentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PaymentService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a gateway order for the configured price
    #[instrument(skip(self))]
    pub async fn create_order(&self, username: &str) -> ServiceResult<OrderResponse> {
        let gateway = self
            .ctx
            .payment_gateway()
            .ok_or_else(ServiceError::payments_unavailable)?;
        let config = self.ctx.payment_config();
        let key_id = config
            .credentials()
            .map(|(id, _)| id.to_string())
            .ok_or_else(ServiceError::payments_unavailable)?;

        let account = self.find_account(username).await?;

        let receipt = format!("rcpt_{}", Uuid::new_v4().simple());
        let order = gateway
            .create_order(config.amount, &config.currency, &receipt)
            .await?;
        self.ctx.account_repo().record_order(account.id, &order.id).await?;

        info!(account_id = %account.id, order_id = %order.id, "Payment order created");

        Ok(OrderResponse {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            key_id,
        })
    }

    /// Verify a payment callback and apply it.
    ///
    /// Order: signature check, order ownership check, then one atomic store
    /// update (premium for one month from now, payment record, device lock if
    /// unset), then a new session and a paid token. An order created for a
    /// different account fails like a bad signature. A replayed payment id is
    /// rejected by the store before any mutation.
    #[instrument(
        skip(self, request, client),
        fields(username = %request.username, order_id = %request.order_id)
    )]
    pub async fn verify_payment(
        &self,
        request: VerifyPaymentRequest,
        client: &ClientInfo,
    ) -> ServiceResult<IssuedCredentials> {
        let verifier = self
            .ctx
            .signature_verifier()
            .ok_or_else(ServiceError::payments_unavailable)?;

        if !verifier.verify(&request.order_id, &request.payment_id, &request.signature) {
            warn!(ip = %client.ip_address, "Payment signature rejected");
            return Err(AppError::SignatureInvalid.into());
        }

        let account = self.find_account(&request.username).await?;

        let owner = self
            .ctx
            .account_repo()
            .find_order_owner(&request.order_id)
            .await?;
        if owner != Some(account.id) {
            warn!(
                account_id = %account.id,
                ip = %client.ip_address,
                "Payment order was not created for this account"
            );
            return Err(AppError::SignatureInvalid.into());
        }

        let now = Utc::now();
        let config = self.ctx.payment_config();
        let application = PaymentApplication {
            record: PaymentRecord {
                order_id: request.order_id,
                payment_id: request.payment_id,
                amount: config.amount,
                currency: config.currency.clone(),
                status: PAYMENT_STATUS_CAPTURED.to_string(),
                paid_at: now,
            },
            subscription_expires_at: now
                .checked_add_months(Months::new(1))
                .ok_or_else(|| ServiceError::internal("subscription expiry out of range"))?,
            device_lock: DeviceLock::new(client.fingerprint.clone(), now),
        };

        let updated = match self
            .ctx
            .account_repo()
            .apply_payment(account.id, &application)
            .await
        {
            Ok(updated) => updated,
            Err(DomainError::PaymentAlreadyApplied(payment_id)) => {
                warn!(account_id = %account.id, payment_id = %payment_id, "Payment replay rejected");
                return Err(DomainError::PaymentAlreadyApplied(payment_id).into());
            }
            Err(e) => return Err(e.into()),
        };

        let check = DeviceLockManager::new(self.ctx).check(&updated, &client.fingerprint);
        info!(
            account_id = %updated.id,
            expires_at = ?updated.subscription_expires_at,
            device = ?check,
            "Payment applied"
        );

        self.issue(&updated, client).await
    }

    /// Entitlement snapshot for an account, by username
    #[instrument(skip(self))]
    pub async fn check_premium(&self, username: &str) -> ServiceResult<PremiumStatusResponse> {
        let account = self.find_account(username).await?;
        let now = Utc::now();

        Ok(PremiumStatusResponse {
            username: account.username.clone(),
            is_premium: is_entitled(&account, true, now),
            subscription_status: account.subscription_status,
            subscription_expires_at: account.subscription_expires_at,
            days_remaining: account.subscription_days_remaining(now),
            device_locked: account.has_device_lock(),
        })
    }

    /// Reissue credentials from live account state.
    ///
    /// Requires the caller's own regular token. Starts a new session and
    /// locks the device if the account is entitled and still unlocked.
    #[instrument(skip(self, claims, client))]
    pub async fn refresh_token(
        &self,
        username: &str,
        claims: Option<&Claims>,
        client: &ClientInfo,
    ) -> ServiceResult<IssuedCredentials> {
        let account = AccessService::new(self.ctx).require_account(claims).await?;
        if account.username != username {
            warn!(caller = %account.username, "Token refresh for another account refused");
            return Err(ServiceError::forbidden());
        }

        let mut account = account;
        if !account.is_admin()
            && !account.has_device_lock()
            && is_entitled(&account, true, Utc::now())
        {
            DeviceLockManager::new(self.ctx)
                .create_device_lock(account.id, &client.fingerprint)
                .await?;
            account = self.find_account(username).await?;
        }

        self.issue(&account, client).await
    }

    /// New session plus a token reflecting `account`
    async fn issue(&self, account: &Account, client: &ClientInfo) -> ServiceResult<IssuedCredentials> {
        let session = SessionManager::new(self.ctx)
            .create_session(account, client)
            .await?;

        let (status, kind) = token_snapshot(account, Utc::now());
        let token = self
            .ctx
            .token_service()
            .issue(&account.username, account.role, status, kind)?;

        Ok(IssuedCredentials {
            token,
            session: Some(session),
            account: AccountResponse::from(account),
        })
    }

    async fn find_account(&self, username: &str) -> ServiceResult<Account> {
        self.ctx
            .account_repo()
            .find_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::not_found("Account", username))
    }
}
