//! PostgreSQL implementation of AccountRepository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use deck_core::entities::{Account, DeviceLock, LoginAttempt, PaymentApplication, SessionRecord};
use deck_core::error::DomainError;
use deck_core::traits::{AccountRepository, RepoResult};
use deck_core::value_objects::AccountId;

use crate::mappers::account_from_model;
use crate::models::{AccountModel, LoginAttemptModel, PaymentModel, ACCOUNT_COLUMNS};

use super::error::{account_not_found, map_db_error, map_missing_account, map_unique_violation};

fn select_accounts(tail: &str) -> String {
    format!("SELECT {ACCOUNT_COLUMNS} FROM accounts {tail}")
}

/// PostgreSQL implementation of AccountRepository
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    /// Create a new PgAccountRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach payment and login histories to account rows, preserving order
    async fn hydrate(&self, models: Vec<AccountModel>) -> RepoResult<Vec<Account>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();

        let payments = sqlx::query_as::<_, PaymentModel>(
            r"
            SELECT id, account_id, order_id, payment_id, amount, currency, status, paid_at
            FROM payments
            WHERE account_id = ANY($1)
            ORDER BY paid_at, id
            ",
        )
        .bind(ids.as_slice())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let attempts = sqlx::query_as::<_, LoginAttemptModel>(
            r"
            SELECT id, account_id, outcome, ip_address, user_agent, device_fingerprint, attempted_at
            FROM login_attempts
            WHERE account_id = ANY($1)
            ORDER BY attempted_at, id
            ",
        )
        .bind(ids.as_slice())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let mut payments_by_account: HashMap<Uuid, Vec<PaymentModel>> = HashMap::new();
        for payment in payments {
            payments_by_account.entry(payment.account_id).or_default().push(payment);
        }

        let mut attempts_by_account: HashMap<Uuid, Vec<LoginAttemptModel>> = HashMap::new();
        for attempt in attempts {
            attempts_by_account.entry(attempt.account_id).or_default().push(attempt);
        }

        models
            .into_iter()
            .map(|model| {
                let payments = payments_by_account.remove(&model.id).unwrap_or_default();
                let attempts = attempts_by_account.remove(&model.id).unwrap_or_default();
                account_from_model(model, payments, attempts)
            })
            .collect()
    }

    async fn hydrate_one(&self, model: Option<AccountModel>) -> RepoResult<Option<Account>> {
        match model {
            Some(model) => Ok(self.hydrate(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn account_exists(&self, id: AccountId) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1)")
            .bind(id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    #[instrument(skip(self))]
    async fn ping(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: AccountId) -> RepoResult<Option<Account>> {
        let model = sqlx::query_as::<_, AccountModel>(&select_accounts("WHERE id = $1"))
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        self.hydrate_one(model).await
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<Account>> {
        let model = sqlx::query_as::<_, AccountModel>(&select_accounts("WHERE username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        self.hydrate_one(model).await
    }

    #[instrument(skip(self))]
    async fn exists(&self, username: &str, email: &str) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(SELECT 1 FROM accounts WHERE username = $1 OR email = $2)
            ",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, account, password_hash), fields(username = %account.username))]
    async fn create(&self, account: &Account, password_hash: &str) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO accounts (id, username, email, password_hash, role, subscription_status,
                                  subscription_expires_at, total_paid, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(account.id.into_inner())
        .bind(&account.username)
        .bind(&account.email)
        .bind(password_hash)
        .bind(account.role.as_str())
        .bind(account.subscription_status.as_str())
        .bind(account.subscription_expires_at)
        .bind(account.total_paid)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AccountAlreadyExists))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: AccountId) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(account_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, limit: i64, offset: i64) -> RepoResult<Vec<Account>> {
        let models = sqlx::query_as::<_, AccountModel>(&select_accounts(
            "ORDER BY created_at, id LIMIT $1 OFFSET $2",
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.hydrate(models).await
    }

    #[instrument(skip(self))]
    async fn get_password_hash(&self, id: AccountId) -> RepoResult<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT password_hash FROM accounts WHERE id = $1")
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self, session))]
    async fn set_session(&self, id: AccountId, session: &SessionRecord) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE accounts
            SET session_token = $2, session_fingerprint = $3, session_user_agent = $4,
                session_ip = $5, session_login_at = $6, session_last_activity_at = $7,
                session_expires_at = $8, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(&session.token)
        .bind(session.device_fingerprint.as_str())
        .bind(&session.user_agent)
        .bind(&session.ip_address)
        .bind(session.login_at)
        .bind(session.last_activity_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(account_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn touch_session(
        &self,
        id: AccountId,
        token: &str,
        at: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE accounts
            SET session_last_activity_at = $3
            WHERE id = $1 AND session_token = $2
            ",
        )
        .bind(id.into_inner())
        .bind(token)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn clear_session(&self, id: AccountId) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE accounts
            SET session_token = NULL, session_fingerprint = NULL, session_user_agent = NULL,
                session_ip = NULL, session_login_at = NULL, session_last_activity_at = NULL,
                session_expires_at = NULL, updated_at = NOW()
            WHERE id = $1 AND session_token IS NOT NULL
            ",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn list_active_sessions(&self, now: DateTime<Utc>) -> RepoResult<Vec<Account>> {
        let models = sqlx::query_as::<_, AccountModel>(&select_accounts(
            r"
            WHERE session_token IS NOT NULL AND session_expires_at > $1
            ORDER BY session_last_activity_at DESC
            ",
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.hydrate(models).await
    }

    #[instrument(skip(self, lock))]
    async fn create_device_lock(&self, id: AccountId, lock: &DeviceLock) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE accounts
            SET device_lock_fingerprint = $2, device_locked_at = $3, updated_at = NOW()
            WHERE id = $1 AND device_lock_fingerprint IS NULL
            ",
        )
        .bind(id.into_inner())
        .bind(lock.fingerprint.as_str())
        .bind(lock.locked_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        if self.account_exists(id).await? {
            Ok(false)
        } else {
            Err(account_not_found(id))
        }
    }

    #[instrument(skip(self))]
    async fn record_order(&self, id: AccountId, order_id: &str) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO payment_orders (order_id, account_id)
            VALUES ($1, $2)
            ON CONFLICT (order_id) DO NOTHING
            ",
        )
        .bind(order_id)
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(|e| map_missing_account(e, id))?;

        Ok(())
    }

    async fn find_order_owner(&self, order_id: &str) -> RepoResult<Option<AccountId>> {
        let owner = sqlx::query_scalar::<_, Uuid>(
            "SELECT account_id FROM payment_orders WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(owner.map(AccountId::new))
    }

    #[instrument(skip(self, application), fields(payment_id = %application.record.payment_id))]
    async fn apply_payment(
        &self,
        id: AccountId,
        application: &PaymentApplication,
    ) -> RepoResult<Account> {
        let record = &application.record;
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM accounts WHERE id = $1 FOR UPDATE")
            .bind(id.into_inner())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_error)?;

        if locked.is_none() {
            return Err(account_not_found(id));
        }

        let replayed = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM payments WHERE payment_id = $1)",
        )
        .bind(&record.payment_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if replayed {
            return Err(DomainError::PaymentAlreadyApplied(record.payment_id.clone()));
        }

        sqlx::query(
            r"
            INSERT INTO payments (account_id, order_id, payment_id, amount, currency, status, paid_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(id.into_inner())
        .bind(&record.order_id)
        .bind(&record.payment_id)
        .bind(record.amount)
        .bind(&record.currency)
        .bind(&record.status)
        .bind(record.paid_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::PaymentAlreadyApplied(record.payment_id.clone())
            })
        })?;

        sqlx::query(
            r"
            UPDATE accounts
            SET subscription_status = 'premium',
                subscription_expires_at = $2,
                total_paid = total_paid + $3,
                device_lock_fingerprint = COALESCE(device_lock_fingerprint, $4),
                device_locked_at = COALESCE(device_locked_at, $5),
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(application.subscription_expires_at)
        .bind(record.amount)
        .bind(application.device_lock.fingerprint.as_str())
        .bind(application.device_lock.locked_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        self.find_by_id(id).await?.ok_or_else(|| account_not_found(id))
    }

    #[instrument(skip(self, attempt))]
    async fn record_login_attempt(
        &self,
        id: AccountId,
        attempt: &LoginAttempt,
        keep: usize,
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO login_attempts (account_id, outcome, ip_address, user_agent,
                                        device_fingerprint, attempted_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(id.into_inner())
        .bind(attempt.outcome.as_str())
        .bind(&attempt.ip_address)
        .bind(&attempt.user_agent)
        .bind(attempt.device_fingerprint.as_str())
        .bind(attempt.attempted_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_missing_account(e, id))?;

        sqlx::query(
            r"
            DELETE FROM login_attempts
            WHERE account_id = $1
              AND id NOT IN (
                  SELECT id FROM login_attempts
                  WHERE account_id = $1
                  ORDER BY attempted_at DESC, id DESC
                  LIMIT $2
              )
            ",
        )
        .bind(id.into_inner())
        .bind(i64::try_from(keep).unwrap_or(i64::MAX))
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }
}
