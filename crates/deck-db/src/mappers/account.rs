//! Account entity <-> model mapper

use deck_core::{
    Account, AccountId, DeviceFingerprint, DeviceLock, DomainError, LoginAttempt, LoginOutcome,
    PaymentRecord, RepoResult, Role, SessionRecord, SubscriptionStatus,
};

use crate::models::{AccountModel, LoginAttemptModel, PaymentModel};

fn corrupt(column: &str, value: &str) -> DomainError {
    DomainError::DatabaseError(format!("unexpected value in {column}: {value}"))
}

/// Convert PaymentModel to PaymentRecord entity
impl From<PaymentModel> for PaymentRecord {
    fn from(model: PaymentModel) -> Self {
        PaymentRecord {
            order_id: model.order_id,
            payment_id: model.payment_id,
            amount: model.amount,
            currency: model.currency,
            status: model.status,
            paid_at: model.paid_at,
        }
    }
}

/// Convert a login attempt row
pub fn login_attempt_from_model(model: LoginAttemptModel) -> RepoResult<LoginAttempt> {
    let outcome = LoginOutcome::parse(&model.outcome)
        .ok_or_else(|| corrupt("login_attempts.outcome", &model.outcome))?;

    Ok(LoginAttempt {
        outcome,
        ip_address: model.ip_address,
        user_agent: model.user_agent,
        device_fingerprint: DeviceFingerprint::new(model.device_fingerprint),
        attempted_at: model.attempted_at,
    })
}

/// Session columns form a record only when all of them are present
fn session_from_model(model: &mut AccountModel) -> Option<SessionRecord> {
    Some(SessionRecord {
        token: model.session_token.take()?,
        device_fingerprint: DeviceFingerprint::new(model.session_fingerprint.take()?),
        user_agent: model.session_user_agent.take()?,
        ip_address: model.session_ip.take()?,
        login_at: model.session_login_at?,
        last_activity_at: model.session_last_activity_at?,
        expires_at: model.session_expires_at?,
    })
}

/// Assemble an Account from its row and ordered histories
pub fn account_from_model(
    mut model: AccountModel,
    payments: Vec<PaymentModel>,
    attempts: Vec<LoginAttemptModel>,
) -> RepoResult<Account> {
    let role = Role::parse(&model.role).ok_or_else(|| corrupt("accounts.role", &model.role))?;
    let subscription_status = SubscriptionStatus::parse(&model.subscription_status)
        .ok_or_else(|| corrupt("accounts.subscription_status", &model.subscription_status))?;

    let session = session_from_model(&mut model);
    let device_lock = match (model.device_lock_fingerprint.take(), model.device_locked_at) {
        (Some(fingerprint), Some(locked_at)) => {
            Some(DeviceLock::new(DeviceFingerprint::new(fingerprint), locked_at))
        }
        _ => None,
    };

    let login_attempts = attempts
        .into_iter()
        .map(login_attempt_from_model)
        .collect::<RepoResult<Vec<_>>>()?;

    Ok(Account {
        id: AccountId::new(model.id),
        username: model.username,
        email: model.email,
        role,
        subscription_status,
        subscription_expires_at: model.subscription_expires_at,
        total_paid: model.total_paid,
        payments: payments.into_iter().map(PaymentRecord::from).collect(),
        session,
        device_lock,
        login_attempts,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
