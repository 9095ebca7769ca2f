//! Device lock manager
//!
//! A premium account is bound to the device that completed payment. The lock
//! is set once and never replaced; what a mismatch means is decided by the
//! configured [`DeviceLockPolicy`](deck_core::DeviceLockPolicy).

use chrono::Utc;
use deck_core::entities::{Account, DeviceLock};
use deck_core::{AccountId, DeviceCheck, DeviceFingerprint};
use tracing::{debug, info, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Device lock manager
pub struct DeviceLockManager<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> DeviceLockManager<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Lock the account to `fingerprint` unless a lock already exists.
    ///
    /// Returns whether a lock was created. An existing lock is left untouched
    /// whatever fingerprint is presented.
    #[instrument(skip(self, fingerprint))]
    pub async fn create_device_lock(
        &self,
        account_id: AccountId,
        fingerprint: &DeviceFingerprint,
    ) -> ServiceResult<bool> {
        let lock = DeviceLock::new(fingerprint.clone(), Utc::now());
        let created = self
            .ctx
            .account_repo()
            .create_device_lock(account_id, &lock)
            .await?;

        if created {
            info!("Device lock created");
        } else {
            debug!("Device lock already present, left unchanged");
        }
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn has_active_device_lock(&self, account_id: AccountId) -> ServiceResult<bool> {
        let account = self
            .ctx
            .account_repo()
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Account", account_id.to_string()))?;
        Ok(account.has_device_lock())
    }

    /// Compare a request fingerprint with the account's lock, logging a
    /// mismatch when the policy reports it
    pub fn check(&self, account: &Account, fingerprint: &DeviceFingerprint) -> DeviceCheck {
        let check = DeviceCheck::of(account, fingerprint);
        let policy = self.ctx.device_lock_policy();

        if policy.reports(check) {
            warn!(
                account_id = %account.id,
                username = %account.username,
                policy = %policy,
                "Device lock mismatch"
            );
        }
        check
    }
}
