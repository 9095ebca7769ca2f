//! In-memory AccountRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::instrument;

use deck_core::entities::{Account, DeviceLock, LoginAttempt, PaymentApplication, SessionRecord};
use deck_core::error::DomainError;
use deck_core::traits::{AccountRepository, RepoResult};
use deck_core::value_objects::{AccountId, SubscriptionStatus};

struct StoredAccount {
    account: Account,
    password_hash: String,
}

/// Accounts keyed by id, with unique indexes on username, email and
/// applied payment ids, plus the owner of each gateway order.
///
/// Lock order when two maps are held at once: `usernames` before `emails`
/// before `accounts`, `payment_ids` before `accounts`, and `orders` before
/// `accounts`.
#[derive(Default)]
pub struct MemoryAccountRepository {
    accounts: DashMap<AccountId, StoredAccount>,
    usernames: DashMap<String, AccountId>,
    emails: DashMap<String, AccountId>,
    payment_ids: DashMap<String, AccountId>,
    orders: DashMap<String, AccountId>,
}

impl MemoryAccountRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn snapshot(&self, id: AccountId) -> Option<Account> {
        self.accounts.get(&id).map(|stored| stored.account.clone())
    }

    /// Run `f` on the account under its shard lock
    fn with_account<T>(
        &self,
        id: AccountId,
        f: impl FnOnce(&mut Account) -> T,
    ) -> RepoResult<T> {
        let mut stored = self
            .accounts
            .get_mut(&id)
            .ok_or(DomainError::AccountNotFound(id))?;
        Ok(f(&mut stored.account))
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }

    async fn find_by_id(&self, id: AccountId) -> RepoResult<Option<Account>> {
        Ok(self.snapshot(id))
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<Account>> {
        let id = self.usernames.get(username).map(|entry| *entry);
        Ok(id.and_then(|id| self.snapshot(id)))
    }

    async fn exists(&self, username: &str, email: &str) -> RepoResult<bool> {
        Ok(self.usernames.contains_key(username) || self.emails.contains_key(email))
    }

    #[instrument(skip(self, account, password_hash), fields(username = %account.username))]
    async fn create(&self, account: &Account, password_hash: &str) -> RepoResult<()> {
        let Entry::Vacant(username_slot) = self.usernames.entry(account.username.clone()) else {
            return Err(DomainError::AccountAlreadyExists);
        };
        let Entry::Vacant(email_slot) = self.emails.entry(account.email.clone()) else {
            return Err(DomainError::AccountAlreadyExists);
        };

        self.accounts.insert(
            account.id,
            StoredAccount {
                account: account.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        username_slot.insert(account.id);
        email_slot.insert(account.id);

        Ok(())
    }

    async fn delete(&self, id: AccountId) -> RepoResult<()> {
        let (_, stored) = self
            .accounts
            .remove(&id)
            .ok_or(DomainError::AccountNotFound(id))?;

        self.usernames.remove(&stored.account.username);
        self.emails.remove(&stored.account.email);
        self.payment_ids.retain(|_, owner| *owner != id);
        self.orders.retain(|_, owner| *owner != id);

        Ok(())
    }

    async fn list(&self, limit: i64, offset: i64) -> RepoResult<Vec<Account>> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|stored| stored.account.clone())
            .collect();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(accounts
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn get_password_hash(&self, id: AccountId) -> RepoResult<Option<String>> {
        Ok(self
            .accounts
            .get(&id)
            .map(|stored| stored.password_hash.clone()))
    }

    async fn set_session(&self, id: AccountId, session: &SessionRecord) -> RepoResult<()> {
        self.with_account(id, |account| {
            account.session = Some(session.clone());
            account.updated_at = Utc::now();
        })
    }

    async fn touch_session(
        &self,
        id: AccountId,
        token: &str,
        at: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let Some(mut stored) = self.accounts.get_mut(&id) else {
            return Ok(false);
        };

        match stored.account.session.as_mut() {
            Some(session) if session.token == token => {
                session.last_activity_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn clear_session(&self, id: AccountId) -> RepoResult<bool> {
        let Some(mut stored) = self.accounts.get_mut(&id) else {
            return Ok(false);
        };

        let cleared = stored.account.session.take().is_some();
        if cleared {
            stored.account.updated_at = Utc::now();
        }
        Ok(cleared)
    }

    async fn list_active_sessions(&self, now: DateTime<Utc>) -> RepoResult<Vec<Account>> {
        let mut active: Vec<Account> = self
            .accounts
            .iter()
            .filter(|stored| stored.account.has_active_session(now))
            .map(|stored| stored.account.clone())
            .collect();

        active.sort_by_key(|account| {
            std::cmp::Reverse(account.session.as_ref().map(|s| s.last_activity_at))
        });

        Ok(active)
    }

    async fn create_device_lock(&self, id: AccountId, lock: &DeviceLock) -> RepoResult<bool> {
        self.with_account(id, |account| {
            if account.device_lock.is_some() {
                return false;
            }
            account.device_lock = Some(lock.clone());
            account.updated_at = Utc::now();
            true
        })
    }

    async fn record_order(&self, id: AccountId, order_id: &str) -> RepoResult<()> {
        let slot = self.orders.entry(order_id.to_string());
        if !self.accounts.contains_key(&id) {
            return Err(DomainError::AccountNotFound(id));
        }
        slot.or_insert(id);
        Ok(())
    }

    async fn find_order_owner(&self, order_id: &str) -> RepoResult<Option<AccountId>> {
        Ok(self.orders.get(order_id).map(|owner| *owner))
    }

    #[instrument(skip(self, application), fields(payment_id = %application.record.payment_id))]
    async fn apply_payment(
        &self,
        id: AccountId,
        application: &PaymentApplication,
    ) -> RepoResult<Account> {
        let record = &application.record;

        let Entry::Vacant(slot) = self.payment_ids.entry(record.payment_id.clone()) else {
            return Err(DomainError::PaymentAlreadyApplied(record.payment_id.clone()));
        };

        let updated = self.with_account(id, |account| {
            account.subscription_status = SubscriptionStatus::Premium;
            account.subscription_expires_at = Some(application.subscription_expires_at);
            account.total_paid += record.amount;
            account.payments.push(record.clone());
            if account.device_lock.is_none() {
                account.device_lock = Some(application.device_lock.clone());
            }
            account.updated_at = Utc::now();
            account.clone()
        })?;

        slot.insert(id);

        Ok(updated)
    }

    async fn record_login_attempt(
        &self,
        id: AccountId,
        attempt: &LoginAttempt,
        keep: usize,
    ) -> RepoResult<()> {
        self.with_account(id, |account| {
            account.login_attempts.push(attempt.clone());
            let excess = account.login_attempts.len().saturating_sub(keep);
            account.login_attempts.drain(..excess);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use deck_core::entities::{LoginOutcome, PaymentRecord, PAYMENT_STATUS_CAPTURED};
    use deck_core::value_objects::DeviceFingerprint;

    fn account(username: &str) -> Account {
        Account::new(
            AccountId::generate(),
            username.to_string(),
            format!("{username}@x.com"),
        )
    }

    fn session(token: &str, now: DateTime<Utc>) -> SessionRecord {
        SessionRecord::new(
            token.to_string(),
            DeviceFingerprint::new("fp"),
            "ua".to_string(),
            "127.0.0.1".to_string(),
            now,
            Duration::days(22),
        )
    }

    fn application(payment_id: &str, fingerprint: &str) -> PaymentApplication {
        let now = Utc::now();
        PaymentApplication {
            record: PaymentRecord {
                order_id: "order_1".to_string(),
                payment_id: payment_id.to_string(),
                amount: 49_900,
                currency: "INR".to_string(),
                status: PAYMENT_STATUS_CAPTURED.to_string(),
                paid_at: now,
            },
            subscription_expires_at: now + Duration::days(30),
            device_lock: DeviceLock::new(DeviceFingerprint::new(fingerprint), now),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = MemoryAccountRepository::new();
        let alice = account("alice");

        repo.create(&alice, "hash").await.unwrap();

        assert_eq!(repo.find_by_id(alice.id).await.unwrap(), Some(alice.clone()));
        assert_eq!(
            repo.find_by_username("alice").await.unwrap().map(|a| a.id),
            Some(alice.id)
        );
        assert_eq!(
            repo.get_password_hash(alice.id).await.unwrap(),
            Some("hash".to_string())
        );
        assert!(repo.exists("alice", "other@x.com").await.unwrap());
        assert!(repo.exists("other", "alice@x.com").await.unwrap());
        assert!(!repo.exists("other", "other@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_or_email_rejected() {
        let repo = MemoryAccountRepository::new();
        repo.create(&account("alice"), "hash").await.unwrap();

        let mut same_name = account("alice");
        same_name.email = "fresh@x.com".to_string();
        assert!(matches!(
            repo.create(&same_name, "hash").await,
            Err(DomainError::AccountAlreadyExists)
        ));

        let mut same_email = account("bob");
        same_email.email = "alice@x.com".to_string();
        assert!(matches!(
            repo.create(&same_email, "hash").await,
            Err(DomainError::AccountAlreadyExists)
        ));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_frees_username() {
        let repo = MemoryAccountRepository::new();
        let alice = account("alice");
        repo.create(&alice, "hash").await.unwrap();

        repo.delete(alice.id).await.unwrap();
        assert!(repo.find_by_id(alice.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(alice.id).await,
            Err(DomainError::AccountNotFound(_))
        ));

        repo.create(&account("alice"), "hash").await.unwrap();
    }

    #[tokio::test]
    async fn test_session_replaced_touched_and_cleared() {
        let repo = MemoryAccountRepository::new();
        let alice = account("alice");
        repo.create(&alice, "hash").await.unwrap();
        let now = Utc::now();

        repo.set_session(alice.id, &session("first", now)).await.unwrap();
        repo.set_session(alice.id, &session("second", now)).await.unwrap();

        let later = now + Duration::minutes(5);
        assert!(!repo.touch_session(alice.id, "first", later).await.unwrap());
        assert!(repo.touch_session(alice.id, "second", later).await.unwrap());

        let stored = repo.find_by_id(alice.id).await.unwrap().unwrap();
        let current = stored.session.unwrap();
        assert_eq!(current.token, "second");
        assert_eq!(current.last_activity_at, later);

        assert!(repo.clear_session(alice.id).await.unwrap());
        assert!(!repo.clear_session(alice.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_active_sessions_skips_expired() {
        let repo = MemoryAccountRepository::new();
        let now = Utc::now();
        let alice = account("alice");
        let bob = account("bob");
        repo.create(&alice, "hash").await.unwrap();
        repo.create(&bob, "hash").await.unwrap();

        repo.set_session(alice.id, &session("a", now)).await.unwrap();
        let mut stale = session("b", now - Duration::days(30));
        stale.expires_at = now - Duration::days(8);
        repo.set_session(bob.id, &stale).await.unwrap();

        let active = repo.list_active_sessions(now).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, alice.id);
    }

    #[tokio::test]
    async fn test_device_lock_is_set_once() {
        let repo = MemoryAccountRepository::new();
        let alice = account("alice");
        repo.create(&alice, "hash").await.unwrap();
        let laptop = DeviceLock::new(DeviceFingerprint::new("laptop"), Utc::now());
        let phone = DeviceLock::new(DeviceFingerprint::new("phone"), Utc::now());

        assert!(repo.create_device_lock(alice.id, &laptop).await.unwrap());
        assert!(!repo.create_device_lock(alice.id, &laptop).await.unwrap());
        assert!(!repo.create_device_lock(alice.id, &phone).await.unwrap());

        let stored = repo.find_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(stored.device_lock, Some(laptop));
    }

    #[tokio::test]
    async fn test_apply_payment() {
        let repo = MemoryAccountRepository::new();
        let alice = account("alice");
        repo.create(&alice, "hash").await.unwrap();

        let updated = repo
            .apply_payment(alice.id, &application("pay_1", "laptop"))
            .await
            .unwrap();

        assert_eq!(updated.subscription_status, SubscriptionStatus::Premium);
        assert!(updated.subscription_expires_at.is_some());
        assert_eq!(updated.total_paid, 49_900);
        assert_eq!(updated.payments.len(), 1);
        assert_eq!(updated.device_lock.unwrap().fingerprint.as_str(), "laptop");
    }

    #[tokio::test]
    async fn test_apply_payment_keeps_existing_lock_and_rejects_replay() {
        let repo = MemoryAccountRepository::new();
        let alice = account("alice");
        let bob = account("bob");
        repo.create(&alice, "hash").await.unwrap();
        repo.create(&bob, "hash").await.unwrap();

        repo.apply_payment(alice.id, &application("pay_1", "laptop"))
            .await
            .unwrap();
        let renewed = repo
            .apply_payment(alice.id, &application("pay_2", "phone"))
            .await
            .unwrap();
        assert_eq!(renewed.total_paid, 99_800);
        assert_eq!(renewed.device_lock.unwrap().fingerprint.as_str(), "laptop");

        // replay against another account
        let replay = repo.apply_payment(bob.id, &application("pay_1", "tablet")).await;
        assert!(matches!(replay, Err(DomainError::PaymentAlreadyApplied(_))));
        let bob_now = repo.find_by_id(bob.id).await.unwrap().unwrap();
        assert_eq!(bob_now.subscription_status, SubscriptionStatus::Free);
        assert!(bob_now.payments.is_empty());
    }

    #[tokio::test]
    async fn test_apply_payment_to_missing_account_does_not_burn_payment_id() {
        let repo = MemoryAccountRepository::new();
        let ghost = AccountId::generate();
        let result = repo.apply_payment(ghost, &application("pay_1", "fp")).await;
        assert!(matches!(result, Err(DomainError::AccountNotFound(_))));

        let alice = account("alice");
        repo.create(&alice, "hash").await.unwrap();
        repo.apply_payment(alice.id, &application("pay_1", "fp"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_order_owner_is_first_recorder() {
        let repo = MemoryAccountRepository::new();
        let alice = account("alice");
        let bob = account("bob");
        repo.create(&alice, "hash").await.unwrap();
        repo.create(&bob, "hash").await.unwrap();

        assert_eq!(repo.find_order_owner("order_1").await.unwrap(), None);

        repo.record_order(alice.id, "order_1").await.unwrap();
        repo.record_order(bob.id, "order_1").await.unwrap();
        assert_eq!(repo.find_order_owner("order_1").await.unwrap(), Some(alice.id));

        let ghost = repo.record_order(AccountId::generate(), "order_2").await;
        assert!(matches!(ghost, Err(DomainError::AccountNotFound(_))));
        assert_eq!(repo.find_order_owner("order_2").await.unwrap(), None);

        repo.delete(alice.id).await.unwrap();
        assert_eq!(repo.find_order_owner("order_1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_attempts_are_bounded() {
        let repo = MemoryAccountRepository::new();
        let alice = account("alice");
        repo.create(&alice, "hash").await.unwrap();
        let start = Utc::now();

        for i in 0..5 {
            let attempt = LoginAttempt {
                outcome: if i % 2 == 0 {
                    LoginOutcome::Success
                } else {
                    LoginOutcome::Failure
                },
                ip_address: format!("10.0.0.{i}"),
                user_agent: "ua".to_string(),
                device_fingerprint: DeviceFingerprint::new("fp"),
                attempted_at: start + Duration::seconds(i),
            };
            repo.record_login_attempt(alice.id, &attempt, 3).await.unwrap();
        }

        let stored = repo.find_by_id(alice.id).await.unwrap().unwrap();
        let ips: Vec<_> = stored
            .login_attempts
            .iter()
            .map(|a| a.ip_address.as_str())
            .collect();
        assert_eq!(ips, vec!["10.0.0.2", "10.0.0.3", "10.0.0.4"]);
    }

    #[tokio::test]
    async fn test_list_paginates() {
        let repo = MemoryAccountRepository::new();
        for name in ["a1", "a2", "a3"] {
            repo.create(&account(name), "hash").await.unwrap();
        }

        assert_eq!(repo.list(2, 0).await.unwrap().len(), 2);
        assert_eq!(repo.list(2, 2).await.unwrap().len(), 1);
        assert!(repo.list(2, 5).await.unwrap().is_empty());
    }
}
