//! Payment gateway port

use async_trait::async_trait;

use super::RepoResult;
use crate::entities::PaymentOrder;

/// External payment processor. Only order creation is delegated; payment
/// verification happens locally against the shared secret.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order for `amount` minor units
    async fn create_order(&self, amount: i64, currency: &str, receipt: &str)
        -> RepoResult<PaymentOrder>;
}
