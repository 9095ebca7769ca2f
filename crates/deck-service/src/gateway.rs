//! HTTP client for the payment gateway's order API.

use async_trait::async_trait;
use deck_common::PaymentConfig;
use deck_core::traits::{PaymentGateway, RepoResult};
use deck_core::{DomainError, PaymentOrder};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};

/// Order client authenticated with the key id and secret (HTTP basic auth).
#[derive(Clone)]
pub struct HttpPaymentGateway {
    api_url: String,
    key_id: String,
    key_secret: String,
    http: Client,
}

impl HttpPaymentGateway {
    /// Create a client, or `None` when credentials are not configured.
    #[must_use]
    pub fn from_config(config: &PaymentConfig) -> Option<Self> {
        let (key_id, key_secret) = config.credentials()?;
        Some(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            key_id: key_id.to_string(),
            key_secret: key_secret.to_string(),
            http: Client::new(),
        })
    }
}

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Debug, Deserialize)]
struct OrderBody {
    id: String,
    amount: i64,
    currency: String,
    #[serde(default)]
    receipt: Option<String>,
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    #[instrument(skip(self))]
    async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> RepoResult<PaymentOrder> {
        let url = format!("{}/orders", self.api_url);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderBody {
                amount,
                currency,
                receipt,
            })
            .send()
            .await
            .map_err(|e| DomainError::GatewayError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!(%status, body = %text, "Order creation rejected by gateway");

            return Err(DomainError::GatewayError(format!(
                "order request failed with status {status}"
            )));
        }

        let order: OrderBody = response
            .json()
            .await
            .map_err(|e| DomainError::GatewayError(e.to_string()))?;

        Ok(PaymentOrder {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
            receipt: order.receipt.unwrap_or_else(|| receipt.to_string()),
        })
    }
}

impl std::fmt::Debug for HttpPaymentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPaymentGateway")
            .field("api_url", &self.api_url)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}
