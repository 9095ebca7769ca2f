//! Test helpers for integration tests
//!
//! [`TestServer`] runs the real router on an ephemeral port. [`Browser`]
//! plays one client device: it keeps the cookies the server sets and sends
//! them back, the way a browser would.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use deck_api::{create_app, AppState};
use deck_common::{AppConfig, PasswordService, PaymentSignatureVerifier};
use deck_core::traits::{PaymentGateway, RepoResult};
use deck_core::{Account, AccountId, AccountRepository, PaymentOrder, Role};
use deck_db::{MemoryAccountRepository, MemoryContentRepository};
use deck_service::ServiceContext;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Payment key secret configured on every test server
pub const PAYMENT_KEY_SECRET: &str = "s3cret";

/// Gateway that hands out sequential order ids without network access
#[derive(Default)]
pub struct FakeGateway {
    next: AtomicU64,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> RepoResult<PaymentOrder> {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(PaymentOrder {
            id: format!("order_{n}"),
            amount,
            currency: currency.to_string(),
            receipt: receipt.to_string(),
        })
    }
}

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub accounts: Arc<MemoryAccountRepository>,
    pub content: Arc<MemoryContentRepository>,
    client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(&[]).await
    }

    /// Start with extra or overriding environment variables
    pub async fn start_with(overrides: &[(&str, &str)]) -> Result<Self> {
        let config = test_config(overrides)?;

        let accounts = Arc::new(MemoryAccountRepository::new());
        let content = Arc::new(MemoryContentRepository::new());
        let ctx = ServiceContext::builder()
            .config(&config)
            .account_repo(accounts.clone())
            .content_repo(content.clone())
            .payment_gateway(Arc::new(FakeGateway::default()))
            .build()
            .map_err(|e| anyhow::anyhow!("Service context: {e}"))?;

        let app = create_app(AppState::new(ctx, config));

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            accounts,
            content,
            client,
            _handle: handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A fresh client device with no cookies
    pub fn browser(&self, user_agent: &str) -> Browser<'_> {
        Browser {
            server: self,
            user_agent: user_agent.to_string(),
            cookies: HashMap::new(),
        }
    }

    /// Signature the gateway would attach to a successful payment
    pub fn sign_payment(order_id: &str, payment_id: &str) -> Result<String> {
        PaymentSignatureVerifier::new(PAYMENT_KEY_SECRET)
            .sign(order_id, payment_id)
            .ok_or_else(|| anyhow::anyhow!("Failed to sign payment"))
    }

    /// Insert an admin account directly into the store
    pub async fn seed_admin(&self, username: &str, password: &str) -> Result<Account> {
        let admin = Account::new(
            AccountId::generate(),
            username.to_string(),
            format!("{username}@admin.test"),
        )
        .with_role(Role::Admin);

        let hash = PasswordService::new()
            .hash(password)
            .map_err(|e| anyhow::anyhow!("Hash: {e}"))?;
        self.accounts.create(&admin, &hash).await?;
        Ok(admin)
    }
}

/// One client device with its own cookie jar
pub struct Browser<'a> {
    server: &'a TestServer,
    user_agent: String,
    cookies: HashMap<String, String>,
}

impl Browser<'_> {
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Overwrite a cookie, e.g. to replay a stale one
    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    pub async fn get(&mut self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.server.base_url(), path);
        let request = self.server.client.get(url);
        self.send(request).await
    }

    pub async fn post<T: Serialize>(&mut self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.server.base_url(), path);
        let request = self.server.client.post(url).json(body);
        self.send(request).await
    }

    pub async fn delete(&mut self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.server.base_url(), path);
        let request = self.server.client.delete(url);
        self.send(request).await
    }

    async fn send(&mut self, request: RequestBuilder) -> Result<Response> {
        let mut request = request
            .header(header::USER_AGENT, &self.user_agent)
            .header(header::ACCEPT_LANGUAGE, "en-US");

        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            request = request.header(header::COOKIE, cookie);
        }

        let response = request.send().await?;
        self.absorb(&response);
        Ok(response)
    }

    fn absorb(&mut self, response: &Response) {
        for value in response.headers().get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let Some((name, rest)) = value.split_once('=') else {
                continue;
            };
            let cookie_value = rest.split(';').next().unwrap_or_default();

            if value.contains("Max-Age=0") || cookie_value.is_empty() {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), cookie_value.to_string());
            }
        }
    }
}

/// Configuration for an in-memory test server
pub fn test_config(overrides: &[(&str, &str)]) -> Result<AppConfig> {
    let mut vars: HashMap<String, String> = [
        ("API_PORT", "0"),
        ("DATABASE_URL", "memory://"),
        ("JWT_SECRET", "integration-test-secret"),
        ("PAYMENT_KEY_ID", "key_test"),
        ("PAYMENT_KEY_SECRET", PAYMENT_KEY_SECRET),
        ("RATE_LIMIT_BURST", "1000"),
        ("RATE_LIMIT_REQUESTS_PER_SECOND", "1000"),
    ]
    .iter()
    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
    .collect();

    for (k, v) in overrides {
        vars.insert((*k).to_string(), (*v).to_string());
    }

    AppConfig::from_lookup(|name| vars.get(name).cloned())
        .map_err(|e| anyhow::anyhow!("Config error: {e}"))
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}

/// Assert an error response with the given status and error code
pub async fn assert_error(
    response: Response,
    expected_status: StatusCode,
    expected_code: &str,
) -> Result<serde_json::Value> {
    let body: serde_json::Value = assert_json(response, expected_status).await?;
    let code = body["error"]["code"].as_str().unwrap_or_default();
    if code != expected_code {
        anyhow::bail!("Expected error code {expected_code}, got {code}. Body: {body}");
    }
    Ok(body)
}
