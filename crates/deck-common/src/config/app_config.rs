//! Application configuration structs
//!
//! Loads configuration from environment variables (and `.env` when present).
//! Resolved once at startup; required values fail fast.

use deck_core::DeviceLockPolicy;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub session: SessionConfig,
    pub payment: PaymentConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

/// Listen address
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Bound on acquiring a pooled connection
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Server-side `statement_timeout`
    #[serde(default = "default_statement_timeout")]
    pub statement_timeout_secs: u64,
}

/// Bearer token configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_paid_token_ttl")]
    pub paid_token_ttl: i64,
    #[serde(default = "default_free_token_ttl")]
    pub free_token_ttl: i64,
}

/// Server-side session and device-lock settings
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_ttl")]
    pub ttl: i64,
    /// Seconds of inactivity after which a session stops validating
    #[serde(default)]
    pub idle_timeout: Option<i64>,
    #[serde(default)]
    pub device_lock_policy: DeviceLockPolicy,
    #[serde(default = "default_login_history_limit")]
    pub login_history_limit: usize,
}

/// Payment gateway settings. Payment flows are disabled without credentials.
#[derive(Clone, Deserialize)]
pub struct PaymentConfig {
    pub key_id: Option<String>,
    pub key_secret: Option<String>,
    #[serde(default = "default_payment_api_url")]
    pub api_url: String,
    /// Price in minor currency units
    #[serde(default = "default_payment_amount")]
    pub amount: i64,
    #[serde(default = "default_payment_currency")]
    pub currency: String,
}

impl PaymentConfig {
    /// Key id and secret, when both are configured
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.key_id.as_deref(), self.key_secret.as_deref()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Some((id, secret)),
            _ => None,
        }
    }
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("key_id", &self.key_id)
            .field("api_url", &self.api_url)
            .field("amount", &self.amount)
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

// Default value functions
fn default_app_name() -> String {
    "studydeck".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_statement_timeout() -> u64 {
    45
}

/// Upper bound for token and session lifetimes (ten years)
const MAX_LIFETIME_SECS: i64 = 315_360_000;

fn default_paid_token_ttl() -> i64 {
    1_900_800 // 22 days
}

fn default_free_token_ttl() -> i64 {
    2_592_000 // 30 days
}

fn default_session_ttl() -> i64 {
    1_900_800 // 22 days
}

fn default_login_history_limit() -> usize {
    10
}

fn default_payment_api_url() -> String {
    "https://api.razorpay.com/v1".to_string()
}

fn default_payment_amount() -> i64 {
    49_900
}

fn default_payment_currency() -> String {
    "INR".to_string()
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

/// Typed view over a variable source
struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Non-empty value, if set
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.get(name).ok_or(ConfigError::MissingVar(name))
    }

    fn parse<T: FromStr>(&self, name: &'static str) -> Result<Option<T>, ConfigError> {
        self.get(name)
            .map(|raw| {
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(name, raw.clone()))
            })
            .transpose()
    }

    fn parse_or<T: FromStr>(&self, name: &'static str, default: fn() -> T) -> Result<T, ConfigError> {
        Ok(self.parse(name)?.unwrap_or_else(default))
    }

    /// Lifetime in seconds, within `1..=MAX_LIFETIME_SECS`
    fn lifetime(&self, name: &'static str) -> Result<Option<i64>, ConfigError> {
        match self.parse::<i64>(name)? {
            Some(secs) if !(1..=MAX_LIFETIME_SECS).contains(&secs) => Err(
                ConfigError::InvalidValue(name, format!("{secs} (expected 1..={MAX_LIFETIME_SECS} seconds)")),
            ),
            secs => Ok(secs),
        }
    }

    fn lifetime_or(&self, name: &'static str, default: fn() -> i64) -> Result<i64, ConfigError> {
        Ok(self.lifetime(name)?.unwrap_or_else(default))
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or
    /// a value cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source
    ///
    /// # Errors
    /// Same as [`AppConfig::from_env`]
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let jwt_secret = vars.required("JWT_SECRET")?;

        Ok(Self {
            app: AppSettings {
                name: vars.get("APP_NAME").unwrap_or_else(default_app_name),
                env: vars.parse("APP_ENV")?.unwrap_or_default(),
            },
            api: ServerConfig {
                host: vars.get("API_HOST").unwrap_or_else(default_host),
                port: vars
                    .parse("API_PORT")?
                    .ok_or(ConfigError::MissingVar("API_PORT"))?,
            },
            database: DatabaseConfig {
                url: vars.required("DATABASE_URL")?,
                max_connections: vars
                    .parse_or("DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: vars
                    .parse_or("DATABASE_MIN_CONNECTIONS", default_min_connections)?,
                connect_timeout_secs: vars
                    .parse_or("DATABASE_CONNECT_TIMEOUT_SECS", default_connect_timeout)?,
                statement_timeout_secs: vars
                    .parse_or("DATABASE_STATEMENT_TIMEOUT_SECS", default_statement_timeout)?,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                paid_token_ttl: vars.lifetime_or("JWT_PAID_TOKEN_TTL", default_paid_token_ttl)?,
                free_token_ttl: vars.lifetime_or("JWT_FREE_TOKEN_TTL", default_free_token_ttl)?,
            },
            session: SessionConfig {
                ttl: vars.lifetime_or("SESSION_TTL", default_session_ttl)?,
                idle_timeout: vars.lifetime("SESSION_IDLE_TIMEOUT")?,
                device_lock_policy: vars.parse("DEVICE_LOCK_POLICY")?.unwrap_or_default(),
                login_history_limit: vars
                    .parse_or("LOGIN_HISTORY_LIMIT", default_login_history_limit)?,
            },
            payment: PaymentConfig {
                key_id: vars.get("PAYMENT_KEY_ID"),
                key_secret: vars.get("PAYMENT_KEY_SECRET"),
                api_url: vars
                    .get("PAYMENT_API_URL")
                    .unwrap_or_else(default_payment_api_url),
                amount: vars.parse_or("PAYMENT_AMOUNT", default_payment_amount)?,
                currency: vars
                    .get("PAYMENT_CURRENCY")
                    .unwrap_or_else(default_payment_currency),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: vars
                    .parse_or("RATE_LIMIT_REQUESTS_PER_SECOND", default_requests_per_second)?,
                burst: vars.parse_or("RATE_LIMIT_BURST", default_burst)?,
            },
            cors: CorsConfig {
                allowed_origins: vars
                    .get("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
