//! Study deck API server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p deck-api
//! ```
//!
//! Configuration is read from the environment (and `.env` if present).
//! Missing required values abort startup.

use deck_common::{try_init_tracing, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load configuration before tracing so the log format follows APP_ENV
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        name = %config.app.name,
        env = ?config.app.env,
        port = config.api.port,
        "Configuration loaded"
    );

    if let Err(e) = deck_api::run(config).await {
        error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}
