//! Server setup and initialization
//!
//! Wires the PostgreSQL stores, the payment gateway and the service context
//! into an Axum application, and runs it.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use deck_common::{AppConfig, AppError};
use deck_db::{apply_schema, create_pool, PgAccountRepository, PgContentRepository, PoolConfig};
use deck_service::{HttpPaymentGateway, ServiceContext};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::apply_middleware;
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let config = state.config();
    let api = apply_middleware(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    );

    api.merge(health_routes()).with_state(state)
}

/// Connect the stores and build the service context
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&PoolConfig::from(&config.database))
        .await
        .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;
    apply_schema(&pool)
        .await
        .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;
    info!("PostgreSQL connection established");

    let mut builder = ServiceContext::builder()
        .config(&config)
        .account_repo(Arc::new(PgAccountRepository::new(pool.clone())))
        .content_repo(Arc::new(PgContentRepository::new(pool)));

    match HttpPaymentGateway::from_config(&config.payment) {
        Some(gateway) => {
            info!(api_url = %config.payment.api_url, "Payment gateway configured");
            builder = builder.payment_gateway(Arc::new(gateway));
        }
        None => warn!("Payment credentials not set; payment endpoints will answer 503"),
    }

    let service_context = builder.build()?;

    Ok(AppState::new(service_context, config))
}

/// Serve `app` on `addr`. Peer addresses are exposed to handlers through
/// `ConnectInfo`.
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::internal(anyhow::anyhow!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config.api.address().parse().map_err(|e| {
        AppError::validation(format!("Invalid listen address {}: {e}", config.api.address()))
    })?;

    let state = create_app_state(config).await?;
    let app = create_app(state);

    run_server(app, addr).await
}
