//! Route definitions
//!
//! Paths are mounted at the root. Health probes are exported separately so
//! they bypass rate limiting.

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers::{admin, auth, content, health, payment};
use crate::state::AppState;

/// Application routes, excluding health probes
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(payment_routes())
        .merge(admin_routes())
        .merge(content_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/signup", post(auth::signup))
        .route("/create-free-session", post(auth::create_free_session))
        .route("/me", get(auth::me))
}

fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/payment/create-order", post(payment::create_order))
        .route("/payment/verify-payment", post(payment::verify_payment))
        .route(
            "/payment/check-premium/:username",
            get(payment::check_premium),
        )
        .route("/payment/refresh-token", post(payment::refresh_token))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/force-logout", post(admin::force_logout))
        .route("/admin/user-session/:user_id", get(admin::user_session))
        .route("/admin/active-sessions", get(admin::active_sessions))
        .route("/admin/users", get(admin::list_users).post(admin::create_user))
        .route("/admin/users/:user_id", delete(admin::delete_user))
}

fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/topics", get(content::list_topics))
        .route("/topics/:topic_id", get(content::get_topic))
        .route("/chapters/:chapter_id", get(content::get_chapter))
}
