//! Authentication handlers
//!
//! Login, logout, signup, trial tokens and the caller snapshot.

use axum::{extract::State, response::IntoResponse, Json};
use deck_service::dto::{
    AccountResponse, AuthResponse, LoginRequest, MeResponse, SignupRequest, UsernameRequest,
};
use deck_service::{AccessService, AuthService};

use crate::cookies::{self, SetCookies};
use crate::extractors::{ClientContext, MaybeClaims, SessionCookie, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Login with username and password
///
/// POST /login
pub async fn login(
    State(state): State<AppState>,
    ClientContext(client): ClientContext,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<(SetCookies, Json<AuthResponse>)> {
    let credentials = AuthService::new(state.service_context())
        .login(request, &client)
        .await?;

    Ok((
        cookies::issue(&credentials, state.secure_cookies()),
        Json(credentials.response()),
    ))
}

/// Clear the server session (when the session cookie matches) and both cookies
///
/// GET /logout
pub async fn logout(
    State(state): State<AppState>,
    claims: MaybeClaims,
    SessionCookie(session_token): SessionCookie,
) -> ApiResult<impl IntoResponse> {
    AuthService::new(state.service_context())
        .logout(claims.claims(), session_token.as_deref())
        .await?;

    Ok((
        cookies::clear(state.secure_cookies()),
        Json(serde_json::json!({ "logged_out": true })),
    ))
}

/// Create a free account
///
/// POST /signup
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> ApiResult<Created<Json<AccountResponse>>> {
    let account = AuthService::new(state.service_context())
        .signup(request)
        .await?;
    Ok(Created(Json(account)))
}

/// Issue a trial token for an existing account
///
/// POST /create-free-session
pub async fn create_free_session(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<UsernameRequest>,
) -> ApiResult<(SetCookies, Json<AuthResponse>)> {
    let credentials = AuthService::new(state.service_context())
        .create_free_session(&request.username)
        .await?;

    Ok((
        cookies::issue(&credentials, state.secure_cookies()),
        Json(credentials.response()),
    ))
}

/// Caller snapshot
///
/// GET /me
pub async fn me(
    State(state): State<AppState>,
    claims: MaybeClaims,
    SessionCookie(session_token): SessionCookie,
    ClientContext(client): ClientContext,
) -> ApiResult<Json<MeResponse>> {
    let snapshot = AccessService::new(state.service_context())
        .me(claims.claims(), session_token.as_deref(), &client.fingerprint)
        .await?;
    Ok(Json(snapshot))
}
