//! Payment handlers

use axum::{
    extract::{Path, State},
    Json,
};
use deck_service::dto::{
    AuthResponse, OrderResponse, PremiumStatusResponse, UsernameRequest, VerifyPaymentRequest,
};
use deck_service::PaymentService;

use crate::cookies::{self, SetCookies};
use crate::extractors::{ClientContext, MaybeClaims, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// POST /payment/create-order
pub async fn create_order(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<UsernameRequest>,
) -> ApiResult<Json<OrderResponse>> {
    let order = PaymentService::new(state.service_context())
        .create_order(&request.username)
        .await?;
    Ok(Json(order))
}

/// Verify a gateway payment signature, extend the subscription and issue
/// fresh credentials. The signature is the only authentication.
///
/// POST /payment/verify-payment
pub async fn verify_payment(
    State(state): State<AppState>,
    ClientContext(client): ClientContext,
    ValidatedJson(request): ValidatedJson<VerifyPaymentRequest>,
) -> ApiResult<(SetCookies, Json<AuthResponse>)> {
    let credentials = PaymentService::new(state.service_context())
        .verify_payment(request, &client)
        .await?;

    Ok((
        cookies::issue(&credentials, state.secure_cookies()),
        Json(credentials.response()),
    ))
}

/// GET /payment/check-premium/:username
pub async fn check_premium(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<PremiumStatusResponse>> {
    let status = PaymentService::new(state.service_context())
        .check_premium(&username)
        .await?;
    Ok(Json(status))
}

/// Re-read live state and reissue token and session cookies for the caller
///
/// POST /payment/refresh-token
pub async fn refresh_token(
    State(state): State<AppState>,
    claims: MaybeClaims,
    ClientContext(client): ClientContext,
    ValidatedJson(request): ValidatedJson<UsernameRequest>,
) -> ApiResult<(SetCookies, Json<AuthResponse>)> {
    let credentials = PaymentService::new(state.service_context())
        .refresh_token(&request.username, claims.claims(), &client)
        .await?;

    Ok((
        cookies::issue(&credentials, state.secure_cookies()),
        Json(credentials.response()),
    ))
}
