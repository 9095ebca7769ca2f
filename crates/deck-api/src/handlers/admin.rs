//! Admin handlers
//!
//! Every handler takes [`AdminUser`], which re-reads the caller and checks
//! the live role.

use axum::{extract::State, Json};
use deck_core::AccountId;
use deck_service::dto::{
    AccountResponse, ActiveSessionResponse, CreateAccountRequest, ForceLogoutRequest,
    ForceLogoutResponse, ListAccountsQuery, PaginatedResponse, UserSessionResponse,
};
use deck_service::AdminService;

use crate::extractors::{AdminUser, IdPath, ValidatedJson, ValidatedQuery};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// POST /admin/force-logout
pub async fn force_logout(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidatedJson(request): ValidatedJson<ForceLogoutRequest>,
) -> ApiResult<Json<ForceLogoutResponse>> {
    let response = AdminService::new(state.service_context())
        .force_logout(&admin, request.user_id)
        .await?;
    Ok(Json(response))
}

/// GET /admin/user-session/:userId
pub async fn user_session(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    IdPath(user_id): IdPath<AccountId>,
) -> ApiResult<Json<UserSessionResponse>> {
    let response = AdminService::new(state.service_context())
        .user_session(user_id)
        .await?;
    Ok(Json(response))
}

/// GET /admin/active-sessions
pub async fn active_sessions(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> ApiResult<Json<Vec<ActiveSessionResponse>>> {
    let sessions = AdminService::new(state.service_context())
        .active_sessions()
        .await?;
    Ok(Json(sessions))
}

/// GET /admin/users?limit=&offset=
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    ValidatedQuery(query): ValidatedQuery<ListAccountsQuery>,
) -> ApiResult<Json<PaginatedResponse<AccountResponse>>> {
    let page = AdminService::new(state.service_context())
        .list_accounts(query)
        .await?;
    Ok(Json(page))
}

/// POST /admin/users
pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidatedJson(request): ValidatedJson<CreateAccountRequest>,
) -> ApiResult<Created<Json<AccountResponse>>> {
    let account = AdminService::new(state.service_context())
        .create_account(&admin, request)
        .await?;
    Ok(Created(Json(account)))
}

/// DELETE /admin/users/:userId
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    IdPath(user_id): IdPath<AccountId>,
) -> ApiResult<NoContent> {
    AdminService::new(state.service_context())
        .delete_account(&admin, user_id)
        .await?;
    Ok(NoContent)
}
