//! Authentication extractors
//!
//! The bearer token is read from the `token` cookie, falling back to an
//! `Authorization: Bearer` header. A missing, expired or forged token is
//! treated as an anonymous caller; handlers that need an identity ask the
//! service layer to require one.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    extract::cookie::CookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use deck_common::Claims;
use deck_core::Account;
use deck_service::AccessService;
use std::convert::Infallible;
use tracing::debug;

use crate::cookies::{self, SESSION_COOKIE, TOKEN_COOKIE};
use crate::response::ApiError;
use crate::state::AppState;

/// Verified token claims, if any (weak authentication)
#[derive(Debug, Clone)]
pub struct MaybeClaims(pub Option<Claims>);

impl MaybeClaims {
    pub fn claims(&self) -> Option<&Claims> {
        self.0.as_ref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeClaims
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = match cookies::read(&jar, TOKEN_COOKIE) {
            Some(token) => Some(token),
            None => TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .ok()
                .map(|TypedHeader(Authorization(bearer))| bearer.token().to_string()),
        };

        let Some(token) = token else {
            return Ok(MaybeClaims(None));
        };

        let app_state = AppState::from_ref(state);
        let claims = app_state.token_service().verify(&token);
        if claims.is_none() {
            debug!("Ignoring invalid or expired token");
        }

        Ok(MaybeClaims(claims))
    }
}

/// Value of the `sessionToken` cookie, if any
#[derive(Debug, Clone)]
pub struct SessionCookie(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for SessionCookie
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(SessionCookie(cookies::read(&jar, SESSION_COOKIE)))
    }
}

/// Caller whose live role is admin, presenting a non-trial token
#[derive(Debug, Clone)]
pub struct AdminUser(pub Account);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(maybe) = MaybeClaims::from_request_parts(parts, state).await;
        let app_state = AppState::from_ref(state);

        let account = AccessService::new(app_state.service_context())
            .require_admin(maybe.claims())
            .await?;

        Ok(AdminUser(account))
    }
}
