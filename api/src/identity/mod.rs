use axum::http::{StatusCode, header::AUTHORIZATION, request::Parts};

use crate::{
    App,
    error::{ApiRequestError, AppError},
};

use self::models::identity::Identity;

pub mod models;

pub const COOKIE_NAME: &str = "auth_token";

#[derive(thiserror::Error, Debug)]
pub enum AuthenticationError {
    #[error(
        "Authentication required, but neither a cookie `{COOKIE_NAME}` nor a bearer token \
         was found in headers."
    )]
    NoCredentials,

    #[error(
        "Unauthorized, please check if you're logged in by refreshing the \
         page. This could be due to an expired session or token has became invalid."
    )]
    Unauthorized,
}

impl ApiRequestError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthenticationError::NoCredentials => StatusCode::BAD_REQUEST,
            AuthenticationError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

/// The session token sent by the client. Browsers send the cookie, web service
/// clients send `Authorization: Bearer <token>`.
fn session_token(parts: &Parts) -> Option<String> {
    let jar = axum_extra::extract::cookie::CookieJar::from_headers(&parts.headers);
    if let Some(t) = jar.get(COOKIE_NAME) {
        return Some(t.value().to_string());
    }

    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

pub struct MaybeAuthUser(pub Result<Identity, AuthenticationError>);

impl axum::extract::FromRequestParts<App> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &App) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(parts) else {
            return Ok(MaybeAuthUser(Err(AuthenticationError::NoCredentials)));
        };

        let identity = state.access.identity_for_token(&token).await?;

        Ok(MaybeAuthUser(
            identity.ok_or(AuthenticationError::Unauthorized),
        ))
    }
}

pub struct AuthUser(pub Identity);

impl axum::extract::FromRequestParts<App> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &App) -> Result<Self, Self::Rejection> {
        let MaybeAuthUser(auth_user) = MaybeAuthUser::from_request_parts(parts, state).await?;

        Ok(AuthUser(auth_user?))
    }
}
