use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};

use crate::{error::AppError, App};

use self::models::user::User;

pub mod models;

pub const COOKIE_NAME: &str = "auth_token";
pub const TOKEN_HEADER: &str = "x-auth-token";

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum AuthenticationError {
    #[error("No token, authorization denied")]
    NoToken,

    #[error("Token is not valid")]
    InvalidToken,
}

impl From<AuthenticationError> for AppError {
    fn from(e: AuthenticationError) -> Self {
        match e {
            AuthenticationError::NoToken => AppError::Unauthorized("No token, authorization denied"),
            AuthenticationError::InvalidToken => AppError::Unauthorized("Token is not valid"),
        }
    }
}

/// Finds the session token in, by order of preference, a bearer
/// `Authorization` header, the `x-auth-token` header or the auth cookie.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let header = headers
        .get(TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(t) = bearer.or(header) {
        return Some(t.to_owned());
    }

    let jar = axum_extra::extract::cookie::CookieJar::from_headers(headers);
    jar.get(COOKIE_NAME)
        .map(|c| c.value().to_owned())
        .filter(|t| !t.is_empty())
}

/// The authenticated actor of a request. Rejects with 401 when the request
/// carries no token or the token does not resolve to a live session.
pub struct AuthUser(pub User);

impl axum::extract::FromRequestParts<App> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &App) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(AuthenticationError::NoToken)?;

        let user = state
            .store
            .find_user_by_token(&token)
            .await?
            .ok_or(AuthenticationError::InvalidToken)?;

        Ok(AuthUser(user))
    }
}
