//! Token authentication extractor.
//!
//! Clients authenticate with `Authorization: Token <key>`; `Bearer <key>` is
//! accepted as well. Keys are issued by `POST /user/token/`.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use crate::db::Store;
use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::services::AuthService;
use crate::state::AppState;

/// Authorization schemes accepted for API tokens.
const TOKEN_SCHEMES: [&str; 2] = ["Token", "Bearer"];

/// Extractor that requires a valid API token.
///
/// Rejects with 401 if the header is missing, malformed, or names an
/// unknown token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub User);

impl<S: Store> FromRequestParts<AppState<S>> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let key = token_from_headers(&parts.headers).ok_or_else(|| {
            AppError::Unauthorized("Authentication credentials were not provided.".to_owned())
        })?;

        let user = AuthService::new(state.store()).authenticate(key).await?;
        set_sentry_user(&user.id, Some(user.email.as_str()));

        Ok(Self(user))
    }
}

/// Extract the token key from the `Authorization` header.
fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, key) = value.trim().split_once(' ')?;
    let key = key.trim();
    (TOKEN_SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme)) && !key.is_empty())
        .then_some(key)
}
