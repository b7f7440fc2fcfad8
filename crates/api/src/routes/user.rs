//! User account route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::db::Store;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::UserResponse;
use crate::services::AuthService;
use crate::state::AppState;

use super::ApiJson;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

/// Token request body.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

/// Token response body.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Profile update body. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMeRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Register a new user.
///
/// POST /user/create/
///
/// # Errors
///
/// Returns 400 for an invalid email, a short password, or a taken email.
pub async fn create<S: Store>(
    State(state): State<AppState<S>>,
    ApiJson(body): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let user = AuthService::new(state.store())
        .register(&body.email, &body.password, &body.name)
        .await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// Exchange email and password for an API token.
///
/// POST /user/token/
///
/// # Errors
///
/// Returns 400 if the credentials do not match an active user.
pub async fn token<S: Store>(
    State(state): State<AppState<S>>,
    ApiJson(body): ApiJson<TokenRequest>,
) -> Result<Json<TokenResponse>> {
    let token = AuthService::new(state.store())
        .issue_token(&body.email, &body.password)
        .await?;
    Ok(Json(TokenResponse { token }))
}

/// The authenticated user's profile.
///
/// GET /user/me/
pub async fn me(RequireAuth(user): RequireAuth) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

/// Update the authenticated user's name and/or password.
///
/// PATCH /user/me/
///
/// # Errors
///
/// Returns 400 if the new password is too short or the name too long.
pub async fn update_me<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<UpdateMeRequest>,
) -> Result<Json<UserResponse>> {
    let updated = AuthService::new(state.store())
        .update_profile(&user, body.name.as_deref(), body.password.as_deref())
        .await?;
    Ok(Json(UserResponse::from(&updated)))
}
