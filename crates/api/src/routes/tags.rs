//! Tag route handlers. All require authentication and only ever touch the
//! caller's own tags.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use recipe_core::TagId;

use crate::db::{Store, TagRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{TagResponse, validate_name};
use crate::state::AppState;

use super::{ApiJson, ApiPath, ApiQuery, AssignedOnlyQuery};

/// Create/rename body.
#[derive(Debug, Deserialize)]
pub struct TagRequest {
    pub name: String,
}

/// List the caller's tags, name descending.
///
/// GET /recipe/tags/
///
/// # Errors
///
/// Returns 401 without a valid token.
pub async fn list<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(user): RequireAuth,
    ApiQuery(query): ApiQuery<AssignedOnlyQuery>,
) -> Result<Json<Vec<TagResponse>>> {
    let tags = state
        .store()
        .tags()
        .list(user.id, query.enabled()?)
        .await?;
    Ok(Json(tags.iter().map(TagResponse::from).collect()))
}

/// Create a tag.
///
/// POST /recipe/tags/
///
/// # Errors
///
/// Returns 400 for a blank or over-long name.
pub async fn create<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<TagRequest>,
) -> Result<(StatusCode, Json<TagResponse>)> {
    let name = validate_name("name", &body.name).map_err(AppError::BadRequest)?;
    let tag = state.store().tags().create(user.id, &name).await?;
    Ok((StatusCode::CREATED, Json(TagResponse::from(&tag))))
}

/// Rename a tag.
///
/// PATCH /recipe/tags/{id}/
///
/// # Errors
///
/// Returns 404 if the caller has no such tag.
pub async fn update<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<TagId>,
    ApiJson(body): ApiJson<TagRequest>,
) -> Result<Json<TagResponse>> {
    let name = validate_name("name", &body.name).map_err(AppError::BadRequest)?;
    let tag = state
        .store()
        .tags()
        .rename(user.id, id, &name)
        .await?
        .ok_or_else(|| AppError::NotFound("Not found.".to_owned()))?;
    Ok(Json(TagResponse::from(&tag)))
}

/// Delete a tag, detaching it from the caller's recipes.
///
/// DELETE /recipe/tags/{id}/
///
/// # Errors
///
/// Returns 404 if the caller has no such tag.
pub async fn destroy<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<TagId>,
) -> Result<StatusCode> {
    if !state.store().tags().delete(user.id, id).await? {
        return Err(AppError::NotFound("Not found.".to_owned()));
    }
    Ok(StatusCode::NO_CONTENT)
}
