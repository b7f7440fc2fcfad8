//! Ingredient route handlers. All require authentication and only ever touch the
//! caller's own ingredients.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use recipe_core::IngredientId;

use crate::db::{IngredientRepository, Store};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{IngredientResponse, validate_name};
use crate::state::AppState;

use super::{ApiJson, ApiPath, ApiQuery, AssignedOnlyQuery};

/// Create/rename body.
#[derive(Debug, Deserialize)]
pub struct IngredientRequest {
    pub name: String,
}

/// List the caller's ingredients, name descending.
///
/// GET /recipe/ingredients/
///
/// # Errors
///
/// Returns 401 without a valid token.
pub async fn list<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(user): RequireAuth,
    ApiQuery(query): ApiQuery<AssignedOnlyQuery>,
) -> Result<Json<Vec<IngredientResponse>>> {
    let ingredients = state
        .store()
        .ingredients()
        .list(user.id, query.enabled()?)
        .await?;
    Ok(Json(ingredients.iter().map(IngredientResponse::from).collect()))
}

/// Create an ingredient.
///
/// POST /recipe/ingredients/
///
/// # Errors
///
/// Returns 400 for a blank or over-long name.
pub async fn create<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<IngredientRequest>,
) -> Result<(StatusCode, Json<IngredientResponse>)> {
    let name = validate_name("name", &body.name).map_err(AppError::BadRequest)?;
    let ingredient = state.store().ingredients().create(user.id, &name).await?;
    let body = IngredientResponse::from(&ingredient);
    Ok((StatusCode::CREATED, Json(body)))
}

/// Rename an ingredient.
///
/// PATCH /recipe/ingredients/{id}/
///
/// # Errors
///
/// Returns 404 if the caller has no such ingredient.
pub async fn update<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<IngredientId>,
    ApiJson(body): ApiJson<IngredientRequest>,
) -> Result<Json<IngredientResponse>> {
    let name = validate_name("name", &body.name).map_err(AppError::BadRequest)?;
    let ingredient = state
        .store()
        .ingredients()
        .rename(user.id, id, &name)
        .await?
        .ok_or_else(|| AppError::NotFound("Not found.".to_owned()))?;
    Ok(Json(IngredientResponse::from(&ingredient)))
}

/// Delete an ingredient, removing it from the caller's recipes.
///
/// DELETE /recipe/ingredients/{id}/
///
/// # Errors
///
/// Returns 404 if the caller has no such ingredient.
pub async fn destroy<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<IngredientId>,
) -> Result<StatusCode> {
    if !state.store().ingredients().delete(user.id, id).await? {
        return Err(AppError::NotFound("Not found.".to_owned()));
    }
    Ok(StatusCode::NO_CONTENT)
}
