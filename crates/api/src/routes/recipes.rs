//! Recipe route handlers. All require authentication and only ever touch the
//! caller's own recipes.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde::Deserialize;

use recipe_core::{IngredientId, Price, RecipeId, TagId};

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{
    NewRecipe, RecipeDetailResponse, RecipeFilter, RecipeImageResponse, RecipeResponse,
    RecipeUpdate,
};
use crate::services::RecipeService;
use crate::state::AppState;

use super::{ApiJson, ApiPath, ApiQuery};

/// Multipart field that carries the image.
const IMAGE_FIELD: &str = "image";

/// Create/replace body.
#[derive(Debug, Deserialize)]
pub struct RecipeRequest {
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub tags: Vec<TagId>,
    #[serde(default)]
    pub ingredients: Vec<IngredientId>,
}

impl From<RecipeRequest> for NewRecipe {
    fn from(body: RecipeRequest) -> Self {
        Self {
            title: body.title,
            time_minutes: body.time_minutes,
            price: body.price,
            link: body.link,
            tag_ids: body.tags,
            ingredient_ids: body.ingredients,
        }
    }
}

/// Partial update body.
#[derive(Debug, Default, Deserialize)]
pub struct RecipePatchRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Price>,
    pub link: Option<String>,
    pub tags: Option<Vec<TagId>>,
    pub ingredients: Option<Vec<IngredientId>>,
}

impl From<RecipePatchRequest> for RecipeUpdate {
    fn from(body: RecipePatchRequest) -> Self {
        Self {
            title: body.title,
            time_minutes: body.time_minutes,
            price: body.price,
            link: body.link,
            tag_ids: body.tags,
            ingredient_ids: body.ingredients,
        }
    }
}

/// List filter query: comma-separated IDs.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    pub tags: Option<String>,
    pub ingredients: Option<String>,
}

impl RecipeListQuery {
    /// Parse into a [`RecipeFilter`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if an ID is not an integer.
    pub fn filter(&self) -> Result<RecipeFilter> {
        Ok(RecipeFilter {
            tag_ids: parse_id_list("tags", self.tags.as_deref())?,
            ingredient_ids: parse_id_list("ingredients", self.ingredients.as_deref())?,
        })
    }
}

/// Parse `"1,2,3"` into IDs. Empty segments are skipped.
fn parse_id_list<T: FromStr>(param: &str, raw: Option<&str>) -> Result<Vec<T>> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<T>()
                .map_err(|_| AppError::BadRequest(format!("{param}: {s:?} is not a valid id")))
        })
        .collect()
}

/// List the caller's recipes, newest first.
///
/// GET /recipe/recipes/
///
/// # Errors
///
/// Returns 400 for a malformed filter.
pub async fn list<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(user): RequireAuth,
    ApiQuery(query): ApiQuery<RecipeListQuery>,
) -> Result<Json<Vec<RecipeResponse>>> {
    let filter = query.filter()?;
    let recipes = RecipeService::new(state.store(), state.media(), user.id)
        .list(&filter)
        .await?;
    Ok(Json(recipes.iter().map(RecipeResponse::from).collect()))
}

/// Create a recipe.
///
/// POST /recipe/recipes/
///
/// # Errors
///
/// Returns 400 for invalid fields or tags/ingredients the caller does not own.
pub async fn create<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<RecipeRequest>,
) -> Result<(StatusCode, Json<RecipeResponse>)> {
    let recipe = RecipeService::new(state.store(), state.media(), user.id)
        .create(body.into())
        .await?;
    Ok((StatusCode::CREATED, Json(RecipeResponse::from(&recipe))))
}

/// Recipe detail with nested tags and ingredients.
///
/// GET /recipe/recipes/{id}/
///
/// # Errors
///
/// Returns 404 if the caller has no such recipe.
pub async fn show<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<RecipeId>,
) -> Result<Json<RecipeDetailResponse>> {
    let detail = RecipeService::new(state.store(), state.media(), user.id)
        .detail(id)
        .await?;
    Ok(Json(detail))
}

/// Replace a recipe.
///
/// PUT /recipe/recipes/{id}/
///
/// # Errors
///
/// Returns 404 if the caller has no such recipe, 400 for invalid fields.
pub async fn replace<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<RecipeId>,
    ApiJson(body): ApiJson<RecipeRequest>,
) -> Result<Json<RecipeResponse>> {
    let recipe = RecipeService::new(state.store(), state.media(), user.id)
        .replace(id, body.into())
        .await?;
    Ok(Json(RecipeResponse::from(&recipe)))
}

/// Partially update a recipe.
///
/// PATCH /recipe/recipes/{id}/
///
/// # Errors
///
/// Returns 404 if the caller has no such recipe, 400 for invalid fields.
pub async fn update<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<RecipeId>,
    ApiJson(body): ApiJson<RecipePatchRequest>,
) -> Result<Json<RecipeResponse>> {
    let recipe = RecipeService::new(state.store(), state.media(), user.id)
        .update(id, body.into())
        .await?;
    Ok(Json(RecipeResponse::from(&recipe)))
}

/// Delete a recipe.
///
/// DELETE /recipe/recipes/{id}/
///
/// # Errors
///
/// Returns 404 if the caller has no such recipe.
pub async fn destroy<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<RecipeId>,
) -> Result<StatusCode> {
    RecipeService::new(state.store(), state.media(), user.id)
        .delete(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Upload an image for a recipe.
///
/// POST /recipe/recipes/{id}/upload-image/
///
/// Expects `multipart/form-data` with the file in the `image` field.
///
/// # Errors
///
/// Returns 400 if the field is missing or the file name has no usable
/// extension, 404 if the caller has no such recipe.
pub async fn upload_image<S: Store>(
    State(state): State<AppState<S>>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<RecipeId>,
    mut multipart: Multipart,
) -> Result<Json<RecipeImageResponse>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_owned)
            .ok_or_else(|| AppError::BadRequest("image: no file was submitted.".to_owned()))?;
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(AppError::BadRequest(
                "image: the submitted file is empty.".to_owned(),
            ));
        }

        let recipe = RecipeService::new(state.store(), state.media(), user.id)
            .upload_image(id, &filename, &bytes)
            .await?;
        return Ok(Json(RecipeImageResponse::from(&recipe)));
    }

    Err(AppError::BadRequest("image: no file was submitted.".to_owned()))
}
