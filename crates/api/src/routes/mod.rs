//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # User
//! POST   /user/create/                       - Register
//! POST   /user/token/                        - Exchange credentials for a token
//! GET    /user/me/                           - Own profile
//! PATCH  /user/me/                           - Update own name/password
//!
//! # Tags and ingredients (requires auth)
//! GET    /recipe/tags/                       - List (?assigned_only=1)
//! POST   /recipe/tags/                       - Create
//! PATCH  /recipe/tags/{id}/                  - Rename
//! DELETE /recipe/tags/{id}/                  - Delete
//! (same for /recipe/ingredients/)
//!
//! # Recipes (requires auth)
//! GET    /recipe/recipes/                    - List (?tags=1,2&ingredients=3)
//! POST   /recipe/recipes/                    - Create
//! GET    /recipe/recipes/{id}/               - Detail
//! PUT    /recipe/recipes/{id}/               - Replace
//! PATCH  /recipe/recipes/{id}/               - Partial update
//! DELETE /recipe/recipes/{id}/               - Delete
//! POST   /recipe/recipes/{id}/upload-image/  - Upload image (multipart "image")
//! ```

pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod user;

use axum::{
    Router,
    extract::{FromRequest, FromRequestParts},
    routing::{get, patch, post},
};
use serde::Deserialize;

use crate::db::Store;
use crate::error::AppError;
use crate::state::AppState;

/// JSON body extractor whose rejections use the API error format.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path extractor; an unparseable ID is reported as not found.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Query string extractor whose rejections use the API error format.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// `?assigned_only=` flag shared by the tag and ingredient lists.
#[derive(Debug, Default, Deserialize)]
pub struct AssignedOnlyQuery {
    pub assigned_only: Option<String>,
}

impl AssignedOnlyQuery {
    /// Interpret the flag: `1`/`true` enable it, `0`/`false`/absent do not.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for any other value.
    pub fn enabled(&self) -> Result<bool, AppError> {
        match self.assigned_only.as_deref().map(str::trim) {
            None | Some("" | "0" | "false") => Ok(false),
            Some("1" | "true") => Ok(true),
            Some(other) => Err(AppError::BadRequest(format!(
                "assigned_only must be 0 or 1, got {other:?}"
            ))),
        }
    }
}

/// Create the user routes router.
pub fn user_routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/create/", post(user::create::<S>))
        .route("/token/", post(user::token::<S>))
        .route("/me/", get(user::me).patch(user::update_me::<S>))
}

/// Create the recipe app routes router (tags, ingredients, recipes).
pub fn recipe_routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/tags/", get(tags::list::<S>).post(tags::create::<S>))
        .route(
            "/tags/{id}/",
            patch(tags::update::<S>).delete(tags::destroy::<S>),
        )
        .route(
            "/ingredients/",
            get(ingredients::list::<S>).post(ingredients::create::<S>),
        )
        .route(
            "/ingredients/{id}/",
            patch(ingredients::update::<S>).delete(ingredients::destroy::<S>),
        )
        .route(
            "/recipes/",
            get(recipes::list::<S>).post(recipes::create::<S>),
        )
        .route(
            "/recipes/{id}/",
            get(recipes::show::<S>)
                .put(recipes::replace::<S>)
                .patch(recipes::update::<S>)
                .delete(recipes::destroy::<S>),
        )
        .route(
            "/recipes/{id}/upload-image/",
            post(recipes::upload_image::<S>),
        )
}

/// Create all API routes.
pub fn routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .nest("/user", user_routes())
        .nest("/recipe", recipe_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag(value: Option<&str>) -> Result<bool, AppError> {
        AssignedOnlyQuery {
            assigned_only: value.map(str::to_owned),
        }
        .enabled()
    }

    #[test]
    fn test_assigned_only_flag() {
        assert!(!flag(None).unwrap_or(true));
        assert!(!flag(Some("0")).unwrap_or(true));
        assert!(flag(Some("1")).unwrap_or(false));
        assert!(flag(Some("true")).unwrap_or(false));
        assert!(flag(Some("yes")).is_err());
    }
}
