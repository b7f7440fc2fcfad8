//! Domain models for the recipe API.
//!
//! These types represent validated domain objects separate from database row
//! types and from the JSON shapes returned to clients.

pub mod ingredient;
pub mod recipe;
pub mod tag;
pub mod user;

pub use ingredient::{Ingredient, IngredientResponse};
pub use recipe::{
    NewRecipe, Recipe, RecipeDetailResponse, RecipeFilter, RecipeImageResponse, RecipeResponse,
    RecipeUpdate,
};
pub use tag::{Tag, TagResponse};
pub use user::{NewUser, User, UserResponse, UserUpdate};

use recipe_core::UserId;

/// Maximum length of a tag/ingredient name or recipe title.
pub const MAX_NAME_LENGTH: usize = 255;

/// An entity that belongs to exactly one user.
///
/// Every list, read, update and delete of an owned entity is filtered by the
/// authenticated user's ID; callers never see entities owned by someone else.
pub trait OwnerScoped {
    /// ID of the owning user.
    fn owner(&self) -> UserId;

    /// Whether `user` owns this entity.
    fn is_owned_by(&self, user: UserId) -> bool {
        self.owner() == user
    }
}

/// Validate a display name (tag name, ingredient name, recipe title).
///
/// Returns the trimmed name.
///
/// # Errors
///
/// Returns a message if the name is blank or longer than
/// [`MAX_NAME_LENGTH`] characters.
pub fn validate_name(field: &str, value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} may not be blank"));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(format!(
            "{field} must be at most {MAX_NAME_LENGTH} characters"
        ));
    }
    Ok(trimmed.to_owned())
}
