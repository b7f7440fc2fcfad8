//! Recipe service.
//!
//! Validates recipe input against the caller's own tags and ingredients,
//! assembles detail views, and manages recipe images.

use thiserror::Error;

use recipe_core::{
    IngredientId, RandomUuid, RecipeId, TagId, UserId, file_extension, recipe_image_file_path,
};

use crate::db::{IngredientRepository, RecipeRepository, RepositoryError, Store, TagRepository};
use crate::models::{
    MAX_NAME_LENGTH, NewRecipe, Recipe, RecipeDetailResponse, RecipeFilter, RecipeUpdate,
    validate_name,
};

use super::MediaStorage;

/// Errors from recipe operations.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    /// No recipe with this ID belongs to the caller.
    #[error("recipe not found")]
    NotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Media file could not be written or removed.
    #[error("media storage error: {0}")]
    Storage(#[from] std::io::Error),
}

/// Recipe operations for one caller.
pub struct RecipeService<'a, S> {
    store: &'a S,
    media: &'a MediaStorage,
    owner: UserId,
}

impl<'a, S: Store> RecipeService<'a, S> {
    /// Create a service acting on behalf of `owner`.
    #[must_use]
    pub const fn new(store: &'a S, media: &'a MediaStorage, owner: UserId) -> Self {
        Self {
            store,
            media,
            owner,
        }
    }

    /// The caller's recipes matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RecipeError::Repository` if the query fails.
    pub async fn list(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>, RecipeError> {
        Ok(self.store.recipes().list(self.owner, filter).await?)
    }

    /// One recipe.
    ///
    /// # Errors
    ///
    /// Returns `RecipeError::NotFound` if the caller has no such recipe.
    pub async fn get(&self, id: RecipeId) -> Result<Recipe, RecipeError> {
        self.store
            .recipes()
            .get(self.owner, id)
            .await?
            .ok_or(RecipeError::NotFound)
    }

    /// One recipe with its tags and ingredients resolved.
    ///
    /// # Errors
    ///
    /// Returns `RecipeError::NotFound` if the caller has no such recipe.
    pub async fn detail(&self, id: RecipeId) -> Result<RecipeDetailResponse, RecipeError> {
        let recipe = self.get(id).await?;
        let tags = self
            .store
            .tags()
            .get_many(self.owner, &recipe.tag_ids)
            .await?;
        let ingredients = self
            .store
            .ingredients()
            .get_many(self.owner, &recipe.ingredient_ids)
            .await?;
        Ok(RecipeDetailResponse::new(&recipe, &tags, &ingredients))
    }

    /// Create a recipe.
    ///
    /// # Errors
    ///
    /// Returns `RecipeError::Validation` for invalid fields or tag/ingredient
    /// IDs the caller does not own.
    pub async fn create(&self, mut input: NewRecipe) -> Result<Recipe, RecipeError> {
        input.title = validate_title(&input.title)?;
        validate_time(input.time_minutes)?;
        input.link = validate_link(&input.link)?;
        self.check_tags(&input.tag_ids).await?;
        self.check_ingredients(&input.ingredient_ids).await?;

        let recipe = self.store.recipes().create(self.owner, input).await?;
        tracing::info!(recipe_id = %recipe.id, user_id = %self.owner, "Recipe created");
        Ok(recipe)
    }

    /// Replace every writable field of a recipe.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create`], plus `RecipeError::NotFound`.
    pub async fn replace(&self, id: RecipeId, input: NewRecipe) -> Result<Recipe, RecipeError> {
        self.update(
            id,
            RecipeUpdate {
                title: Some(input.title),
                time_minutes: Some(input.time_minutes),
                price: Some(input.price),
                link: Some(input.link),
                tag_ids: Some(input.tag_ids),
                ingredient_ids: Some(input.ingredient_ids),
            },
        )
        .await
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create`], plus `RecipeError::NotFound`.
    pub async fn update(
        &self,
        id: RecipeId,
        mut input: RecipeUpdate,
    ) -> Result<Recipe, RecipeError> {
        if let Some(title) = &input.title {
            input.title = Some(validate_title(title)?);
        }
        if let Some(minutes) = input.time_minutes {
            validate_time(minutes)?;
        }
        if let Some(link) = &input.link {
            input.link = Some(validate_link(link)?);
        }
        if let Some(tags) = &input.tag_ids {
            self.check_tags(tags).await?;
        }
        if let Some(ingredients) = &input.ingredient_ids {
            self.check_ingredients(ingredients).await?;
        }

        self.store
            .recipes()
            .update(self.owner, id, input)
            .await?
            .ok_or(RecipeError::NotFound)
    }

    /// Delete a recipe and its image.
    ///
    /// # Errors
    ///
    /// Returns `RecipeError::NotFound` if the caller has no such recipe.
    pub async fn delete(&self, id: RecipeId) -> Result<(), RecipeError> {
        let recipe = self.get(id).await?;
        if !self.store.recipes().delete(self.owner, id).await? {
            return Err(RecipeError::NotFound);
        }
        if let Some(image) = &recipe.image {
            self.discard(image).await;
        }
        Ok(())
    }

    /// Store an uploaded image and attach it to the recipe, replacing and
    /// deleting any previous image.
    ///
    /// # Errors
    ///
    /// Returns `RecipeError::Validation` for a missing or unusable file
    /// extension, `RecipeError::NotFound` if the caller has no such recipe,
    /// `RecipeError::Storage` if the file cannot be written.
    pub async fn upload_image(
        &self,
        id: RecipeId,
        original_filename: &str,
        bytes: &[u8],
    ) -> Result<Recipe, RecipeError> {
        validate_image_extension(original_filename)?;
        let previous = self.get(id).await?.image;

        let path = recipe_image_file_path(&RandomUuid, original_filename);
        self.media.save(&path, bytes).await?;

        let recipe = match self.store.recipes().set_image(self.owner, id, &path).await {
            Ok(Some(recipe)) => recipe,
            Ok(None) => {
                self.discard(&path).await;
                return Err(RecipeError::NotFound);
            }
            Err(e) => {
                self.discard(&path).await;
                return Err(e.into());
            }
        };

        if let Some(previous) = previous.filter(|p| *p != path) {
            self.discard(&previous).await;
        }

        tracing::info!(recipe_id = %id, image = %path, "Recipe image uploaded");
        Ok(recipe)
    }

    async fn discard(&self, relative: &str) {
        if let Err(e) = self.media.remove(relative).await {
            tracing::warn!(error = %e, path = relative, "Failed to delete media file");
        }
    }

    async fn check_tags(&self, ids: &[TagId]) -> Result<(), RecipeError> {
        let found = self.store.tags().get_many(self.owner, ids).await?;
        let found: Vec<TagId> = found.iter().map(|t| t.id).collect();
        ensure_all_found(ids, &found)
    }

    async fn check_ingredients(&self, ids: &[IngredientId]) -> Result<(), RecipeError> {
        let found = self.store.ingredients().get_many(self.owner, ids).await?;
        let found: Vec<IngredientId> = found.iter().map(|i| i.id).collect();
        ensure_all_found(ids, &found)
    }
}

/// Fail with the first requested ID that was not found among the caller's
/// entities.
fn ensure_all_found<T>(requested: &[T], found: &[T]) -> Result<(), RecipeError>
where
    T: PartialEq + std::fmt::Display,
{
    if let Some(missing) = requested.iter().find(|id| !found.contains(id)) {
        return Err(RecipeError::Validation(format!(
            "Invalid pk \"{missing}\" - object does not exist."
        )));
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<String, RecipeError> {
    validate_name("title", title).map_err(RecipeError::Validation)
}

fn validate_time(minutes: i32) -> Result<(), RecipeError> {
    if minutes < 0 {
        return Err(RecipeError::Validation(
            "time_minutes must not be negative".to_owned(),
        ));
    }
    Ok(())
}

fn validate_link(link: &str) -> Result<String, RecipeError> {
    let link = link.trim();
    if link.chars().count() > MAX_NAME_LENGTH {
        return Err(RecipeError::Validation(format!(
            "link must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(link.to_owned())
}

/// The stored path keeps the client's extension, so it must not be able to
/// introduce separators or traversal.
fn validate_image_extension(original_filename: &str) -> Result<(), RecipeError> {
    let ext = file_extension(original_filename);
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(RecipeError::Validation(
            "Upload a valid image file with an alphanumeric extension.".to_owned(),
        ));
    }
    Ok(())
}
