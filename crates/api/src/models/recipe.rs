//! Recipe domain types.

use std::fmt;

use serde::Serialize;

use recipe_core::{IngredientId, Price, RecipeId, TagId, UserId};

use super::{Ingredient, IngredientResponse, OwnerScoped, Tag, TagResponse};

/// URL prefix under which the media root is served.
pub const MEDIA_URL: &str = "/media/";

/// A recipe owned by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: RecipeId,
    pub user_id: UserId,
    pub title: String,
    /// Estimated preparation time in minutes.
    pub time_minutes: i32,
    pub price: Price,
    /// Optional link to the source of the recipe (empty when unset).
    pub link: String,
    /// Image path relative to the media root.
    pub image: Option<String>,
    /// Attached tags, ascending by ID.
    pub tag_ids: Vec<TagId>,
    /// Attached ingredients, ascending by ID.
    pub ingredient_ids: Vec<IngredientId>,
}

impl Recipe {
    /// Public URL of the recipe image, if one was uploaded.
    #[must_use]
    pub fn image_url(&self) -> Option<String> {
        self.image
            .as_deref()
            .map(|path| format!("{MEDIA_URL}{path}"))
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

impl OwnerScoped for Recipe {
    fn owner(&self) -> UserId {
        self.user_id
    }
}

/// Input for creating a recipe. Tag and ingredient IDs must already be
/// verified as owned by the creator.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub tag_ids: Vec<TagId>,
    pub ingredient_ids: Vec<IngredientId>,
}

/// Partial recipe update. `None` leaves a field unchanged; `Some(vec![])`
/// clears a relation.
#[derive(Debug, Clone, Default)]
pub struct RecipeUpdate {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Price>,
    pub link: Option<String>,
    pub tag_ids: Option<Vec<TagId>>,
    pub ingredient_ids: Option<Vec<IngredientId>>,
}

/// List filter: a recipe matches when it has any of the given tags (if any
/// are given) and any of the given ingredients (if any are given).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub tag_ids: Vec<TagId>,
    pub ingredient_ids: Vec<IngredientId>,
}

impl RecipeFilter {
    /// Whether `recipe` passes the filter.
    #[must_use]
    pub fn matches(&self, recipe: &Recipe) -> bool {
        let tags_ok =
            self.tag_ids.is_empty() || self.tag_ids.iter().any(|t| recipe.tag_ids.contains(t));
        let ingredients_ok = self.ingredient_ids.is_empty()
            || self
                .ingredient_ids
                .iter()
                .any(|i| recipe.ingredient_ids.contains(i));
        tags_ok && ingredients_ok
    }
}

/// JSON view of a recipe in list responses.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeResponse {
    pub id: RecipeId,
    pub title: String,
    pub ingredients: Vec<IngredientId>,
    pub tags: Vec<TagId>,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub image: Option<String>,
}

impl From<&Recipe> for RecipeResponse {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title.clone(),
            ingredients: recipe.ingredient_ids.clone(),
            tags: recipe.tag_ids.clone(),
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link.clone(),
            image: recipe.image_url(),
        }
    }
}

/// JSON view of a single recipe with nested tags and ingredients.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetailResponse {
    pub id: RecipeId,
    pub title: String,
    pub ingredients: Vec<IngredientResponse>,
    pub tags: Vec<TagResponse>,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub image: Option<String>,
}

impl RecipeDetailResponse {
    /// Build the detail view from a recipe and its resolved relations.
    #[must_use]
    pub fn new(recipe: &Recipe, tags: &[Tag], ingredients: &[Ingredient]) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title.clone(),
            ingredients: ingredients.iter().map(IngredientResponse::from).collect(),
            tags: tags.iter().map(TagResponse::from).collect(),
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link.clone(),
            image: recipe.image_url(),
        }
    }
}

/// Response of the image upload endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeImageResponse {
    pub id: RecipeId,
    pub image: Option<String>,
}

impl From<&Recipe> for RecipeImageResponse {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            image: recipe.image_url(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Recipe {
        Recipe {
            id: RecipeId::new(1),
            user_id: UserId::new(1),
            title: "Choclate cake".to_owned(),
            time_minutes: 30,
            price: Price::from_cents(600).unwrap(),
            link: String::new(),
            image: None,
            tag_ids: vec![TagId::new(1), TagId::new(2)],
            ingredient_ids: vec![IngredientId::new(5)],
        }
    }

    #[test]
    fn test_recipe_str() {
        let recipe = sample();
        assert_eq!(recipe.to_string(), recipe.title);
    }

    #[test]
    fn test_image_url() {
        let mut recipe = sample();
        assert_eq!(recipe.image_url(), None);
        recipe.image = Some("uploads/recipe/abc.jpg".to_owned());
        assert_eq!(
            recipe.image_url().as_deref(),
            Some("/media/uploads/recipe/abc.jpg")
        );
    }

    #[test]
    fn test_filter_matches_any_tag() {
        let recipe = sample();
        let filter = RecipeFilter {
            tag_ids: vec![TagId::new(2), TagId::new(9)],
            ingredient_ids: vec![],
        };
        assert!(filter.matches(&recipe));

        let filter = RecipeFilter {
            tag_ids: vec![TagId::new(9)],
            ingredient_ids: vec![],
        };
        assert!(!filter.matches(&recipe));
    }

    #[test]
    fn test_filter_requires_both_dimensions() {
        let recipe = sample();
        let filter = RecipeFilter {
            tag_ids: vec![TagId::new(1)],
            ingredient_ids: vec![IngredientId::new(6)],
        };
        assert!(!filter.matches(&recipe));
        assert!(RecipeFilter::default().matches(&recipe));
    }

    #[test]
    fn test_list_response_serializes_price_as_string() {
        let json = serde_json::to_value(RecipeResponse::from(&sample())).unwrap();
        assert_eq!(json["price"], "6.00");
        assert_eq!(json["tags"], serde_json::json!([1, 2]));
        assert_eq!(json["image"], serde_json::Value::Null);
    }
}
