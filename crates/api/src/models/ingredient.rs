//! Ingredient domain type.

use std::fmt;

use serde::Serialize;

use recipe_core::{IngredientId, UserId};

use super::OwnerScoped;

/// An ingredient in a user's pantry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub id: IngredientId,
    pub user_id: UserId,
    pub name: String,
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl OwnerScoped for Ingredient {
    fn owner(&self) -> UserId {
        self.user_id
    }
}

/// JSON view of an ingredient: `{id, name}`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IngredientResponse {
    pub id: IngredientId,
    pub name: String,
}

impl From<&Ingredient> for IngredientResponse {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name.clone(),
        }
    }
}
