//! Tag domain type.

use std::fmt;

use serde::Serialize;

use recipe_core::{TagId, UserId};

use super::OwnerScoped;

/// A user-defined label that can be attached to recipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub user_id: UserId,
    pub name: String,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl OwnerScoped for Tag {
    fn owner(&self) -> UserId {
        self.user_id
    }
}

/// JSON view of a tag.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TagResponse {
    pub id: TagId,
    pub name: String,
}

impl From<&Tag> for TagResponse {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name.clone(),
        }
    }
}
