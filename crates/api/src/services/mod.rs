//! Business logic services.

pub mod auth;
pub mod media;
pub mod recipes;

pub use auth::{AuthError, AuthService};
pub use media::MediaStorage;
pub use recipes::{RecipeError, RecipeService};
