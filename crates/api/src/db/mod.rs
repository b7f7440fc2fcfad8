//! Persistence for the recipe API.
//!
//! # Repositories
//!
//! Handlers never talk to a database directly. Each entity type has a
//! repository trait, and a [`Store`] bundles one of each. The store is
//! injected into [`AppState`](crate::state::AppState):
//!
//! - [`PgStore`] - `PostgreSQL` via a `sqlx` connection pool (production)
//! - [`MemoryStore`] - process-local maps (tests, local experiments)
//!
//! Every method on an owned entity (tag, ingredient, recipe) takes the
//! owner's [`UserId`] and filters by it. A row that exists but belongs to
//! someone else is indistinguishable from a missing row.
//!
//! # Database: `recipe`
//!
//! ## Tables
//!
//! - `app_user` - Accounts keyed by normalized email
//! - `auth_token` - One API token per user
//! - `tag`, `ingredient` - Owned labels
//! - `recipe` - Owned recipes
//! - `recipe_tag`, `recipe_ingredient` - Recipe relations
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p recipe-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::future::Future;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use recipe_core::{Email, IngredientId, RecipeId, TagId, UserId};

use crate::models::{
    Ingredient, NewRecipe, NewUser, Recipe, RecipeFilter, RecipeUpdate, Tag, User, UserUpdate,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Result type alias for repository operations.
pub type RepoResult<T> = Result<T, RepositoryError>;

/// User accounts.
pub trait UserRepository: Send + Sync {
    /// Insert a user.
    ///
    /// Fails with [`RepositoryError::Conflict`] if the email is taken.
    fn create(&self, input: NewUser) -> impl Future<Output = RepoResult<User>> + Send;

    fn get_by_id(&self, id: UserId) -> impl Future<Output = RepoResult<Option<User>>> + Send;

    fn get_by_email(&self, email: &Email)
    -> impl Future<Output = RepoResult<Option<User>>> + Send;

    /// Apply a profile update. Fails with [`RepositoryError::NotFound`] if
    /// the user no longer exists.
    fn update(&self, id: UserId, input: UserUpdate)
    -> impl Future<Output = RepoResult<User>> + Send;
}

/// API tokens, one per user.
pub trait TokenRepository: Send + Sync {
    /// Return the user's token, storing `candidate` as the token if the user
    /// has none yet.
    fn get_or_create(
        &self,
        user_id: UserId,
        candidate: &str,
    ) -> impl Future<Output = RepoResult<String>> + Send;

    /// Resolve a token key to its user.
    fn find_user(&self, key: &str) -> impl Future<Output = RepoResult<Option<User>>> + Send;
}

/// Tags, scoped to their owner.
pub trait TagRepository: Send + Sync {
    fn create(&self, owner: UserId, name: &str) -> impl Future<Output = RepoResult<Tag>> + Send;

    /// The owner's tags, name descending. With `assigned_only`, only tags
    /// attached to at least one of the owner's recipes.
    fn list(
        &self,
        owner: UserId,
        assigned_only: bool,
    ) -> impl Future<Output = RepoResult<Vec<Tag>>> + Send;

    /// The subset of `ids` owned by `owner`, ascending by ID.
    fn get_many(
        &self,
        owner: UserId,
        ids: &[TagId],
    ) -> impl Future<Output = RepoResult<Vec<Tag>>> + Send;

    fn rename(
        &self,
        owner: UserId,
        id: TagId,
        name: &str,
    ) -> impl Future<Output = RepoResult<Option<Tag>>> + Send;

    /// Returns `false` if nothing was deleted.
    fn delete(&self, owner: UserId, id: TagId) -> impl Future<Output = RepoResult<bool>> + Send;
}

/// Ingredients, scoped to their owner.
pub trait IngredientRepository: Send + Sync {
    fn create(
        &self,
        owner: UserId,
        name: &str,
    ) -> impl Future<Output = RepoResult<Ingredient>> + Send;

    /// The owner's ingredients, name descending. With `assigned_only`, only
    /// ingredients used by at least one of the owner's recipes.
    fn list(
        &self,
        owner: UserId,
        assigned_only: bool,
    ) -> impl Future<Output = RepoResult<Vec<Ingredient>>> + Send;

    /// The subset of `ids` owned by `owner`, ascending by ID.
    fn get_many(
        &self,
        owner: UserId,
        ids: &[IngredientId],
    ) -> impl Future<Output = RepoResult<Vec<Ingredient>>> + Send;

    fn rename(
        &self,
        owner: UserId,
        id: IngredientId,
        name: &str,
    ) -> impl Future<Output = RepoResult<Option<Ingredient>>> + Send;

    /// Returns `false` if nothing was deleted.
    fn delete(
        &self,
        owner: UserId,
        id: IngredientId,
    ) -> impl Future<Output = RepoResult<bool>> + Send;
}

/// Recipes, scoped to their owner.
pub trait RecipeRepository: Send + Sync {
    fn create(
        &self,
        owner: UserId,
        input: NewRecipe,
    ) -> impl Future<Output = RepoResult<Recipe>> + Send;

    /// The owner's recipes matching `filter`, newest (highest ID) first.
    fn list(
        &self,
        owner: UserId,
        filter: &RecipeFilter,
    ) -> impl Future<Output = RepoResult<Vec<Recipe>>> + Send;

    fn get(
        &self,
        owner: UserId,
        id: RecipeId,
    ) -> impl Future<Output = RepoResult<Option<Recipe>>> + Send;

    fn update(
        &self,
        owner: UserId,
        id: RecipeId,
        input: RecipeUpdate,
    ) -> impl Future<Output = RepoResult<Option<Recipe>>> + Send;

    /// Record the stored image path (relative to the media root).
    fn set_image(
        &self,
        owner: UserId,
        id: RecipeId,
        image: &str,
    ) -> impl Future<Output = RepoResult<Option<Recipe>>> + Send;

    /// Returns `false` if nothing was deleted.
    fn delete(&self, owner: UserId, id: RecipeId)
    -> impl Future<Output = RepoResult<bool>> + Send;
}

/// A complete set of repositories.
pub trait Store: Clone + Send + Sync + 'static {
    type Users: UserRepository;
    type Tokens: TokenRepository;
    type Tags: TagRepository;
    type Ingredients: IngredientRepository;
    type Recipes: RecipeRepository;

    fn users(&self) -> &Self::Users;
    fn tokens(&self) -> &Self::Tokens;
    fn tags(&self) -> &Self::Tags;
    fn ingredients(&self) -> &Self::Ingredients;
    fn recipes(&self) -> &Self::Recipes;

    /// Verify the backing storage is reachable.
    fn ping(&self) -> impl Future<Output = RepoResult<()>> + Send;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
