//! `PostgreSQL` implementation of the repositories.
//!
//! Queries are built with `sqlx::query_as` and checked at runtime, so the
//! crate builds without a live database or an offline query cache.

mod recipes;
mod tags;
mod users;

pub use recipes::PgRecipeRepository;
pub use tags::{PgIngredientRepository, PgTagRepository};
pub use users::{PgTokenRepository, PgUserRepository};

use sqlx::PgPool;

use super::{RepoResult, RepositoryError, Store};

/// [`Store`] backed by a `PostgreSQL` pool. Cheap to clone.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    users: PgUserRepository,
    tokens: PgTokenRepository,
    tags: PgTagRepository,
    ingredients: PgIngredientRepository,
    recipes: PgRecipeRepository,
}

impl PgStore {
    /// Wrap a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            tokens: PgTokenRepository::new(pool.clone()),
            tags: PgTagRepository::new(pool.clone()),
            ingredients: PgIngredientRepository::new(pool.clone()),
            recipes: PgRecipeRepository::new(pool.clone()),
            pool,
        }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Store for PgStore {
    type Users = PgUserRepository;
    type Tokens = PgTokenRepository;
    type Tags = PgTagRepository;
    type Ingredients = PgIngredientRepository;
    type Recipes = PgRecipeRepository;

    fn users(&self) -> &Self::Users {
        &self.users
    }

    fn tokens(&self) -> &Self::Tokens {
        &self.tokens
    }

    fn tags(&self) -> &Self::Tags {
        &self.tags
    }

    fn ingredients(&self) -> &Self::Ingredients {
        &self.ingredients
    }

    fn recipes(&self) -> &Self::Recipes {
        &self.recipes
    }

    async fn ping(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Map a unique violation to [`RepositoryError::Conflict`].
fn conflict_on_unique(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}
