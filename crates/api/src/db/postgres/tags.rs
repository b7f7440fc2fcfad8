//! Tag and ingredient repositories.
//!
//! Both tables have the same shape (`id`, `user_id`, `name`) and the same
//! access rules, so the SQL is shared and parameterized by table name.

use sqlx::PgPool;

use recipe_core::{IngredientId, TagId, UserId};

use crate::db::{IngredientRepository, RepoResult, TagRepository};
use crate::models::{Ingredient, Tag};

#[derive(sqlx::FromRow)]
struct NamedRow {
    id: i32,
    user_id: UserId,
    name: String,
}

impl From<NamedRow> for Tag {
    fn from(row: NamedRow) -> Self {
        Self {
            id: TagId::new(row.id),
            user_id: row.user_id,
            name: row.name,
        }
    }
}

impl From<NamedRow> for Ingredient {
    fn from(row: NamedRow) -> Self {
        Self {
            id: IngredientId::new(row.id),
            user_id: row.user_id,
            name: row.name,
        }
    }
}

/// Table names for one kind of named, owned entity.
struct NamedTable {
    /// Entity table.
    table: &'static str,
    /// Join table linking it to recipes.
    link_table: &'static str,
    /// Foreign key column in the join table.
    link_column: &'static str,
}

const TAG_TABLE: NamedTable = NamedTable {
    table: "tag",
    link_table: "recipe_tag",
    link_column: "tag_id",
};

const INGREDIENT_TABLE: NamedTable = NamedTable {
    table: "ingredient",
    link_table: "recipe_ingredient",
    link_column: "ingredient_id",
};

impl NamedTable {
    async fn create(&self, pool: &PgPool, owner: UserId, name: &str) -> RepoResult<NamedRow> {
        let row = sqlx::query_as(&format!(
            "INSERT INTO {} (user_id, name) VALUES ($1, $2) RETURNING id, user_id, name",
            self.table
        ))
        .bind(owner)
        .bind(name)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    async fn list(
        &self,
        pool: &PgPool,
        owner: UserId,
        assigned_only: bool,
    ) -> RepoResult<Vec<NamedRow>> {
        let rows = sqlx::query_as(&format!(
            r#"
            SELECT e.id, e.user_id, e.name
            FROM {table} e
            WHERE e.user_id = $1
              AND (NOT $2 OR EXISTS (
                    SELECT 1
                    FROM {link} l
                    JOIN recipe r ON r.id = l.recipe_id
                    WHERE l.{column} = e.id AND r.user_id = $1
              ))
            ORDER BY e.name COLLATE "C" DESC, e.id DESC
            "#,
            table = self.table,
            link = self.link_table,
            column = self.link_column,
        ))
        .bind(owner)
        .bind(assigned_only)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    async fn get_many(
        &self,
        pool: &PgPool,
        owner: UserId,
        ids: Vec<i32>,
    ) -> RepoResult<Vec<NamedRow>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as(&format!(
            r"
            SELECT id, user_id, name
            FROM {}
            WHERE user_id = $1 AND id = ANY($2)
            ORDER BY id
            ",
            self.table
        ))
        .bind(owner)
        .bind(ids)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    async fn rename(
        &self,
        pool: &PgPool,
        owner: UserId,
        id: i32,
        name: &str,
    ) -> RepoResult<Option<NamedRow>> {
        let row = sqlx::query_as(&format!(
            r"
            UPDATE {}
            SET name = $3
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name
            ",
            self.table
        ))
        .bind(id)
        .bind(owner)
        .bind(name)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, pool: &PgPool, owner: UserId, id: i32) -> RepoResult<bool> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE id = $1 AND user_id = $2",
            self.table
        ))
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Repository for tags.
#[derive(Clone)]
pub struct PgTagRepository {
    pool: PgPool,
}

impl PgTagRepository {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TagRepository for PgTagRepository {
    async fn create(&self, owner: UserId, name: &str) -> RepoResult<Tag> {
        Ok(TAG_TABLE.create(&self.pool, owner, name).await?.into())
    }

    async fn list(&self, owner: UserId, assigned_only: bool) -> RepoResult<Vec<Tag>> {
        let rows = TAG_TABLE.list(&self.pool, owner, assigned_only).await?;
        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn get_many(&self, owner: UserId, ids: &[TagId]) -> RepoResult<Vec<Tag>> {
        let ids = ids.iter().map(TagId::as_i32).collect();
        let rows = TAG_TABLE.get_many(&self.pool, owner, ids).await?;
        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn rename(&self, owner: UserId, id: TagId, name: &str) -> RepoResult<Option<Tag>> {
        let row = TAG_TABLE
            .rename(&self.pool, owner, id.as_i32(), name)
            .await?;
        Ok(row.map(Tag::from))
    }

    async fn delete(&self, owner: UserId, id: TagId) -> RepoResult<bool> {
        TAG_TABLE.delete(&self.pool, owner, id.as_i32()).await
    }
}

/// Repository for ingredients.
#[derive(Clone)]
pub struct PgIngredientRepository {
    pool: PgPool,
}

impl PgIngredientRepository {
    /// Create a new ingredient repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl IngredientRepository for PgIngredientRepository {
    async fn create(&self, owner: UserId, name: &str) -> RepoResult<Ingredient> {
        Ok(INGREDIENT_TABLE
            .create(&self.pool, owner, name)
            .await?
            .into())
    }

    async fn list(&self, owner: UserId, assigned_only: bool) -> RepoResult<Vec<Ingredient>> {
        let rows = INGREDIENT_TABLE
            .list(&self.pool, owner, assigned_only)
            .await?;
        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    async fn get_many(&self, owner: UserId, ids: &[IngredientId]) -> RepoResult<Vec<Ingredient>> {
        let ids = ids.iter().map(IngredientId::as_i32).collect();
        let rows = INGREDIENT_TABLE.get_many(&self.pool, owner, ids).await?;
        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    async fn rename(
        &self,
        owner: UserId,
        id: IngredientId,
        name: &str,
    ) -> RepoResult<Option<Ingredient>> {
        let row = INGREDIENT_TABLE
            .rename(&self.pool, owner, id.as_i32(), name)
            .await?;
        Ok(row.map(Ingredient::from))
    }

    async fn delete(&self, owner: UserId, id: IngredientId) -> RepoResult<bool> {
        INGREDIENT_TABLE
            .delete(&self.pool, owner, id.as_i32())
            .await
    }
}
