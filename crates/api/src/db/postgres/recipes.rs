//! Recipe repository.
//!
//! Tag and ingredient IDs live in join tables and are aggregated back into
//! sorted arrays with `ARRAY(SELECT ...)` so a recipe always loads in one
//! round trip.

use sqlx::{PgConnection, PgPool};

use recipe_core::{IngredientId, Price, RecipeId, TagId, UserId};

use crate::db::{RecipeRepository, RepoResult};
use crate::models::{NewRecipe, Recipe, RecipeFilter, RecipeUpdate};

const SELECT_RECIPE: &str = r"
    SELECT r.id, r.user_id, r.title, r.time_minutes, r.price, r.link, r.image,
           ARRAY(
               SELECT rt.tag_id FROM recipe_tag rt
               WHERE rt.recipe_id = r.id ORDER BY rt.tag_id
           ) AS tag_ids,
           ARRAY(
               SELECT ri.ingredient_id FROM recipe_ingredient ri
               WHERE ri.recipe_id = r.id ORDER BY ri.ingredient_id
           ) AS ingredient_ids
    FROM recipe r
";

#[derive(sqlx::FromRow)]
struct RecipeRow {
    id: RecipeId,
    user_id: UserId,
    title: String,
    time_minutes: i32,
    price: Price,
    link: String,
    image: Option<String>,
    tag_ids: Vec<TagId>,
    ingredient_ids: Vec<IngredientId>,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            time_minutes: row.time_minutes,
            price: row.price,
            link: row.link,
            image: row.image,
            tag_ids: row.tag_ids,
            ingredient_ids: row.ingredient_ids,
        }
    }
}

fn raw_ids<T: Copy + Into<i32>>(ids: &[T]) -> Vec<i32> {
    let mut ids: Vec<i32> = ids.iter().map(|&id| id.into()).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

async fn fetch_owned(
    conn: &mut PgConnection,
    owner: UserId,
    id: RecipeId,
) -> RepoResult<Option<Recipe>> {
    let row: Option<RecipeRow> =
        sqlx::query_as(&format!("{SELECT_RECIPE} WHERE r.id = $1 AND r.user_id = $2"))
            .bind(id)
            .bind(owner)
            .fetch_optional(conn)
            .await?;
    Ok(row.map(Recipe::from))
}

async fn replace_tags(conn: &mut PgConnection, id: RecipeId, tags: &[TagId]) -> RepoResult<()> {
    sqlx::query("DELETE FROM recipe_tag WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    sqlx::query(
        "INSERT INTO recipe_tag (recipe_id, tag_id) SELECT $1, UNNEST($2::int4[])",
    )
    .bind(id)
    .bind(raw_ids(tags))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn replace_ingredients(
    conn: &mut PgConnection,
    id: RecipeId,
    ingredients: &[IngredientId],
) -> RepoResult<()> {
    sqlx::query("DELETE FROM recipe_ingredient WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    sqlx::query(
        "INSERT INTO recipe_ingredient (recipe_id, ingredient_id) \
         SELECT $1, UNNEST($2::int4[])",
    )
    .bind(id)
    .bind(raw_ids(ingredients))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Repository for recipes and their relations.
#[derive(Clone)]
pub struct PgRecipeRepository {
    pool: PgPool,
}

impl PgRecipeRepository {
    /// Create a new recipe repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl RecipeRepository for PgRecipeRepository {
    async fn create(&self, owner: UserId, input: NewRecipe) -> RepoResult<Recipe> {
        let mut tx = self.pool.begin().await?;

        let id: RecipeId = sqlx::query_scalar(
            r"
            INSERT INTO recipe (user_id, title, time_minutes, price, link)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(owner)
        .bind(&input.title)
        .bind(input.time_minutes)
        .bind(input.price)
        .bind(&input.link)
        .fetch_one(&mut *tx)
        .await?;

        replace_tags(&mut tx, id, &input.tag_ids).await?;
        replace_ingredients(&mut tx, id, &input.ingredient_ids).await?;

        let recipe = fetch_owned(&mut tx, owner, id)
            .await?
            .ok_or(crate::db::RepositoryError::NotFound)?;
        tx.commit().await?;
        Ok(recipe)
    }

    async fn list(&self, owner: UserId, filter: &RecipeFilter) -> RepoResult<Vec<Recipe>> {
        let rows: Vec<RecipeRow> = sqlx::query_as(&format!(
            r"
            {SELECT_RECIPE}
            WHERE r.user_id = $1
              AND (cardinality($2::int4[]) = 0 OR EXISTS (
                    SELECT 1 FROM recipe_tag rt
                    WHERE rt.recipe_id = r.id AND rt.tag_id = ANY($2)
              ))
              AND (cardinality($3::int4[]) = 0 OR EXISTS (
                    SELECT 1 FROM recipe_ingredient ri
                    WHERE ri.recipe_id = r.id AND ri.ingredient_id = ANY($3)
              ))
            ORDER BY r.id DESC
            "
        ))
        .bind(owner)
        .bind(raw_ids(&filter.tag_ids))
        .bind(raw_ids(&filter.ingredient_ids))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    async fn get(&self, owner: UserId, id: RecipeId) -> RepoResult<Option<Recipe>> {
        let mut conn = self.pool.acquire().await?;
        fetch_owned(&mut conn, owner, id).await
    }

    async fn update(
        &self,
        owner: UserId,
        id: RecipeId,
        input: RecipeUpdate,
    ) -> RepoResult<Option<Recipe>> {
        let mut tx = self.pool.begin().await?;

        let updated: Option<RecipeId> = sqlx::query_scalar(
            r"
            UPDATE recipe
            SET title = COALESCE($3, title),
                time_minutes = COALESCE($4, time_minutes),
                price = COALESCE($5, price),
                link = COALESCE($6, link)
            WHERE id = $1 AND user_id = $2
            RETURNING id
            ",
        )
        .bind(id)
        .bind(owner)
        .bind(input.title)
        .bind(input.time_minutes)
        .bind(input.price)
        .bind(input.link)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Ok(None);
        }

        if let Some(tags) = &input.tag_ids {
            replace_tags(&mut tx, id, tags).await?;
        }
        if let Some(ingredients) = &input.ingredient_ids {
            replace_ingredients(&mut tx, id, ingredients).await?;
        }

        let recipe = fetch_owned(&mut tx, owner, id).await?;
        tx.commit().await?;
        Ok(recipe)
    }

    async fn set_image(
        &self,
        owner: UserId,
        id: RecipeId,
        image: &str,
    ) -> RepoResult<Option<Recipe>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE recipe SET image = $3 WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .bind(image)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        let recipe = fetch_owned(&mut tx, owner, id).await?;
        tx.commit().await?;
        Ok(recipe)
    }

    async fn delete(&self, owner: UserId, id: RecipeId) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM recipe WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_ids_sorted_and_deduplicated() {
        let ids = [TagId::new(3), TagId::new(1), TagId::new(3)];
        assert_eq!(raw_ids(&ids), vec![1, 3]);
    }
}
