//! In-process store backed by ordered maps.
//!
//! Mirrors the relational schema closely enough for the API to behave the
//! same as on `PostgreSQL`: IDs are allocated from per-table sequences and
//! never reused, emails are unique, and deleting a tag or ingredient detaches
//! it from every recipe.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use recipe_core::{Email, IngredientId, RecipeId, TagId, UserId};

use super::{
    IngredientRepository, RecipeRepository, RepoResult, RepositoryError, Store, TagRepository,
    TokenRepository, UserRepository,
};
use crate::models::{
    Ingredient, NewRecipe, NewUser, OwnerScoped, Recipe, RecipeFilter, RecipeUpdate, Tag, User,
    UserUpdate,
};

#[derive(Default)]
struct Tables {
    user_seq: i32,
    tag_seq: i32,
    ingredient_seq: i32,
    recipe_seq: i32,
    users: BTreeMap<UserId, User>,
    tokens: HashMap<String, UserId>,
    tags: BTreeMap<TagId, Tag>,
    ingredients: BTreeMap<IngredientId, Ingredient>,
    recipes: BTreeMap<RecipeId, Recipe>,
}

fn next_id(seq: &mut i32) -> i32 {
    *seq += 1;
    *seq
}

fn sorted_unique<T: Ord + Copy>(ids: &[T]) -> Vec<T> {
    ids.iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

type Shared = Arc<RwLock<Tables>>;

/// In-memory [`Store`]. Clones share the same data.
#[derive(Clone)]
pub struct MemoryStore {
    users: MemoryUsers,
    tokens: MemoryTokens,
    tags: MemoryTags,
    ingredients: MemoryIngredients,
    recipes: MemoryRecipes,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        let shared = Shared::default();
        Self {
            users: MemoryUsers(Arc::clone(&shared)),
            tokens: MemoryTokens(Arc::clone(&shared)),
            tags: MemoryTags(Arc::clone(&shared)),
            ingredients: MemoryIngredients(Arc::clone(&shared)),
            recipes: MemoryRecipes(shared),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    type Users = MemoryUsers;
    type Tokens = MemoryTokens;
    type Tags = MemoryTags;
    type Ingredients = MemoryIngredients;
    type Recipes = MemoryRecipes;

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
        Ok(())
    }
}

// =============================================================================
// Users & tokens
// =============================================================================

/// In-memory [`UserRepository`].
#[derive(Clone)]
pub struct MemoryUsers(Shared);

impl UserRepository for MemoryUsers {
    async fn create(&self, input: NewUser) -> RepoResult<User> {
        let mut tables = self.0.write().await;

        if tables.users.values().any(|u| u.email == input.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let id = UserId::new(next_id(&mut tables.user_seq));
        let user = User {
            id,
            email: input.email,
            name: input.name,
            password_hash: input.password_hash,
            is_active: true,
            is_staff: input.is_staff,
            is_superuser: input.is_superuser,
            created_at: Utc::now(),
        };
        tables.users.insert(id, user.clone());
        drop(tables);
        Ok(user)
    }

    async fn get_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.0.read().await.users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &Email) -> RepoResult<Option<User>> {
        let tables = self.0.read().await;
        let user = tables.users.values().find(|u| &u.email == email).cloned();
        drop(tables);
        Ok(user)
    }

    async fn update(&self, id: UserId, input: UserUpdate) -> RepoResult<User> {
        let mut tables = self.0.write().await;
        let user = tables.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;

        if let Some(name) = input.name {
            user.name = name;
        }
        if let Some(hash) = input.password_hash {
            user.password_hash = hash;
        }

        let updated = user.clone();
        drop(tables);
        Ok(updated)
    }
}

/// In-memory [`TokenRepository`].
#[derive(Clone)]
pub struct MemoryTokens(Shared);

impl TokenRepository for MemoryTokens {
    async fn get_or_create(&self, user_id: UserId, candidate: &str) -> RepoResult<String> {
        let mut tables = self.0.write().await;

        if !tables.users.contains_key(&user_id) {
            return Err(RepositoryError::NotFound);
        }

        if let Some((key, _)) = tables.tokens.iter().find(|(_, owner)| **owner == user_id) {
            return Ok(key.clone());
        }

        tables.tokens.insert(candidate.to_owned(), user_id);
        drop(tables);
        Ok(candidate.to_owned())
    }

    async fn find_user(&self, key: &str) -> RepoResult<Option<User>> {
        let tables = self.0.read().await;
        let user = tables
            .tokens
            .get(key)
            .and_then(|id| tables.users.get(id))
            .cloned();
        drop(tables);
        Ok(user)
    }
}

// =============================================================================
// Tags & ingredients
// =============================================================================

/// Name descending, then ID descending. Names compare by bytes, like the
/// `"C"` collation used by the SQL queries.
fn by_name_desc<T>(items: &mut [T], key: impl Fn(&T) -> (&str, i32)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

/// In-memory [`TagRepository`].
#[derive(Clone)]
pub struct MemoryTags(Shared);

impl TagRepository for MemoryTags {
    async fn create(&self, owner: UserId, name: &str) -> RepoResult<Tag> {
        let mut tables = self.0.write().await;
        let id = TagId::new(next_id(&mut tables.tag_seq));
        let tag = Tag {
            id,
            user_id: owner,
            name: name.to_owned(),
        };
        tables.tags.insert(id, tag.clone());
        drop(tables);
        Ok(tag)
    }

    async fn list(&self, owner: UserId, assigned_only: bool) -> RepoResult<Vec<Tag>> {
        let tables = self.0.read().await;

        let assigned: BTreeSet<TagId> = tables
            .recipes
            .values()
            .filter(|r| r.is_owned_by(owner))
            .flat_map(|r| r.tag_ids.iter().copied())
            .collect();

        let mut tags: Vec<Tag> = tables
            .tags
            .values()
            .filter(|t| t.is_owned_by(owner))
            .filter(|t| !assigned_only || assigned.contains(&t.id))
            .cloned()
            .collect();
        drop(tables);

        by_name_desc(&mut tags, |t| (t.name.as_str(), t.id.as_i32()));
        Ok(tags)
    }

    async fn get_many(&self, owner: UserId, ids: &[TagId]) -> RepoResult<Vec<Tag>> {
        let tables = self.0.read().await;
        let tags = sorted_unique(ids)
            .into_iter()
            .filter_map(|id| tables.tags.get(&id))
            .filter(|t| t.is_owned_by(owner))
            .cloned()
            .collect();
        drop(tables);
        Ok(tags)
    }

    async fn rename(&self, owner: UserId, id: TagId, name: &str) -> RepoResult<Option<Tag>> {
        let mut tables = self.0.write().await;
        let renamed = tables
            .tags
            .get_mut(&id)
            .filter(|t| t.is_owned_by(owner))
            .map(|t| {
                name.clone_into(&mut t.name);
                t.clone()
            });
        drop(tables);
        Ok(renamed)
    }

    async fn delete(&self, owner: UserId, id: TagId) -> RepoResult<bool> {
        let mut tables = self.0.write().await;
        if !tables.tags.get(&id).is_some_and(|t| t.is_owned_by(owner)) {
            return Ok(false);
        }
        tables.tags.remove(&id);
        for recipe in tables.recipes.values_mut() {
            recipe.tag_ids.retain(|t| *t != id);
        }
        drop(tables);
        Ok(true)
    }
}

/// In-memory [`IngredientRepository`].
#[derive(Clone)]
pub struct MemoryIngredients(Shared);

impl IngredientRepository for MemoryIngredients {
    async fn create(&self, owner: UserId, name: &str) -> RepoResult<Ingredient> {
        let mut tables = self.0.write().await;
        let id = IngredientId::new(next_id(&mut tables.ingredient_seq));
        let ingredient = Ingredient {
            id,
            user_id: owner,
            name: name.to_owned(),
        };
        tables.ingredients.insert(id, ingredient.clone());
        drop(tables);
        Ok(ingredient)
    }

    async fn list(&self, owner: UserId, assigned_only: bool) -> RepoResult<Vec<Ingredient>> {
        let tables = self.0.read().await;

        let assigned: BTreeSet<IngredientId> = tables
            .recipes
            .values()
            .filter(|r| r.is_owned_by(owner))
            .flat_map(|r| r.ingredient_ids.iter().copied())
            .collect();

        let mut ingredients: Vec<Ingredient> = tables
            .ingredients
            .values()
            .filter(|i| i.is_owned_by(owner))
            .filter(|i| !assigned_only || assigned.contains(&i.id))
            .cloned()
            .collect();
        drop(tables);

        by_name_desc(&mut ingredients, |i| (i.name.as_str(), i.id.as_i32()));
        Ok(ingredients)
    }

    async fn get_many(&self, owner: UserId, ids: &[IngredientId]) -> RepoResult<Vec<Ingredient>> {
        let tables = self.0.read().await;
        let ingredients = sorted_unique(ids)
            .into_iter()
            .filter_map(|id| tables.ingredients.get(&id))
            .filter(|i| i.is_owned_by(owner))
            .cloned()
            .collect();
        drop(tables);
        Ok(ingredients)
    }

    async fn rename(
        &self,
        owner: UserId,
        id: IngredientId,
        name: &str,
    ) -> RepoResult<Option<Ingredient>> {
        let mut tables = self.0.write().await;
        let renamed = tables
            .ingredients
            .get_mut(&id)
            .filter(|i| i.is_owned_by(owner))
            .map(|i| {
                name.clone_into(&mut i.name);
                i.clone()
            });
        drop(tables);
        Ok(renamed)
    }

    async fn delete(&self, owner: UserId, id: IngredientId) -> RepoResult<bool> {
        let mut tables = self.0.write().await;
        if !tables
            .ingredients
            .get(&id)
            .is_some_and(|i| i.is_owned_by(owner))
        {
            return Ok(false);
        }
        tables.ingredients.remove(&id);
        for recipe in tables.recipes.values_mut() {
            recipe.ingredient_ids.retain(|i| *i != id);
        }
        drop(tables);
        Ok(true)
    }
}

// =============================================================================
// Recipes
// =============================================================================

/// In-memory [`RecipeRepository`].
#[derive(Clone)]
pub struct MemoryRecipes(Shared);

impl RecipeRepository for MemoryRecipes {
    async fn create(&self, owner: UserId, input: NewRecipe) -> RepoResult<Recipe> {
        let mut tables = self.0.write().await;
        let id = RecipeId::new(next_id(&mut tables.recipe_seq));
        let recipe = Recipe {
            id,
            user_id: owner,
            title: input.title,
            time_minutes: input.time_minutes,
            price: input.price,
            link: input.link,
            image: None,
            tag_ids: sorted_unique(&input.tag_ids),
            ingredient_ids: sorted_unique(&input.ingredient_ids),
        };
        tables.recipes.insert(id, recipe.clone());
        drop(tables);
        Ok(recipe)
    }

    async fn list(&self, owner: UserId, filter: &RecipeFilter) -> RepoResult<Vec<Recipe>> {
        let tables = self.0.read().await;
        let recipes = tables
            .recipes
            .values()
            .rev()
            .filter(|r| r.is_owned_by(owner) && filter.matches(r))
            .cloned()
            .collect();
        drop(tables);
        Ok(recipes)
    }

    async fn get(&self, owner: UserId, id: RecipeId) -> RepoResult<Option<Recipe>> {
        let tables = self.0.read().await;
        let recipe = tables
            .recipes
            .get(&id)
            .filter(|r| r.is_owned_by(owner))
            .cloned();
        drop(tables);
        Ok(recipe)
    }

    async fn update(
        &self,
        owner: UserId,
        id: RecipeId,
        input: RecipeUpdate,
    ) -> RepoResult<Option<Recipe>> {
        let mut tables = self.0.write().await;
        let Some(recipe) = tables
            .recipes
            .get_mut(&id)
            .filter(|r| r.is_owned_by(owner))
        else {
            return Ok(None);
        };

        if let Some(title) = input.title {
            recipe.title = title;
        }
        if let Some(time_minutes) = input.time_minutes {
            recipe.time_minutes = time_minutes;
        }
        if let Some(price) = input.price {
            recipe.price = price;
        }
        if let Some(link) = input.link {
            recipe.link = link;
        }
        if let Some(tag_ids) = input.tag_ids {
            recipe.tag_ids = sorted_unique(&tag_ids);
        }
        if let Some(ingredient_ids) = input.ingredient_ids {
            recipe.ingredient_ids = sorted_unique(&ingredient_ids);
        }

        let updated = recipe.clone();
        drop(tables);
        Ok(Some(updated))
    }

    async fn set_image(
        &self,
        owner: UserId,
        id: RecipeId,
        image: &str,
    ) -> RepoResult<Option<Recipe>> {
        let mut tables = self.0.write().await;
        let updated = tables
            .recipes
            .get_mut(&id)
            .filter(|r| r.is_owned_by(owner))
            .map(|r| {
                r.image = Some(image.to_owned());
                r.clone()
            });
        drop(tables);
        Ok(updated)
    }

    async fn delete(&self, owner: UserId, id: RecipeId) -> RepoResult<bool> {
        let mut tables = self.0.write().await;
        if !tables
            .recipes
            .get(&id)
            .is_some_and(|r| r.is_owned_by(owner))
        {
            return Ok(false);
        }
        tables.recipes.remove(&id);
        drop(tables);
        Ok(true)
    }
}
