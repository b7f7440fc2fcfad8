//! User and token repositories.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use recipe_core::{Email, UserId};

use super::conflict_on_unique;
use crate::db::{RepoResult, RepositoryError, TokenRepository, UserRepository};
use crate::models::{NewUser, User, UserUpdate};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    name: String,
    password_hash: String,
    is_active: bool,
    is_staff: bool,
    is_superuser: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            email,
            name: row.name,
            password_hash: row.password_hash,
            is_active: row.is_active,
            is_staff: row.is_staff,
            is_superuser: row.is_superuser,
            created_at: row.created_at,
        })
    }
}

const USER_COLUMNS: &str =
    "id, email, name, password_hash, is_active, is_staff, is_superuser, created_at";

/// Repository for user accounts.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PgUserRepository {
    async fn create(&self, input: NewUser) -> RepoResult<User> {
        let row: UserRow = sqlx::query_as(&format!(
            r"
            INSERT INTO app_user (email, name, password_hash, is_staff, is_superuser)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(input.email.as_str())
        .bind(&input.name)
        .bind(&input.password_hash)
        .bind(input.is_staff)
        .bind(input.is_superuser)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "email already exists"))?;

        row.try_into()
    }

    async fn get_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM app_user WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    async fn get_by_email(&self, email: &Email) -> RepoResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM app_user WHERE email = $1"))
                .bind(email.as_str())
                .fetch_optional(&self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    async fn update(&self, id: UserId, input: UserUpdate) -> RepoResult<User> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r"
            UPDATE app_user
            SET name = COALESCE($2, name),
                password_hash = COALESCE($3, password_hash)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(input.name)
        .bind(input.password_hash)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }
}

/// Repository for API tokens.
#[derive(Clone)]
pub struct PgTokenRepository {
    pool: PgPool,
}

impl PgTokenRepository {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TokenRepository for PgTokenRepository {
    async fn get_or_create(&self, user_id: UserId, candidate: &str) -> RepoResult<String> {
        sqlx::query(
            r"
            INSERT INTO auth_token (key, user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            ",
        )
        .bind(candidate)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        let key: String = sqlx::query_scalar("SELECT key FROM auth_token WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(key)
    }

    async fn find_user(&self, key: &str) -> RepoResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT u.id, u.email, u.name, u.password_hash, u.is_active,
                   u.is_staff, u.is_superuser, u.created_at
            FROM auth_token t
            JOIN app_user u ON u.id = t.user_id
            WHERE t.key = $1
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }
}
