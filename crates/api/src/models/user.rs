//! User domain types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use recipe_core::{Email, UserId};

/// A registered user.
///
/// The email is the identity key and is always stored normalized.
#[derive(Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Normalized (lower-case) email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Argon2id PHC string. Never serialized.
    pub password_hash: String,
    /// Inactive users cannot obtain or use tokens.
    pub is_active: bool,
    /// Can manage the service.
    pub is_staff: bool,
    /// Has every permission.
    pub is_superuser: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Check a candidate password against the stored hash.
    #[must_use]
    pub fn check_password(&self, candidate: &str) -> bool {
        crate::services::auth::password::verify_password(candidate, &self.password_hash)
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password_hash", &"[REDACTED]")
            .field("is_active", &self.is_active)
            .field("is_staff", &self.is_staff)
            .field("is_superuser", &self.is_superuser)
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.email)
    }
}

/// Input for creating a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub name: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Partial update of the authenticated user's own profile.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub password_hash: Option<String>,
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub email: Email,
    pub name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}
