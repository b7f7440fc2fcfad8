//! Authentication service.
//!
//! Provides account creation, password login issuing API tokens, token
//! resolution, and self-service profile updates.

mod error;
pub mod password;

pub use error::AuthError;

use recipe_core::Email;

use crate::db::{RepositoryError, Store, TokenRepository, UserRepository};
use crate::models::{MAX_NAME_LENGTH, NewUser, User, UserUpdate};

use password::{hash_password, validate_password};

/// Authentication service.
///
/// Borrows the store for the duration of one operation.
pub struct AuthService<'a, S> {
    store: &'a S,
}

impl<'a, S: Store> AuthService<'a, S> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    // =========================================================================
    // Account creation
    // =========================================================================

    /// Create a regular user.
    ///
    /// The email is normalized before it is stored and the password is hashed.
    /// No password policy is applied here; see [`Self::register`].
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email is empty or malformed.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<User, AuthError> {
        self.insert(email, password, name, false).await
    }

    /// Create a user with staff and superuser flags set.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_user`].
    pub async fn create_superuser(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.insert(email, password, "", true).await
    }

    /// Self-service registration. Enforces the password policy before
    /// creating a regular user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password is too short, and
    /// anything [`Self::create_user`] returns.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<User, AuthError> {
        validate_password(password)?;
        self.create_user(email, password, name).await
    }

    async fn insert(
        &self,
        email: &str,
        password: &str,
        name: &str,
        privileged: bool,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let name = validate_user_name(name)?;
        let password_hash = hash_password(password)?;

        let user = self
            .store
            .users()
            .create(NewUser {
                email,
                name,
                password_hash,
                is_staff: privileged,
                is_superuser: privileged,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, superuser = privileged, "User created");
        Ok(user)
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    /// Exchange email and password for the user's API token, creating the
    /// token on first login.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown, the
    /// password is wrong, or the account is inactive.
    pub async fn issue_token(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Err(AuthError::InvalidCredentials);
        };

        let user = self
            .store
            .users()
            .get_by_email(&email)
            .await?
            .filter(|user| user.is_active && user.check_password(password));

        let Some(user) = user else {
            tracing::warn!("Failed login attempt");
            return Err(AuthError::InvalidCredentials);
        };

        let token = self
            .store
            .tokens()
            .get_or_create(user.id, &generate_token())
            .await?;

        tracing::info!(user_id = %user.id, "API token issued");
        Ok(token)
    }

    /// Resolve an API token to its active user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` if the token is unknown or belongs
    /// to an inactive user.
    pub async fn authenticate(&self, key: &str) -> Result<User, AuthError> {
        self.store
            .tokens()
            .find_user(key)
            .await?
            .filter(|user| user.is_active)
            .ok_or(AuthError::Unauthorized)
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Update the user's own name and/or password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` or `AuthError::Validation` for bad
    /// input, `AuthError::Repository` if the update fails.
    pub async fn update_profile(
        &self,
        user: &User,
        name: Option<&str>,
        password: Option<&str>,
    ) -> Result<User, AuthError> {
        let name = name.map(validate_user_name).transpose()?;
        let password_hash = match password {
            Some(password) => {
                validate_password(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        let updated = self
            .store
            .users()
            .update(
                user.id,
                UserUpdate {
                    name,
                    password_hash,
                },
            )
            .await?;
        Ok(updated)
    }
}

/// Generate a 40-character hex API token.
fn generate_token() -> String {
    hex::encode(rand::random::<[u8; 20]>())
}

fn validate_user_name(name: &str) -> Result<String, AuthError> {
    let name = name.trim();
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AuthError::Validation(format!(
            "name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use recipe_core::EmailError;

    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn test_generate_token_format() {
        let token = generate_token();
        assert_eq!(token.len(), 40);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[tokio::test]
    async fn test_create_user_with_email_successful() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let user = auth
            .create_user("test@example.com", "testpass123", "")
            .await
            .unwrap();

        assert_eq!(user.email.as_str(), "test@example.com");
        assert!(user.check_password("testpass123"));
        assert!(!user.check_password("wrong"));
        assert!(!user.is_staff);
        assert!(!user.is_superuser);
    }

    #[tokio::test]
    async fn test_new_user_email_normalized() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        for (i, (raw, expected)) in [
            ("test1@EXAMPLE.com", "test1@example.com"),
            ("Test2@Example.com", "test2@example.com"),
            ("TEST3@EXAMPLE.COM", "test3@example.com"),
            ("test4@example.COM", "test4@example.com"),
        ]
        .into_iter()
        .enumerate()
        {
            let user = auth.create_user(raw, "sample123", "").await.unwrap();
            assert_eq!(user.email.as_str(), expected, "case {i}");
        }
    }

    #[tokio::test]
    async fn test_new_user_without_email_raises_error() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let err = auth.create_user("", "test123", "").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(EmailError::Empty)));
    }

    #[tokio::test]
    async fn test_create_superuser() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let user = auth
            .create_superuser("test@example.com", "test123")
            .await
            .unwrap();
        assert!(user.is_staff);
        assert!(user.is_superuser);
    }

    #[tokio::test]
    async fn test_duplicate_email_after_normalization() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        auth.create_user("dup@example.com", "pass123", "")
            .await
            .unwrap();
        let err = auth
            .create_user("DUP@Example.com", "pass123", "")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn test_register_enforces_password_length() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let err = auth
            .register("short@example.com", "pw", "Test")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(_)));
        assert!(
            store
                .users()
                .get_by_email(&Email::parse("short@example.com").unwrap())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_issue_token_and_authenticate() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        let user = auth
            .create_user("test@example.com", "testpass", "Test")
            .await
            .unwrap();

        let token = auth
            .issue_token("TEST@example.com", "testpass")
            .await
            .unwrap();
        let again = auth
            .issue_token("test@example.com", "testpass")
            .await
            .unwrap();
        assert_eq!(token, again);

        let resolved = auth.authenticate(&token).await.unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn test_issue_token_bad_credentials() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        auth.create_user("test@example.com", "goodpass", "")
            .await
            .unwrap();

        for (email, password) in [
            ("test@example.com", "badpass"),
            ("nobody@example.com", "goodpass"),
            ("", "goodpass"),
        ] {
            let err = auth.issue_token(email, password).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials));
        }
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        let err = auth.authenticate("deadbeef").await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        let user = auth
            .create_user("test@example.com", "oldpass", "Old")
            .await
            .unwrap();

        let updated = auth
            .update_profile(&user, Some("New Name"), Some("newpass123"))
            .await
            .unwrap();
        assert_eq!(updated.name, "New Name");
        assert!(updated.check_password("newpass123"));
        assert!(!updated.check_password("oldpass"));

        let err = auth
            .update_profile(&updated, None, Some("pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(_)));
    }
}
