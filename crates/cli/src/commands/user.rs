//! User management commands.
//!
//! ```bash
//! recipe-cli user create -e cook@example.com -p secret123 -n "Cook"
//! recipe-cli user create-superuser -e admin@example.com -p secret123
//! ```

use recipe_api::db::PgStore;
use recipe_api::services::AuthService;

use super::{CliError, connect};

/// Create a regular user.
///
/// # Errors
///
/// Returns `CliError::Auth` for an invalid or taken email.
pub async fn create(email: &str, password: &str, name: &str) -> Result<(), CliError> {
    let store = PgStore::new(connect().await?);
    let user = AuthService::new(&store)
        .create_user(email, password, name)
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(())
}

/// Create a user with staff and superuser flags.
///
/// # Errors
///
/// Returns `CliError::Auth` for an invalid or taken email.
pub async fn create_superuser(email: &str, password: &str) -> Result<(), CliError> {
    let store = PgStore::new(connect().await?);
    let user = AuthService::new(&store)
        .create_superuser(email, password)
        .await?;

    tracing::info!(
        "Superuser created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(())
}
