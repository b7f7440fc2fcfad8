//! CLI subcommands.

pub mod migrate;
pub mod user;

use recipe_api::config::{ApiConfig, ConfigError};
use recipe_api::services::AuthError;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// User creation failed.
    #[error("{0}")]
    Auth(#[from] AuthError),
}

/// Load configuration and connect to the database.
async fn connect() -> Result<PgPool, CliError> {
    let config = ApiConfig::from_env()?;
    tracing::info!("Connecting to database...");
    Ok(recipe_api::db::create_pool(&config.database_url).await?)
}
