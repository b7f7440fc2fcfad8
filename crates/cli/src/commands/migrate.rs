//! Database migration command.
//!
//! Applies every pending migration from `crates/api/migrations/`.
//!
//! ```bash
//! recipe-cli migrate
//! ```

use super::{CliError, connect};

/// Run pending database migrations.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
