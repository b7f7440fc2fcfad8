//! Recipe API CLI - Database migrations and user management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! recipe-cli migrate
//!
//! # Create a regular user
//! recipe-cli user create -e cook@example.com -p secret123 -n "Cook"
//!
//! # Create a superuser
//! recipe-cli user create-superuser -e admin@example.com -p secret123
//! ```
//!
//! Both commands read `RECIPE_DATABASE_URL` (or `DATABASE_URL`), loading a
//! `.env` file if present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "recipe-cli")]
#[command(author, version, about = "Recipe API CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a regular user
    Create {
        /// Email address (stored lower-cased)
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Display name
        #[arg(short, long, default_value = "")]
        name: String,
    },
    /// Create a user with staff and superuser flags
    CreateSuperuser {
        /// Email address (stored lower-cased)
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                password,
                name,
            } => {
                commands::user::create(&email, &password, &name).await?;
            }
            UserAction::CreateSuperuser { email, password } => {
                commands::user::create_superuser(&email, &password).await?;
            }
        },
    }
    Ok(())
}
