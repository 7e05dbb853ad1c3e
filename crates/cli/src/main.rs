//! coledzh shop CLI - database migrations and admin accounts.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! coledzh-cli migrate
//!
//! # Create an admin account (password may come from SHOP_ADMIN_PASSWORD)
//! coledzh-cli admin create --login root --email root@coledzh.shop --password '...'
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "coledzh-cli")]
#[command(author, version, about = "coledzh shop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a verified admin account
    Create {
        /// Admin login
        #[arg(short, long)]
        login: String,

        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin password
        #[arg(short, long, env = "SHOP_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                login,
                email,
                password,
            } => {
                commands::admin::create_admin(&login, &email, &password).await?;
            }
        },
    }
    Ok(())
}
