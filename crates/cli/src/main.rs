//! TAS storefront CLI - database migrations and demo data.
//!
//! # Usage
//!
//! ```bash
//! # Apply storefront migrations
//! tas-cli migrate
//!
//! # Insert demo brands, categories and products
//! tas-cli seed
//! ```
//!
//! Both commands read `STOREFRONT_DATABASE_URL` (falling back to
//! `DATABASE_URL`), loading `.env` first if present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tas-cli")]
#[command(author, version, about = "TAS storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Insert demo catalog data (existing rows are left untouched)
    Seed,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await,
        Commands::Seed => commands::seed::catalog().await,
    }
}
