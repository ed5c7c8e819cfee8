//! CLI administration tool for shortlink.
//!
//! Runs mapping operations directly against the database, without going
//! through the HTTP API. Uses the same service rules as the server, so
//! aliases and URLs are validated identically.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL with a generated alias
//! cargo run --bin admin -- save https://example.com/some/long/path
//!
//! # Shorten a URL with a chosen alias
//! cargo run --bin admin -- save https://example.com --alias promo
//!
//! # Look up an alias
//! cargo run --bin admin -- resolve promo
//!
//! # Delete an alias
//! cargo run --bin admin -- delete promo --yes
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_*` components: PostgreSQL connection
//! - `ALIAS_LENGTH`, `ALIAS_MAX_ATTEMPTS`: same meaning and ranges as for the server

use shortlink::application::services::{DEFAULT_MAX_ATTEMPTS, MappingError, MappingService};
use shortlink::config::{load_database_url, parse_or, validate_alias_settings};
use shortlink::infrastructure::persistence::PgUrlRepository;
use shortlink::utils::alias_generator::{DEFAULT_ALIAS_LENGTH, RandomAliasGenerator};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// CLI tool for managing shortlink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Create a short alias for a URL
    Save {
        /// Absolute http(s) URL to shorten
        url: String,

        /// Use this alias instead of generating one
        #[arg(short, long)]
        alias: Option<String>,
    },

    /// Print the URL stored under an alias
    Resolve {
        alias: String,
    },

    /// Delete an alias
    Delete {
        alias: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let database_url = load_database_url()?;
    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Db { action } => handle_db_action(action, &pool).await?,
        command => {
            let service = build_service(pool).await?;
            handle_mapping_command(command, &service).await?;
        }
    }

    Ok(())
}

/// Builds the mapping service over PostgreSQL storage.
async fn build_service(pool: PgPool) -> Result<MappingService> {
    let length = parse_or("ALIAS_LENGTH", DEFAULT_ALIAS_LENGTH);
    let attempts = parse_or("ALIAS_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS);
    validate_alias_settings(length, attempts)?;

    let repository = PgUrlRepository::init(Arc::new(pool))
        .await
        .context("Failed to initialize url storage")?;

    Ok(MappingService::new(
        Arc::new(repository),
        Arc::new(RandomAliasGenerator::new(length)),
    )
    .with_max_attempts(attempts))
}

/// Dispatches save, resolve and delete.
async fn handle_mapping_command(command: Commands, service: &MappingService) -> Result<()> {
    match command {
        Commands::Save { url, alias } => save(service, &url, alias.as_deref()).await,
        Commands::Resolve { alias } => resolve(service, &alias).await,
        Commands::Delete { alias, yes } => delete(service, &alias, yes).await,
        Commands::Db { .. } => Ok(()),
    }
}

async fn save(service: &MappingService, url: &str, alias: Option<&str>) -> Result<()> {
    println!("{}", "🔗 Save URL".bright_blue().bold());
    println!();

    match service.save(url, alias).await {
        Ok(saved) => {
            println!("{}", "✅ Saved".green().bold());
            println!();
            println!("  Alias: {}", saved.alias.bright_yellow().bold());
            println!("  ID:    {}", saved.id.to_string().bright_white());
            println!("  URL:   {}", url.bright_white());
            println!();
            Ok(())
        }
        Err(e) => report(e),
    }
}

async fn resolve(service: &MappingService, alias: &str) -> Result<()> {
    match service.resolve(alias).await {
        Ok(url) => {
            println!("{}", url);
            Ok(())
        }
        Err(e) => report(e),
    }
}

/// Deletes an alias after confirmation.
///
/// Shows the target URL first so the operator can see what is removed.
async fn delete(service: &MappingService, alias: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑️  Delete alias".bright_blue().bold());
    println!();

    let url = match service.resolve(alias).await {
        Ok(url) => url,
        Err(e) => return report(e),
    };

    println!("  Alias: {}", alias.bright_yellow());
    println!("  URL:   {}", url.bright_white());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this alias?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    match service.delete(alias).await {
        Ok(_) => {
            println!("{}", "✅ Alias deleted".green().bold());
            println!();
            Ok(())
        }
        Err(e) => report(e),
    }
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            let mappings = PgUrlRepository::new(Arc::new(pool.clone()))
                .count()
                .await
                .context("Failed to count mappings (has the server run its migrations?)")?;

            println!("{}", "✅ Database connection OK".green().bold());
            println!(
                "  Mappings: {}",
                mappings.to_string().bright_green().bold()
            );
        }
    }

    Ok(())
}

/// Prints a service error and turns it into a failing exit.
fn report(err: MappingError) -> Result<()> {
    match &err {
        MappingError::NotFound(alias) => {
            println!("{} {}", "❌ Alias not found:".red().bold(), alias);
        }
        MappingError::AliasAlreadyExists(alias) => {
            println!("{} {}", "❌ Alias already exists:".red().bold(), alias);
        }
        MappingError::InvalidInput(reason) => {
            println!("{} {}", "❌ Invalid input:".red().bold(), reason);
        }
        _ => {}
    }

    Err(err.into())
}
