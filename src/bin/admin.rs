//! CLI administration tool for user-directory.
//!
//! Provides commands for inspecting users, checking backing services,
//! and removing accounts without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Check database connection
//! cargo run --bin admin -- db check
//!
//! # Check the cache
//! cargo run --bin admin -- cache ping
//!
//! # List users
//! cargo run --bin admin -- users list --page 2 --limit 20
//!
//! # Delete a user (also evicts the cached entry)
//! cargo run --bin admin -- users delete 7f1c2a9e-4d8b-4c1e-9f3a-2b6d5e8c0a11
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `DATABASE_URL` (or `DB_*`) is required, `REDIS_URL`
//! (or `REDIS_*`) is optional.

use user_directory::application::services::{UserService, parse_user_id};
use user_directory::config::{self, Config};
use user_directory::infrastructure::cache::{CacheService, NullCache, RedisCache, UserCache};
use user_directory::infrastructure::persistence::PgUserRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// CLI tool for managing user-directory.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Cache operations
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// List users ordered by creation time
    List {
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },

    /// Delete a user and its preferences
    Delete {
        /// User id (UUID)
        id: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Check cache connectivity
    Ping,
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Users { action } => handle_user_action(action, &config, pool).await?,
        Commands::Cache { action } => handle_cache_action(action, &config).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Opens the configured cache backend, or the no-op cache if Redis is unset.
async fn open_cache(config: &Config) -> Result<Arc<dyn CacheService>> {
    match config.redis_url.as_deref() {
        Some(url) => {
            let redis = RedisCache::connect(url, Duration::from_millis(config.redis_timeout_ms))
                .await
                .context("Failed to connect to Redis")?;
            Ok(Arc::new(redis))
        }
        None => Ok(Arc::new(NullCache::new())),
    }
}

async fn build_service(config: &Config, pool: PgPool) -> Result<UserService<PgUserRepository>> {
    let backend = open_cache(config).await?;
    let cache = Arc::new(UserCache::new(backend, config.cache_ttl_seconds));
    let repository = Arc::new(PgUserRepository::new(Arc::new(pool)));
    Ok(UserService::new(repository, cache))
}

async fn handle_user_action(action: UserAction, config: &Config, pool: PgPool) -> Result<()> {
    let service = build_service(config, pool).await?;

    match action {
        UserAction::List { page, limit } => list_users(&service, page, limit).await?,
        UserAction::Delete { id, yes } => delete_user(&service, &id, yes).await?,
    }

    Ok(())
}

/// Prints one page of users.
///
/// # Output Format
///
/// ```text
/// Users (page 1, 2 of 2)
///
///   ID                                    Name                 Email                          Created
///   ──────────────────────────────────────────────────────────────────────────────────────────────────
///   7f1c2a9e-4d8b-4c1e-9f3a-2b6d5e8c0a11  Ada Lovelace         ada@example.com                2025-01-15 10:30
/// ```
async fn list_users(
    service: &UserService<PgUserRepository>,
    page: u32,
    limit: u32,
) -> Result<()> {
    if page == 0 || !(1..=100).contains(&limit) {
        anyhow::bail!("page must be >= 1 and limit between 1 and 100");
    }

    let (users, total) = service
        .list_users(page, limit)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list users: {}", e))?;

    println!(
        "{}",
        format!("Users (page {}, {} of {})", page, users.len(), total)
            .bright_blue()
            .bold()
    );
    println!();

    if users.is_empty() {
        println!("{}", "  No users found".yellow());
        return Ok(());
    }

    println!(
        "  {:<37} {:<20} {:<30} {}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Email".bright_white().bold(),
        "Created".bright_white().bold()
    );
    println!("  {}", "─".repeat(100).bright_black());

    for user in &users {
        println!(
            "  {:<37} {:<20} {:<30} {}",
            user.id.to_string().bright_black(),
            user.name.cyan(),
            user.email,
            user.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black()
        );
    }
    println!();

    Ok(())
}

/// Deletes a user after confirmation and evicts its cache entry.
async fn delete_user(
    service: &UserService<PgUserRepository>,
    raw_id: &str,
    skip_confirm: bool,
) -> Result<()> {
    let id = parse_user_id(raw_id).map_err(|e| anyhow::anyhow!("{}", e))?;
    let user = service
        .get_user(id)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("{}", "Delete user".bright_blue().bold());
    println!();
    println!("  Name:  {}", user.name.cyan());
    println!("  Email: {}", user.email);
    println!("  ID:    {}", user.id.to_string().bright_black());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this user and its preferences?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    service
        .delete_user(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete user: {}", e))?;

    println!("{}", "User deleted".green().bold());
    Ok(())
}

async fn handle_cache_action(action: CacheAction, config: &Config) -> Result<()> {
    match action {
        CacheAction::Ping => {
            if !config.is_cache_enabled() {
                println!("{}", "Cache is disabled (REDIS_URL not set)".yellow());
                return Ok(());
            }

            println!("{}", "Pinging cache...".bright_blue());
            let cache = open_cache(config).await?;

            if !cache.ping().await {
                anyhow::bail!("Cache ping failed");
            }

            println!("{}", "Cache connection OK".green().bold());
        }
    }

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;
            let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Users:      {}", users.to_string().bright_green().bold());
            println!();
        }
    }

    Ok(())
}
