//! # Editorial Insights CLI (`insights`)
//!
//! ## Usage
//!
//! ```bash
//! insights --config ./config/insights.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `insights init` | Create the SQLite schema |
//! | `insights status` | Show analytics availability and cache settings |
//! | `insights abilities` | List registered abilities |
//! | `insights call <name> --param k=v` | Run an ability locally and print JSON |
//! | `insights cache clear` | Delete cached results under the configured prefix |
//! | `insights serve` | Start the HTTP + MCP server |
//!
//! ## Examples
//!
//! ```bash
//! insights call get-top-posts --param days=7 --param limit=5
//! insights call editorial-insights/get-stale-drafts --param days_old=365
//! RUST_LOG=editorial_insights=debug insights serve
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use editorial_insights::{cache, call, config, migrate, server, status};

/// Editorial Insights: read-only content analytics abilities for AI
/// assistants.
#[derive(Parser)]
#[command(
    name = "insights",
    about = "Editorial Insights: read-only content analytics abilities for AI assistants",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/insights.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the posts, categories, post_categories and transients
    /// tables. Safe to run repeatedly.
    Init,

    /// Show analytics connection status and cache settings.
    Status,

    /// List registered abilities with their required capability.
    Abilities,

    /// Run an ability as the local operator.
    Call {
        /// Ability name, e.g. `get-top-posts` or `editorial-insights/get-top-posts`.
        name: String,

        /// Input parameters as `key=value` pairs.
        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },

    /// Manage cached results.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Start the HTTP + MCP server on `[server].bind`.
    Serve,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Delete every cached entry under the configured prefix.
    Clear,
}

/// Parse a `key=value` pair for `--param` arguments.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("insights=info,editorial_insights=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let cfg = match cli.command {
        // Listing needs no database or credentials.
        Commands::Abilities => {
            config::load_config(&cli.config).unwrap_or_else(|_| config::Config::minimal())
        }
        _ => config::load_config(&cli.config)?,
    };

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Status => {
            status::run_status(&cfg)?;
        }
        Commands::Abilities => {
            call::list_abilities(&cfg)?;
        }
        Commands::Call { name, params } => {
            call::run_call(&cfg, &name, &params).await?;
        }
        Commands::Cache {
            action: CacheAction::Clear,
        } => {
            cache::run_cache_clear(&cfg).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
