//! `tinylink` operator CLI.
//!
//! Drives the shortening core against the configured store without an HTTP
//! front-end.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL (prints the JSON response)
//! tinylink shorten example.com/page --short promo --expiry 3600
//!
//! # Resolve a short code
//! tinylink resolve promo
//!
//! # Check the store connection
//! tinylink store check
//! ```
//!
//! With `STORE_BACKEND=memory` every invocation starts from an empty store,
//! so `resolve` only finds codes created through a shared Redis backend.

use tinylink::config::{Config, StoreBackend, load_from_env};
use tinylink::domain::repositories::KeyStore;
use tinylink::dto::ShortenRequest;
use tinylink::error::ShortenError;
use tinylink::infrastructure::store::{MemoryStore, RedisStore};
use tinylink::prelude::{HostValidator, ShorteningService};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// URL shortener core CLI.
#[derive(Parser)]
#[command(name = "tinylink")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shorten a URL
    Shorten {
        /// URL to shorten; `https://` is assumed when no scheme is given
        url: String,

        /// Custom short code (3-32 of letters, digits, '-' or '_')
        #[arg(short, long)]
        short: Option<String>,

        /// Lifetime in seconds (default: DEFAULT_EXPIRY_SECS)
        #[arg(short, long)]
        expiry: Option<u64>,

        /// Client identifier the request is rate-limited under
        #[arg(short, long, default_value = "cli")]
        client: String,
    },

    /// Resolve a short code to its original URL
    Resolve {
        code: String,
    },

    /// Store operations
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// Check store connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_from_env().context("Invalid configuration")?;

    init_tracing(&config);
    config.print_summary();

    let store = open_store(&config).await?;
    let validator = Arc::new(HostValidator::new(&config.public_domain));
    let service = ShorteningService::new(store, validator, config.shortener_settings()?);

    match cli.command {
        Commands::Shorten {
            url,
            short,
            expiry,
            client,
        } => {
            let mut req = ShortenRequest::new(url);
            req.short = short;
            req.expiry = expiry.map(Duration::from_secs);

            match service.shorten(&req, &client).await {
                Ok(resp) => println!("{}", serde_json::to_string_pretty(&resp)?),
                Err(e) => exit_with(&e)?,
            }
        }
        Commands::Resolve { code } => match service.resolve(&code).await {
            Ok(url) => println!("{}", url),
            Err(e) => exit_with(&e)?,
        },
        Commands::Store {
            action: StoreAction::Check,
        } => {
            println!("{}", "🔍 Checking store connection...".bright_blue());

            if service.health_check().await {
                println!(
                    "{}",
                    format!("✅ {} store is reachable", config.store_backend)
                        .green()
                        .bold()
                );
            } else {
                println!(
                    "{}",
                    format!("❌ {} store did not answer", config.store_backend)
                        .red()
                        .bold()
                );
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Installs the tracing subscriber on stderr so stdout carries only command output.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn open_store(config: &Config) -> Result<Arc<dyn KeyStore>> {
    match config.store_backend {
        StoreBackend::Memory => {
            let store = Arc::new(MemoryStore::new());
            store.spawn_sweeper(config.sweep_interval());
            tracing::info!("Store: in-memory");
            Ok(store)
        }
        StoreBackend::Redis => {
            let redis_config = config
                .redis_store_config()
                .context("STORE_BACKEND=redis requires REDIS_URL or REDIS_HOST")?;
            let store = RedisStore::connect(redis_config)
                .await
                .context("Failed to connect to Redis")?;
            Ok(Arc::new(store))
        }
    }
}

/// Prints the error body and exits with a status that separates client from
/// service failures.
fn exit_with(error: &ShortenError) -> Result<()> {
    let body = serde_json::to_string_pretty(&error.to_body())?;
    eprintln!("{}", body.red());

    let code = if error.is_client_error() { 2 } else { 1 };
    std::process::exit(code);
}
