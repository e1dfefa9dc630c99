//! Neat Bundle Builder CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run builder database migrations
//! nb-cli migrate
//!
//! # Create a bundle with default settings and steps
//! nb-cli bundle create -s demo.myshopify.com -t "Gift Box"
//!
//! # Drop every cached entry of a bundle
//! nb-cli cache flush -s demo.myshopify.com -b 12
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `bundle create` - Create bundles
//! - `cache flush` - Invalidate cached bundle data

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "nb-cli")]
#[command(author, version, about = "Neat Bundle Builder CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage bundles
    Bundle {
        #[command(subcommand)]
        action: BundleAction,
    },
    /// Manage the bundle-data cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum BundleAction {
    /// Create a bundle with default settings and three steps
    Create {
        /// Shop domain (`*.myshopify.com`)
        #[arg(short, long)]
        shop: String,

        /// Bundle title
        #[arg(short, long)]
        title: String,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Invalidate every cache entry of a bundle
    Flush {
        /// Shop domain (`*.myshopify.com`)
        #[arg(short, long)]
        shop: String,

        /// Bundle ID
        #[arg(short, long)]
        bundle: i32,
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
        Commands::Bundle { action } => match action {
            BundleAction::Create { shop, title } => {
                commands::bundle::create(&shop, &title).await?;
            }
        },
        Commands::Cache { action } => match action {
            CacheAction::Flush { shop, bundle } => {
                commands::cache::flush(&shop, bundle).await?;
            }
        },
    }
    Ok(())
}
