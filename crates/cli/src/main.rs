//! Animart CLI - Database migrations and catalog seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! animart migrate
//!
//! # Load products from a YAML file
//! animart seed --file crates/cli/seed/products.yaml
//!
//! # Validate a seed file without touching the database
//! animart seed --file crates/cli/seed/products.yaml --dry-run
//! ```
//!
//! # Environment Variables
//!
//! - `ANIMART_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "animart")]
#[command(author, version, about = "Animart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Add products from a YAML seed file to the catalog
    Seed {
        /// Path to the YAML file
        #[arg(short, long)]
        file: PathBuf,

        /// Validate every entry without connecting to the database
        #[arg(long)]
        dry_run: bool,
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

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed { file, dry_run } => commands::seed::run(&file, dry_run).await,
    }
}
