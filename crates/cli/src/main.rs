//! Tienda CLI - Database setup and ad-hoc queries.
//!
//! # Usage
//!
//! ```bash
//! # Create the database if absent, create tables, seed, print the overview
//! tienda setup
//!
//! # Drop and recreate the database first
//! tienda setup --reset
//!
//! # Seed from another fixture file
//! tienda setup --reset --seed-file fixtures/seed.yaml
//!
//! # Run a statement (default: SELECT * FROM ordenes)
//! tienda query "SELECT * FROM productos WHERE precio > \$1" --param 300
//!
//! # Print the sample-data overview
//! tienda report
//! ```
//!
//! # Commands
//!
//! - `setup` - Provision and seed the target database
//! - `query` - Run one statement and print the result table
//! - `report` - Print the sample-data overview
//!
//! Connection settings come from `DB_*` environment variables (see
//! `tienda_store::config`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use tienda_core::DatabaseName;
use tienda_store::{DatabaseConfig, QueryParam};

mod commands;

const DEFAULT_DB_NAME: &str = "tienda_db";
const DEFAULT_QUERY: &str = "SELECT * FROM ordenes";

#[derive(Parser)]
#[command(name = "tienda")]
#[command(author, version, about = "Tienda database tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and tables, then seed sample data
    Setup {
        /// Drop and recreate the database first (terminates its sessions)
        #[arg(long)]
        reset: bool,

        /// Target database
        #[arg(long, default_value = DEFAULT_DB_NAME)]
        db_name: DatabaseName,

        /// Fixture file to seed instead of the bundled sample data
        #[arg(long)]
        seed_file: Option<PathBuf>,
    },
    /// Run one SQL statement and print its result
    Query {
        /// Target database
        #[arg(long, default_value = DEFAULT_DB_NAME)]
        db_name: DatabaseName,

        /// Positional parameter for `$1`, `$2`, ... (repeatable)
        #[arg(long = "param", value_name = "VALUE")]
        params: Vec<QueryParam>,

        /// Statement to run
        #[arg(default_value = DEFAULT_QUERY)]
        sql: String,
    },
    /// Print the sample-data overview
    Report {
        /// Target database
        #[arg(long, default_value = DEFAULT_DB_NAME)]
        db_name: DatabaseName,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tienda=info,tienda_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = DatabaseConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Setup {
            reset,
            db_name,
            seed_file,
        } => {
            commands::setup::run(&config, &db_name, reset, seed_file.as_deref()).await?;
        }
        Commands::Query {
            db_name,
            params,
            sql,
        } => commands::query::run(&config, &db_name, &sql, &params).await?,
        Commands::Report { db_name } => commands::report::run(&config, &db_name).await?,
    }
    Ok(())
}
