//! # gymsync CLI
//!
//! Keeps the search index in step with the activities and subscriptions
//! services, and seeds the administrator account and plan catalog of a
//! development stack.
//!
//! ## Usage
//!
//! ```bash
//! gymsync --config ./config/gymsync.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `gymsync init` | Create the `usuarios` table on a SQLite user store |
//! | `gymsync sources` | List configured sources and the index endpoint |
//! | `gymsync sync <source>` | Index `activities`, `plans`, `plans-store`, or `all` |
//! | `gymsync seed admin` | Upsert the administrator account |
//! | `gymsync seed plans` | Create the plan catalog and index the created plans |
//! | `gymsync seed plans --store` | Replace the document-store plan collection with the catalog |
//!
//! Without a config file every endpoint falls back to the local
//! docker-compose defaults. Logs go to stderr (`RUST_LOG`, `-v`); summaries
//! go to stdout.

use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use gym_index_sync::sync::SyncOptions;
use gym_index_sync::{admin, config, migrate, plans, sources, sync};

/// Search-index synchronization and seeding for the gym services.
#[derive(Parser)]
#[command(name = "gymsync", version, about)]
struct Cli {
    /// Path to configuration file (TOML). Missing file means local defaults.
    #[arg(long, global = true, default_value = "./config/gymsync.toml")]
    config: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the users table on a SQLite user store.
    ///
    /// Idempotent. Refuses MySQL stores, whose schema belongs to the
    /// users service.
    Init,

    /// List configured sources and the index endpoint.
    Sources,

    /// Index records from a source into the search API.
    ///
    /// Source: `activities`, `plans`, `plans-store`, or `all`
    /// (activities then plans).
    Sync {
        source: String,

        /// Fetch and transform only; submit nothing.
        #[arg(long)]
        dry_run: bool,

        /// Maximum number of records to process (at least 1).
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        limit: Option<u64>,
    },

    /// Seed the user store or the plan catalog.
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Upsert the administrator account into the user store.
    Admin,
    /// Create the catalog plans through the subscriptions API and index them.
    Plans {
        /// Replace the document-store plan collection instead; index
        /// afterwards with `sync plans-store`.
        #[arg(long)]
        store: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("User store initialized successfully.");
        }
        Commands::Sources => {
            sources::list_sources(&cfg)?;
        }
        Commands::Sync {
            source,
            dry_run,
            limit,
        } => {
            let limit = limit.map(|l| usize::try_from(l).unwrap_or(usize::MAX));
            sync::run_sync(&cfg, &source, SyncOptions { dry_run, limit }).await?;
        }
        Commands::Seed { target } => match target {
            SeedTarget::Admin => {
                admin::run_seed_admin(&cfg).await?;
            }
            SeedTarget::Plans { store: false } => {
                plans::run_seed_plans(&cfg).await?;
            }
            SeedTarget::Plans { store: true } => {
                plans::run_seed_plan_store(&cfg).await?;
            }
        },
    }

    Ok(())
}
