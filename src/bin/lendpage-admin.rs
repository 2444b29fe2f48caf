use std::path::PathBuf;

use clap::{Parser, Subcommand};

use lendpage::config::{self, StorageBackend};
use lendpage::storage::{LeadStore, SqliteStore};

#[derive(Parser)]
#[command(name = "lendpage-admin")]
#[command(about = "Maintenance CLI for the lendpage lead database", long_about = None)]
struct Cli {
    /// Path to the server's TOML configuration file.
    #[arg(short, long, env = "LENDPAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Database URL; overrides the configuration.
    #[arg(short, long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the leads table if it does not exist
    Migrate,
    /// Print captured leads as JSON, oldest first
    List {
        /// Only print the most recent N leads
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(url) = cli.database_url {
        config.storage.database_url = url;
    }
    if config.storage.backend == StorageBackend::Memory {
        eprintln!("note: storage.backend is \"memory\"; operating on {}", config.storage.database_url);
    }

    let store = SqliteStore::connect(&config.storage).await?;

    match cli.command {
        Commands::Migrate => {
            store.migrate().await?;
            println!("Migrated {}", config.storage.database_url);
        }
        Commands::List { limit } => {
            let mut leads = store.list().await?;
            if let Some(limit) = limit {
                let skip = leads.len().saturating_sub(limit);
                leads.drain(..skip);
            }
            println!("{}", serde_json::to_string_pretty(&leads)?);
        }
    }

    store.close().await;
    Ok(())
}
