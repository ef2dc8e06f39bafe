//! # Tavola CLI
//!
//! Back-office command line for the settings screens.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          tavola (binary)                                │
//! │                                                                         │
//! │  args ──► EntityKind ──► run::<E>() ──► SettingsController<E, Sqlite>  │
//! │                                               │                         │
//! │                             list / import / export / add               │
//! │                                               │                         │
//! │                                               ▼                         │
//! │                                       SQLite (tavola.db)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Paths
//! - Database: `--db`, else `TAVOLA_DB_PATH`, else the platform data dir
//! - Config: `--config`, else the platform config dir (`settings.toml`)

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tavola_core::{
    validation, Absent, Charges, Customer, Employee, Entity, EntityKind, MarketItem, Payment,
};
use tavola_db::{Database, DbConfig, EntityRepository, StoredEntity};
use tavola_settings::{
    ControllerConfig, ExportOutcome, ImportOutcome, JsonFile, SettingsController,
};

/// How long a command waits for the live query to load the list.
const LOAD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Parser)]
#[command(name = "tavola", version, about = "Tavola back-office settings")]
struct Cli {
    /// SQLite database file
    #[arg(long, short = 'd', global = true)]
    db: Option<PathBuf>,

    /// Controller config file (TOML)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// charges, customers, employees, absents, payments or market-items
    entity: EntityKind,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the list, optionally filtered
    List {
        #[arg(long, short = 'q')]
        query: Option<String>,
    },

    /// Merge entities from a JSON file into the database
    Import {
        file: PathBuf,

        /// Only merge rows with these ids
        #[arg(long, short = 's', num_args = 1..)]
        select: Vec<i64>,
    },

    /// Write the (filtered, selected) list to a JSON file
    Export {
        file: PathBuf,

        #[arg(long, short = 'q')]
        query: Option<String>,

        /// Only export rows with these ids
        #[arg(long, short = 's', num_args = 1..)]
        select: Vec<i64>,
    },

    /// Validate and insert a single entity given as JSON
    Add {
        #[arg(long)]
        json: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = ControllerConfig::load(cli.config.clone()).context("loading settings config")?;

    let db_path = database_path(cli.db.clone())?;
    info!(path = %db_path.display(), entity = %cli.entity, "Opening database");
    let db = Database::new(DbConfig::new(&db_path)).await?;

    let result = match cli.entity {
        EntityKind::Charges => run::<Charges>(&db, &config, cli.command).await,
        EntityKind::Customer => run::<Customer>(&db, &config, cli.command).await,
        EntityKind::Employee => run::<Employee>(&db, &config, cli.command).await,
        EntityKind::Absent => run::<Absent>(&db, &config, cli.command).await,
        EntityKind::Payment => run::<Payment>(&db, &config, cli.command).await,
        EntityKind::MarketItem => run::<MarketItem>(&db, &config, cli.command).await,
    };

    db.close().await;
    result
}

/// Runs one command against the screen for `E`.
async fn run<E: StoredEntity>(db: &Database, config: &ControllerConfig, command: Command) -> Result<()> {
    let mut screen = SettingsController::<E, _>::for_database(db, config);

    match command {
        Command::List { query } => {
            if let Some(query) = query {
                validation::validate_search_query(&query)?;
                screen.search_text_changed(query);
            }
            let items = load(&screen).await?;

            for item in &items {
                println!("{}\t{}", item.record_id(), serde_json::to_string(item)?);
            }
            println!("{} {} row(s)", items.len(), E::KIND);
        }

        Command::Import { file, select } => {
            let buffered = screen.import_from_source(&JsonFile::new(&file)).await;
            debug!(file = %file.display(), buffered, "Import file read");

            for id in select {
                screen.select_item(id);
            }

            match screen.import_items_to_database().await {
                ImportOutcome::Imported { count } => {
                    println!("Imported {} {} row(s) from {}", count, E::KIND, file.display());
                }
                ImportOutcome::Failed { message } => bail!(message),
            }
        }

        Command::Export { file, query, select } => {
            if let Some(query) = query {
                validation::validate_search_query(&query)?;
                screen.search_text_changed(query);
            }
            load(&screen).await?;

            for id in select {
                screen.select_item(id);
            }

            let path = config.export_path(&file);
            match screen.export_items(&JsonFile::new(&path)).await {
                ExportOutcome::Exported { count } => {
                    println!("Exported {} {} row(s) to {}", count, E::KIND, path.display());
                }
                ExportOutcome::Failed { message } => bail!(message),
            }
        }

        Command::Add { json } => {
            let item: E = serde_json::from_str(&json).context("parsing entity JSON")?;
            item.validate()?;

            let id = item.record_id();
            screen.repository().insert(item).await?;
            println!("Added {} {}", E::KIND, id);
        }
    }

    Ok(())
}

/// Waits for the list matching the current query.
async fn load<E: StoredEntity, R: EntityRepository<E>>(
    screen: &SettingsController<E, R>,
) -> Result<Vec<E>> {
    let snapshot = tokio::time::timeout(LOAD_TIMEOUT, screen.settled())
        .await
        .map_err(|_| anyhow!("timed out loading {} list", E::KIND))?;

    debug!(query = %snapshot.query, count = snapshot.items.len(), "List loaded");
    Ok(snapshot.items)
}

/// Initializes the tracing subscriber for structured logging.
///
/// Default filter: `info,tavola=debug,sqlx=warn`. Override with `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tavola=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines the database file path.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.tavola.tavola/tavola.db`
/// - **Windows**: `%APPDATA%\tavola\tavola\data\tavola.db`
/// - **Linux**: `~/.local/share/tavola/tavola.db`
fn database_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Ok(path) = std::env::var("TAVOLA_DB_PATH") {
        return Ok(PathBuf::from(path));
    }

    let dirs = ProjectDirs::from("com", "tavola", "tavola")
        .ok_or_else(|| anyhow!("could not determine app data directory"))?;
    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("tavola.db"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_export_with_selection() {
        let cli = Cli::try_parse_from([
            "tavola", "--db", "/tmp/t.db", "market-items", "export", "out.json", "--select", "3", "7",
        ])
        .unwrap();

        assert_eq!(cli.entity, EntityKind::MarketItem);
        match cli.command {
            Command::Export { file, query, select } => {
                assert_eq!(file, PathBuf::from("out.json"));
                assert_eq!(query, None);
                assert_eq!(select, vec![3, 7]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_entity_is_rejected() {
        assert!(Cli::try_parse_from(["tavola", "invoices", "list"]).is_err());
    }
}
