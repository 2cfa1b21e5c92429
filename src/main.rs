//! MTG Card Inventory CLI
//!
//! `add` inventories copies of one printing fetched from Scryfall;
//! `updateprices` refreshes stored prices for every inventoried card.
//! Each run holds a single transaction that commits or rolls back as a
//! whole.

use clap::{Parser, Subcommand, ValueEnum};
use mtg_inventory::scryfall::ScryfallClient;
use mtg_inventory::{database, inventory};
use rusqlite::Connection;
use std::path::PathBuf;

/// MTG card inventory - tracks a collection and its prices in SQLite
#[derive(Parser, Debug)]
#[command(name = "mtg_inventory")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, default_value_t = default_db_path())]
    database: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add copies of a card to the inventory
    Add {
        /// Exact card name
        name: String,
        /// Set code, e.g. "lea"
        set: String,
        /// Whether this printing is a foil
        #[arg(value_enum)]
        foil: Foil,
        /// Number of copies to add
        #[arg(default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
        count: u16,
    },
    /// Refresh stored prices for every inventoried card
    #[command(name = "updateprices")]
    UpdatePrices,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Foil {
    Yes,
    No,
}

/// Returns the default database path: ~/.local/share/mtg_inventory/inventory.db
fn default_db_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mtg_inventory")
        .join("inventory.db")
        .to_string_lossy()
        .to_string()
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> mtg_inventory::Result<()> {
    let db_path = PathBuf::from(&args.database);
    if let Some(parent) = db_path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
            log::info!("Created directory: {}", parent.display());
        }
    }

    let mut conn = Connection::open(&db_path)?;
    log::info!("Opened database: {}", db_path.display());
    database::init_schema(&conn)?;

    let catalog = ScryfallClient::new();
    let tx = conn.transaction()?;

    let result = match &args.command {
        Command::Add {
            name,
            set,
            foil,
            count,
        } => inventory::add_card(&tx, &catalog, name, set, matches!(foil, Foil::Yes), *count)
            .await
            .map(|_| ()),
        Command::UpdatePrices => inventory::update_prices(&tx, &catalog).await.map(|updated| {
            log::info!("Updated prices for {} card(s)", updated);
        }),
    };

    match result {
        Ok(()) => {
            tx.commit()?;
            log::info!("Transaction committed");
            Ok(())
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback() {
                log::error!("Error rolling back transaction: {}", rollback_err);
            } else {
                log::info!("Transaction rolled back");
            }
            Err(e)
        }
    }
}
