//! MTG Card Inventory
//!
//! Fetches card data from the Scryfall API and tracks a card collection in
//! SQLite. `add` inventories copies of a single printing, `updateprices`
//! refreshes stored prices for every card already inventoried.

pub mod card;
pub mod database;
pub mod error;
pub mod inventory;
pub mod scryfall;

pub use card::{normalize, FaceAttributes, NormalizedCard};
pub use error::{InventoryError, Result};
pub use inventory::Outcome;
pub use scryfall::{CardCatalog, ScryfallCard, ScryfallClient};
