//! Error types for mtg_inventory
//!
//! Every failure is unrecoverable at the point raised: errors propagate to
//! `main`, which rolls back the transaction for the whole run.

use reqwest::StatusCode;
use thiserror::Error;

/// Unified error type for inventory operations
#[derive(Debug, Error)]
pub enum InventoryError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP error status code
    #[error("HTTP error: {0}")]
    HttpStatus(StatusCode),
    /// Catalog API returned a blank response body
    #[error("Empty response from catalog API for: {0}")]
    EmptyBody(String),
    /// Failed to parse JSON response
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Card not found on Scryfall
    #[error("Card not found on Scryfall: {0}")]
    NotFound(String),
    #[error("No price information returned")]
    MissingPrice,
    #[error("Invalid price value: {0}")]
    InvalidPrice(String),
    #[error("No card name returned")]
    MissingName,
    #[error("No set name returned")]
    MissingSetName,
    #[error("No type line returned")]
    MissingType,
    #[error("No scryfall id returned")]
    MissingExternalId,
    #[error("No rarity returned")]
    MissingRarity,
    /// Natural-key lookup matched more than one row
    #[error("More than one inventory row for card: {name}, set: {set}, foil: {foil}")]
    DuplicateInventoryRow {
        name: String,
        set: String,
        foil: bool,
    },
    /// A mutating statement affected a row count other than exactly one
    #[error("{operation} affected {rows} rows for card id {card_id}, expected exactly 1")]
    RowCount {
        operation: &'static str,
        card_id: i64,
        rows: usize,
    },
    /// The next-key counter row is missing or could not be advanced
    #[error("Unable to allocate next key for type {key_type}: {reason}")]
    KeyAllocation {
        key_type: &'static str,
        reason: &'static str,
    },
}

/// Result alias for inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;
