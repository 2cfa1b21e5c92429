//! Scryfall API client for fetching card data
//!
//! Uses async reqwest for non-blocking HTTP requests. The client is a
//! plain value constructed once per run and passed to the operations that
//! need it; tests substitute a fake through the [`CardCatalog`] trait.

use crate::error::{InventoryError, Result};
use serde::Deserialize;

/// Base URL for card lookups
pub const SCRYFALL_BASE: &str = "https://api.scryfall.com/cards";

const USER_AGENT: &str = "mtg_inventory/1.0";

/// Scryfall card response
///
/// Every field is optional: the normalizer decides which absences are
/// fatal, not the decoder.
#[derive(Debug, Clone, Deserialize)]
pub struct ScryfallCard {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub set_name: Option<String>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub layout: Option<String>,
    /// For split/flip/transform cards, per-face data lives in card_faces
    #[serde(default)]
    pub card_faces: Option<Vec<CardFace>>,
    #[serde(default)]
    pub prices: ScryfallPrices,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScryfallPrices {
    pub usd: Option<String>,
    pub usd_foil: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardFace {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub mana_cost: Option<String>,
}

/// Source of catalog records
///
/// Production uses [`ScryfallClient`]; tests provide an in-memory fake.
#[allow(async_fn_in_trait)]
pub trait CardCatalog {
    /// Exact lookup by card name and set code
    async fn fetch_exact(&self, name: &str, set: &str) -> Result<ScryfallCard>;
    /// Lookup by the card's scryfall id
    async fn fetch_by_id(&self, scryfall_id: &str) -> Result<ScryfallCard>;
}

/// HTTP client for the Scryfall cards API
pub struct ScryfallClient {
    http: reqwest::Client,
    base_url: String,
}

impl ScryfallClient {
    pub fn new() -> Self {
        Self::with_base_url(SCRYFALL_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        ScryfallClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch one card and decode it, treating a blank body as fatal
    async fn get_card(&self, url: &str, context: &str) -> Result<ScryfallCard> {
        log::debug!("Fetching card from Scryfall: {}", url);

        let response = self
            .http
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InventoryError::HttpStatus(status));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(InventoryError::EmptyBody(context.to_string()));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

impl Default for ScryfallClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CardCatalog for ScryfallClient {
    async fn fetch_exact(&self, name: &str, set: &str) -> Result<ScryfallCard> {
        let url = format!(
            "{}/named?exact={}&set={}",
            self.base_url,
            encode_name(name),
            urlencoding::encode(set)
        );
        match self.get_card(&url, name).await {
            Err(InventoryError::HttpStatus(status)) if status == reqwest::StatusCode::NOT_FOUND => {
                Err(InventoryError::NotFound(format!("{}, set: {}", name, set)))
            }
            result => result,
        }
    }

    async fn fetch_by_id(&self, scryfall_id: &str) -> Result<ScryfallCard> {
        let url = format!("{}/{}", self.base_url, scryfall_id);
        self.get_card(&url, scryfall_id).await
    }
}

/// Encode a card name for a query string, with spaces as `+` per the
/// Scryfall named-lookup convention
fn encode_name(name: &str) -> String {
    urlencoding::encode(name).replace("%20", "+")
}

#[cfg(test)]
#[path = "scryfall_tests.rs"]
mod tests;
