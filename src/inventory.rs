//! Inventory reconciliation
//!
//! Decides insert vs. increment-and-reprice for one card, and drives the
//! batch price-refresh sweep. Everything here runs inside the caller's
//! transaction; a single failure aborts the whole run.

use crate::card::{normalize, select_price, NormalizedCard};
use crate::database;
use crate::error::Result;
use crate::scryfall::CardCatalog;
use rusqlite::Transaction;
use std::time::Duration;

/// Minimum delay between successive catalog fetches (API rate limit)
pub const FETCH_DELAY: Duration = Duration::from_millis(100);

/// How a card was reconciled against existing inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Inserted { card_id: i64 },
    Updated { card_id: i64 },
}

/// Fetch one card from the catalog and add `count` copies to the inventory
pub async fn add_card<C: CardCatalog>(
    tx: &Transaction<'_>,
    catalog: &C,
    name: &str,
    set: &str,
    foil: bool,
    count: u16,
) -> Result<Outcome> {
    let record = catalog.fetch_exact(name, set).await?;
    let card = normalize(&record, foil)?;
    let outcome = reconcile(tx, &card, i64::from(count))?;

    match outcome {
        Outcome::Inserted { .. } => log::info!(
            "New card added: {} - {}{} - {}, count: {}",
            card.name,
            card.set_name,
            foil_marker(card.foil),
            card.price,
            count
        ),
        Outcome::Updated { .. } => log::info!(
            "Card count and price updated: {} - {}{} - {}, count: {}",
            card.name,
            card.set_name,
            foil_marker(card.foil),
            card.price,
            count
        ),
    }
    Ok(outcome)
}

/// Reconcile one normalized card against existing inventory
///
/// An existing (name, set, foil) row gets its count incremented by
/// `quantity` and its price overwritten. A new key allocates the next card
/// id and inserts the info, price, and count rows plus one colors row and
/// one mana-cost row per face.
pub fn reconcile(tx: &Transaction<'_>, card: &NormalizedCard, quantity: i64) -> Result<Outcome> {
    if let Some(card_id) = database::get_card_id(tx, &card.name, &card.set_name, card.foil)? {
        database::update_card_count(tx, card_id, quantity)?;
        database::update_card_price(tx, card_id, card.price, &database::now_timestamp())?;
        return Ok(Outcome::Updated { card_id });
    }

    let card_id = database::allocate_card_id(tx)?;
    database::insert_card_info(tx, card_id, card)?;
    database::insert_card_price(tx, card_id, card.price, &database::now_timestamp())?;
    database::insert_card_count(tx, card_id, quantity)?;
    for face in &card.faces {
        database::insert_card_colors(tx, card_id, face)?;
        database::insert_card_mana_cost(tx, card_id, face)?;
    }
    Ok(Outcome::Inserted { card_id })
}

/// Re-fetch every inventoried card by its scryfall id and overwrite its
/// stored price, selected by the stored foil flag
///
/// Counts and face rows are never touched. Successive fetches are spaced
/// by [`FETCH_DELAY`], starting after the first row. Any failure aborts
/// the sweep.
pub async fn update_prices<C: CardCatalog>(tx: &Transaction<'_>, catalog: &C) -> Result<usize> {
    let cards = database::get_all_cards(tx)?;
    let mut updated = 0;

    for (index, stored) in cards.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(FETCH_DELAY).await;
        }

        let record = catalog.fetch_by_id(&stored.scryfall_id).await?;
        let price = select_price(&record, stored.foil)?;
        database::update_card_price(tx, stored.card_id, price, &database::now_timestamp())?;

        log::info!(
            "Price updated: {} - {}{} - {}",
            stored.name,
            stored.set_name,
            foil_marker(stored.foil),
            price
        );
        updated += 1;
    }

    Ok(updated)
}

fn foil_marker(foil: bool) -> &'static str {
    if foil {
        " - FOIL"
    } else {
        ""
    }
}
