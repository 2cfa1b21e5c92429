//! Database operations for the card inventory
//!
//! Uses parameterized queries exclusively (no SQL string concatenation).
//! Every function here runs inside the caller's transaction; this module
//! never commits or rolls back itself. Each mutating statement must affect
//! exactly one row, checked as an explicit postcondition.

use crate::card::{FaceAttributes, NormalizedCard};
use crate::error::{InventoryError, Result};
use rusqlite::{params, Connection, OptionalExtension, Transaction};

/// Key type label for card id allocation in next_keys
pub const CARD_ID_KEY: &str = "CARDID";

/// Initialize the database schema
///
/// Creates the five inventory tables plus the next-key counter table if
/// they don't exist, and seeds the CARDID counter on first init. Card ids
/// are minted from next_keys, never from SQLite autoincrement.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS card_info (
            card_id INTEGER PRIMARY KEY,
            scryfall_id TEXT NOT NULL,
            card_name TEXT NOT NULL,
            set_name TEXT NOT NULL,
            type_line TEXT NOT NULL,
            rarity TEXT NOT NULL,
            foil INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_card_info_natural_key
            ON card_info(card_name, set_name, foil);

        CREATE TABLE IF NOT EXISTS card_price (
            card_id INTEGER PRIMARY KEY,
            price REAL NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (card_id) REFERENCES card_info(card_id)
        );

        CREATE TABLE IF NOT EXISTS card_count (
            card_id INTEGER PRIMARY KEY,
            count INTEGER NOT NULL,
            FOREIGN KEY (card_id) REFERENCES card_info(card_id)
        );

        CREATE TABLE IF NOT EXISTS card_colors (
            card_id INTEGER NOT NULL,
            sequence INTEGER NOT NULL,
            blue INTEGER NOT NULL,
            black INTEGER NOT NULL,
            red INTEGER NOT NULL,
            green INTEGER NOT NULL,
            white INTEGER NOT NULL,
            PRIMARY KEY (card_id, sequence),
            FOREIGN KEY (card_id) REFERENCES card_info(card_id)
        );

        CREATE TABLE IF NOT EXISTS card_mana_cost (
            card_id INTEGER NOT NULL,
            sequence INTEGER NOT NULL,
            uncolored INTEGER NOT NULL,
            blue INTEGER NOT NULL,
            black INTEGER NOT NULL,
            red INTEGER NOT NULL,
            green INTEGER NOT NULL,
            white INTEGER NOT NULL,
            hybrid INTEGER NOT NULL,
            PRIMARY KEY (card_id, sequence),
            FOREIGN KEY (card_id) REFERENCES card_info(card_id)
        );

        CREATE TABLE IF NOT EXISTS next_keys (
            key_type TEXT PRIMARY KEY,
            next_key INTEGER NOT NULL
        );

        INSERT OR IGNORE INTO next_keys (key_type, next_key) VALUES ('CARDID', 1);
        ",
    )?;

    log::info!("Database schema initialized");
    Ok(())
}

/// A card_info row as needed by the price-refresh sweep
#[derive(Debug, Clone)]
pub struct StoredCard {
    pub card_id: i64,
    pub scryfall_id: String,
    pub name: String,
    pub set_name: String,
    pub foil: bool,
}

/// Look up a card id by its natural key (name, set, foil)
///
/// At most one row may match; more than one is a consistency error, never
/// silently resolved.
pub fn get_card_id(
    tx: &Transaction<'_>,
    name: &str,
    set_name: &str,
    foil: bool,
) -> Result<Option<i64>> {
    let mut stmt = tx.prepare_cached(
        "SELECT card_id FROM card_info
         WHERE card_name = ?1 AND set_name = ?2 AND foil = ?3",
    )?;
    let ids: Vec<i64> = stmt
        .query_map(params![name, set_name, foil], |row| row.get(0))?
        .collect::<rusqlite::Result<_>>()?;

    match ids.as_slice() {
        [] => Ok(None),
        [id] => Ok(Some(*id)),
        _ => Err(InventoryError::DuplicateInventoryRow {
            name: name.to_string(),
            set: set_name.to_string(),
            foil,
        }),
    }
}

/// Mint a new card id from the CARDID counter
///
/// Read-then-increment within the ambient transaction; single-writer only.
pub fn allocate_card_id(tx: &Transaction<'_>) -> Result<i64> {
    let next: Option<i64> = tx
        .query_row(
            "SELECT next_key FROM next_keys WHERE key_type = ?1",
            params![CARD_ID_KEY],
            |row| row.get(0),
        )
        .optional()?;
    let card_id = next.ok_or(InventoryError::KeyAllocation {
        key_type: CARD_ID_KEY,
        reason: "counter row not found",
    })?;

    let rows = tx.execute(
        "UPDATE next_keys SET next_key = next_key + 1 WHERE key_type = ?1",
        params![CARD_ID_KEY],
    )?;
    if rows != 1 {
        return Err(InventoryError::KeyAllocation {
            key_type: CARD_ID_KEY,
            reason: "counter update failed",
        });
    }
    Ok(card_id)
}

/// All inventoried cards, for the price-refresh sweep
pub fn get_all_cards(tx: &Transaction<'_>) -> Result<Vec<StoredCard>> {
    let mut stmt = tx.prepare_cached(
        "SELECT card_id, scryfall_id, card_name, set_name, foil FROM card_info",
    )?;
    let cards: Vec<StoredCard> = stmt
        .query_map([], |row| {
            Ok(StoredCard {
                card_id: row.get(0)?,
                scryfall_id: row.get(1)?,
                name: row.get(2)?,
                set_name: row.get(3)?,
                foil: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<_>>()?;
    Ok(cards)
}

pub fn insert_card_info(tx: &Transaction<'_>, card_id: i64, card: &NormalizedCard) -> Result<()> {
    let rows = tx.execute(
        "INSERT INTO card_info (card_id, scryfall_id, card_name, set_name, type_line, rarity, foil)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            card_id,
            &card.scryfall_id,
            &card.name,
            &card.set_name,
            &card.type_line,
            card.rarity,
            card.foil,
        ],
    )?;
    expect_one(rows, "insert into card_info", card_id)
}

pub fn insert_card_price(
    tx: &Transaction<'_>,
    card_id: i64,
    price: f64,
    updated_at: &str,
) -> Result<()> {
    let rows = tx.execute(
        "INSERT INTO card_price (card_id, price, updated_at) VALUES (?1, ?2, ?3)",
        params![card_id, price, updated_at],
    )?;
    expect_one(rows, "insert into card_price", card_id)
}

pub fn insert_card_count(tx: &Transaction<'_>, card_id: i64, count: i64) -> Result<()> {
    let rows = tx.execute(
        "INSERT INTO card_count (card_id, count) VALUES (?1, ?2)",
        params![card_id, count],
    )?;
    expect_one(rows, "insert into card_count", card_id)
}

pub fn insert_card_colors(tx: &Transaction<'_>, card_id: i64, face: &FaceAttributes) -> Result<()> {
    let rows = tx.execute(
        "INSERT INTO card_colors (card_id, sequence, blue, black, red, green, white)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            card_id,
            face.sequence,
            face.colors.blue,
            face.colors.black,
            face.colors.red,
            face.colors.green,
            face.colors.white,
        ],
    )?;
    expect_one(rows, "insert into card_colors", card_id)
}

pub fn insert_card_mana_cost(
    tx: &Transaction<'_>,
    card_id: i64,
    face: &FaceAttributes,
) -> Result<()> {
    let rows = tx.execute(
        "INSERT INTO card_mana_cost
         (card_id, sequence, uncolored, blue, black, red, green, white, hybrid)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            card_id,
            face.sequence,
            face.mana.uncolored,
            face.mana.blue,
            face.mana.black,
            face.mana.red,
            face.mana.green,
            face.mana.white,
            face.mana.hybrid,
        ],
    )?;
    expect_one(rows, "insert into card_mana_cost", card_id)
}

/// Add `delta` copies to an existing count row
pub fn update_card_count(tx: &Transaction<'_>, card_id: i64, delta: i64) -> Result<()> {
    let rows = tx.execute(
        "UPDATE card_count SET count = count + ?2 WHERE card_id = ?1",
        params![card_id, delta],
    )?;
    expect_one(rows, "update of card_count", card_id)
}

/// Overwrite the stored price for an existing card
pub fn update_card_price(
    tx: &Transaction<'_>,
    card_id: i64,
    price: f64,
    updated_at: &str,
) -> Result<()> {
    let rows = tx.execute(
        "UPDATE card_price SET price = ?2, updated_at = ?3 WHERE card_id = ?1",
        params![card_id, price, updated_at],
    )?;
    expect_one(rows, "update of card_price", card_id)
}

/// Current local time for the card_price updated_at column
pub fn now_timestamp() -> String {
    chrono::Local::now().to_rfc3339()
}

fn expect_one(rows: usize, operation: &'static str, card_id: i64) -> Result<()> {
    if rows == 1 {
        Ok(())
    } else {
        Err(InventoryError::RowCount {
            operation,
            card_id,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::FaceAttributes;

    /// Create an in-memory database for testing
    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn sample_card(name: &str, set_name: &str, foil: bool) -> NormalizedCard {
        NormalizedCard {
            scryfall_id: format!("id-{}-{}", name, set_name),
            name: name.to_string(),
            set_name: set_name.to_string(),
            type_line: "INSTANT".to_string(),
            rarity: "C",
            foil,
            price: 2.5,
            faces: vec![FaceAttributes::default()],
        }
    }

    #[test]
    fn init_schema_is_idempotent() {
        let conn = test_db();
        init_schema(&conn).unwrap();

        let (rows, next): (i64, i64) = conn
            .query_row(
                "SELECT COUNT(*), MAX(next_key) FROM next_keys WHERE key_type = 'CARDID'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(next, 1);
    }

    #[test]
    fn allocate_card_id_is_strictly_increasing() {
        let mut conn = test_db();
        let tx = conn.transaction().unwrap();

        assert_eq!(allocate_card_id(&tx).unwrap(), 1);
        assert_eq!(allocate_card_id(&tx).unwrap(), 2);
        assert_eq!(allocate_card_id(&tx).unwrap(), 3);
    }

    #[test]
    fn allocate_card_id_fails_without_counter_row() {
        let mut conn = test_db();
        conn.execute("DELETE FROM next_keys WHERE key_type = 'CARDID'", [])
            .unwrap();
        let tx = conn.transaction().unwrap();

        let err = allocate_card_id(&tx).unwrap_err();
        assert!(matches!(err, InventoryError::KeyAllocation { .. }));
    }

    #[test]
    fn get_card_id_returns_none_for_unknown_key() {
        let mut conn = test_db();
        let tx = conn.transaction().unwrap();

        let id = get_card_id(&tx, "LIGHTNING BOLT", "LIMITED EDITION ALPHA", false).unwrap();
        assert!(id.is_none());
    }

    #[test]
    fn get_card_id_distinguishes_foil_from_nonfoil() {
        let mut conn = test_db();
        let tx = conn.transaction().unwrap();

        insert_card_info(&tx, 1, &sample_card("LIGHTNING BOLT", "LEA", false)).unwrap();
        insert_card_info(&tx, 2, &sample_card("LIGHTNING BOLT", "LEA", true)).unwrap();

        assert_eq!(get_card_id(&tx, "LIGHTNING BOLT", "LEA", false).unwrap(), Some(1));
        assert_eq!(get_card_id(&tx, "LIGHTNING BOLT", "LEA", true).unwrap(), Some(2));
    }

    #[test]
    fn get_card_id_rejects_duplicate_natural_key() {
        let mut conn = test_db();
        let tx = conn.transaction().unwrap();

        insert_card_info(&tx, 1, &sample_card("LIGHTNING BOLT", "LEA", false)).unwrap();
        insert_card_info(&tx, 2, &sample_card("LIGHTNING BOLT", "LEA", false)).unwrap();

        let err = get_card_id(&tx, "LIGHTNING BOLT", "LEA", false).unwrap_err();
        assert!(matches!(err, InventoryError::DuplicateInventoryRow { .. }));
    }

    #[test]
    fn update_card_count_adds_delta() {
        let mut conn = test_db();
        let tx = conn.transaction().unwrap();

        insert_card_info(&tx, 1, &sample_card("LIGHTNING BOLT", "LEA", false)).unwrap();
        insert_card_count(&tx, 1, 4).unwrap();
        update_card_count(&tx, 1, 2).unwrap();

        let count: i64 = tx
            .query_row(
                "SELECT count FROM card_count WHERE card_id = ?1",
                params![1],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 6);
    }

    #[test]
    fn update_card_count_fails_for_missing_row() {
        let mut conn = test_db();
        let tx = conn.transaction().unwrap();

        let err = update_card_count(&tx, 42, 1).unwrap_err();
        assert!(matches!(err, InventoryError::RowCount { rows: 0, .. }));
    }

    #[test]
    fn update_card_price_overwrites_value() {
        let mut conn = test_db();
        let tx = conn.transaction().unwrap();

        insert_card_info(&tx, 1, &sample_card("LIGHTNING BOLT", "LEA", false)).unwrap();
        insert_card_price(&tx, 1, 2.5, "2026-08-27T10:00:00+00:00").unwrap();
        update_card_price(&tx, 1, 3.75, "2026-08-28T10:00:00+00:00").unwrap();

        let (price, updated_at): (f64, String) = tx
            .query_row(
                "SELECT price, updated_at FROM card_price WHERE card_id = ?1",
                params![1],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert!((price - 3.75).abs() < 0.001);
        assert_eq!(updated_at, "2026-08-28T10:00:00+00:00");
    }

    #[test]
    fn get_all_cards_returns_stored_rows() {
        let mut conn = test_db();
        let tx = conn.transaction().unwrap();

        insert_card_info(&tx, 1, &sample_card("LIGHTNING BOLT", "LEA", false)).unwrap();
        insert_card_info(&tx, 2, &sample_card("BLACK LOTUS", "LEA", true)).unwrap();

        let cards = get_all_cards(&tx).unwrap();
        assert_eq!(cards.len(), 2);
        let lotus = cards.iter().find(|c| c.name == "BLACK LOTUS").unwrap();
        assert_eq!(lotus.card_id, 2);
        assert!(lotus.foil);
        assert_eq!(lotus.scryfall_id, "id-BLACK LOTUS-LEA");
    }
}
