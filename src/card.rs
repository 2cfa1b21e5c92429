//! Card normalization
//!
//! Translates a loosely-typed Scryfall response into the fixed shape the
//! inventory schema stores: uppercased identity fields, a single-letter
//! rarity code, a selected price, and per-face color/mana attributes.
//! Pure functions, no I/O.

use crate::error::{InventoryError, Result};
use crate::scryfall::{CardFace, ScryfallCard};

/// Layouts whose card_faces carry independent color/mana data
const MULTI_FACE_LAYOUTS: [&str; 5] = ["split", "flip", "transform", "modal_dfc", "reversible_card"];

/// Color identity flags for one face
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorFlags {
    pub blue: bool,
    pub black: bool,
    pub red: bool,
    pub green: bool,
    pub white: bool,
}

impl ColorFlags {
    /// Toggle flags on for each recognized color letter; never clears a
    /// flag, so face-level colors only add to inherited defaults
    fn apply(&mut self, colors: &[String]) {
        for color in colors {
            match color.as_str() {
                "U" => self.blue = true,
                "B" => self.black = true,
                "R" => self.red = true,
                "G" => self.green = true,
                "W" => self.white = true,
                _ => {}
            }
        }
    }
}

/// Parsed mana cost for one face
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManaCost {
    pub uncolored: u16,
    pub blue: u16,
    pub black: u16,
    pub red: u16,
    pub green: u16,
    pub white: u16,
    pub hybrid: bool,
}

impl ManaCost {
    /// Derive the cost from a brace-symbol string like `{2}{U}{U}`
    ///
    /// The first purely-numeric symbol supplies `uncolored` (left at its
    /// prior value when none is present, which is 0 for a fresh cost).
    /// Letter counts are raw occurrences anywhere in the string, so a
    /// hybrid symbol like `{U/B}` counts toward both colors. A `/`
    /// anywhere marks the cost as hybrid.
    fn apply(&mut self, cost: &str) {
        if let Some(n) = first_numeric_symbol(cost) {
            self.uncolored = n;
        }
        self.blue = letter_count(cost, 'U');
        self.black = letter_count(cost, 'B');
        self.red = letter_count(cost, 'R');
        self.green = letter_count(cost, 'G');
        self.white = letter_count(cost, 'W');
        if cost.contains('/') {
            self.hybrid = true;
        }
    }
}

/// Color and mana attributes for one printed face
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaceAttributes {
    /// 0-based position, matching the catalog's face order
    pub sequence: u16,
    pub colors: ColorFlags,
    pub mana: ManaCost,
}

impl FaceAttributes {
    /// Produce a face whose attributes start from the card-level defaults
    /// and are overridden by whatever the face itself provides
    fn override_with(&self, face: &CardFace, sequence: u16) -> FaceAttributes {
        let mut attrs = FaceAttributes { sequence, ..*self };
        if let Some(colors) = &face.colors {
            attrs.colors.apply(colors);
        }
        if let Some(cost) = non_blank(&face.mana_cost) {
            attrs.mana.apply(cost);
        }
        attrs
    }
}

/// One card printing, normalized for storage
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCard {
    pub scryfall_id: String,
    pub name: String,
    pub set_name: String,
    pub type_line: String,
    /// Single-letter rarity code (C/U/R/M/S/B, Z for unknown)
    pub rarity: &'static str,
    pub foil: bool,
    pub price: f64,
    /// One entry per face, sequences contiguous from 0
    pub faces: Vec<FaceAttributes>,
}

/// Normalize a catalog record into the shape the schema stores
pub fn normalize(card: &ScryfallCard, want_foil: bool) -> Result<NormalizedCard> {
    let price = select_price(card, want_foil)?;
    let name = non_blank(&card.name)
        .ok_or(InventoryError::MissingName)?
        .to_uppercase();
    let set_name = non_blank(&card.set_name)
        .ok_or(InventoryError::MissingSetName)?
        .to_uppercase();
    let type_line = non_blank(&card.type_line)
        .ok_or(InventoryError::MissingType)?
        .to_uppercase();
    let scryfall_id = non_blank(&card.id)
        .ok_or(InventoryError::MissingExternalId)?
        .to_string();
    let rarity = rarity_code(non_blank(&card.rarity).ok_or(InventoryError::MissingRarity)?);

    let mut base = FaceAttributes::default();
    if let Some(colors) = &card.colors {
        base.colors.apply(colors);
    }
    if let Some(cost) = non_blank(&card.mana_cost) {
        base.mana.apply(cost);
    }

    let faces = match (&card.layout, &card.card_faces) {
        (Some(layout), Some(card_faces))
            if is_multi_face_layout(layout) && !card_faces.is_empty() =>
        {
            card_faces
                .iter()
                .enumerate()
                .map(|(i, face)| base.override_with(face, i as u16))
                .collect()
        }
        _ => vec![base],
    };

    Ok(NormalizedCard {
        scryfall_id,
        name,
        set_name,
        type_line,
        rarity,
        foil: want_foil,
        price,
        faces,
    })
}

/// Select the usd or usd_foil price and parse it
///
/// A missing or blank value for the selected field is fatal.
pub fn select_price(card: &ScryfallCard, want_foil: bool) -> Result<f64> {
    let price_str = if want_foil {
        non_blank(&card.prices.usd_foil)
    } else {
        non_blank(&card.prices.usd)
    };
    let price_str = price_str.ok_or(InventoryError::MissingPrice)?;
    price_str
        .parse()
        .map_err(|_| InventoryError::InvalidPrice(price_str.to_string()))
}

/// Map a rarity string to its single-letter code; total over all inputs
pub fn rarity_code(rarity: &str) -> &'static str {
    match rarity.to_ascii_lowercase().as_str() {
        "common" => "C",
        "uncommon" => "U",
        "rare" => "R",
        "mythic" => "M",
        "special" => "S",
        "bonus" => "B",
        _ => "Z",
    }
}

fn is_multi_face_layout(layout: &str) -> bool {
    MULTI_FACE_LAYOUTS.contains(&layout.to_ascii_lowercase().as_str())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// First brace symbol made purely of digits, if any
fn first_numeric_symbol(cost: &str) -> Option<u16> {
    brace_symbols(cost)
        .find(|sym| !sym.is_empty() && sym.chars().all(|c| c.is_ascii_digit()))
        .and_then(|sym| sym.parse().ok())
}

fn brace_symbols(cost: &str) -> impl Iterator<Item = &str> {
    cost.split('{').skip(1).filter_map(|part| part.split('}').next())
}

fn letter_count(cost: &str, letter: char) -> u16 {
    cost.chars().filter(|&c| c == letter).count() as u16
}

#[cfg(test)]
#[path = "card_tests.rs"]
mod tests;
