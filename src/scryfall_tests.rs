//! Tests for the Scryfall API client
//!
//! Note: integration tests require network access and are marked with #[ignore]

use super::*;

#[test]
fn deserialize_minimal_card() {
    let card: ScryfallCard = serde_json::from_str(r#"{"name": "Test Card"}"#).unwrap();
    assert_eq!(card.name.as_deref(), Some("Test Card"));
    assert!(card.id.is_none());
    assert!(card.colors.is_none());
    assert!(card.card_faces.is_none());
    assert!(card.prices.usd.is_none());
    assert!(card.prices.usd_foil.is_none());
}

#[test]
fn deserialize_full_card() {
    let card_json = r#"{
        "id": "e3285e6b-3e79-4d7c-bf96-d920f973b122",
        "name": "Lightning Bolt",
        "set_name": "Limited Edition Alpha",
        "type_line": "Instant",
        "rarity": "common",
        "colors": ["R"],
        "mana_cost": "{R}",
        "layout": "normal",
        "prices": {"usd": "2.50", "usd_foil": null}
    }"#;

    let card: ScryfallCard = serde_json::from_str(card_json).unwrap();
    assert_eq!(card.set_name.as_deref(), Some("Limited Edition Alpha"));
    assert_eq!(card.rarity.as_deref(), Some("common"));
    assert_eq!(card.colors.as_deref(), Some(&["R".to_string()][..]));
    assert_eq!(card.prices.usd.as_deref(), Some("2.50"));
    assert!(card.prices.usd_foil.is_none());
}

#[test]
fn deserialize_card_faces() {
    let card_json = r#"{
        "name": "Delver of Secrets // Insectile Aberration",
        "layout": "transform",
        "card_faces": [
            {"name": "Delver of Secrets", "colors": ["U"], "mana_cost": "{U}"},
            {"name": "Insectile Aberration", "colors": ["U"]}
        ]
    }"#;

    let card: ScryfallCard = serde_json::from_str(card_json).unwrap();
    let faces = card.card_faces.unwrap();
    assert_eq!(faces.len(), 2);
    assert_eq!(faces[0].mana_cost.as_deref(), Some("{U}"));
    assert!(faces[1].mana_cost.is_none());
}

#[test]
fn encode_name_uses_plus_for_spaces() {
    assert_eq!(encode_name("Lightning Bolt"), "Lightning+Bolt");
    assert_eq!(encode_name("Fire // Ice"), "Fire+%2F%2F+Ice");
    assert_eq!(encode_name("Gaea's Cradle"), "Gaea%27s+Cradle");
}

#[test]
fn client_base_url_is_configurable() {
    let client = ScryfallClient::with_base_url("http://localhost:8080/cards");
    assert_eq!(client.base_url, "http://localhost:8080/cards");
}

// Integration tests (require network access)
#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn fetch_exact_integration() {
    let client = ScryfallClient::new();
    let card = client.fetch_exact("Lightning Bolt", "lea").await.unwrap();
    assert_eq!(card.name.as_deref(), Some("Lightning Bolt"));
    assert!(card.id.is_some());
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn fetch_exact_unknown_card_integration() {
    let client = ScryfallClient::new();
    let result = client.fetch_exact("ThisCardDoesNotExistXYZ123", "lea").await;
    assert!(result.is_err());
}
