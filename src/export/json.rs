//! JSON import/export module for flashcard decks.
//! Saves a deck with all its cards to an indented JSON document and loads it back.

use std::fs;
use std::path::Path;

use log::info;

use super::{ensure_exists, write_off_thread};
use crate::error::{AppError, Result};
use crate::models::Deck;

/// Exports a deck to a JSON file at the specified path.
/// Missing parent directories are created; fields without a value are omitted.
pub fn export_json_to_path(deck: &Deck, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    write_off_thread(path, "JSON", |writer| {
        serde_json::to_writer_pretty(writer, deck).map_err(|e| AppError::Serialization {
            path: path.display().to_string(),
            source: e,
        })
    })?;

    info!("Deck '{}' exported to '{}'", deck.name(), path.display());
    Ok(())
}

/// Imports a deck from a JSON file.
/// Fields the deck model does not know are ignored.
pub fn import_json(path: impl AsRef<Path>) -> Result<Deck> {
    let path = path.as_ref();
    ensure_exists(path)?;

    let contents =
        fs::read_to_string(path).map_err(|e| AppError::io("Cannot read JSON file", path, e))?;

    // Deserialize JSON string into Deck structure
    let deck: Deck = serde_json::from_str(&contents).map_err(|e| AppError::Serialization {
        path: path.display().to_string(),
        source: e,
    })?;

    info!("Deck '{}' imported from '{}'", deck.name(), path.display());
    Ok(deck)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Card;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn card(id: i64, question: &str, answer: &str, created: NaiveDateTime) -> Card {
        Card {
            id: Some(id),
            question: question.to_string(),
            answer: answer.to_string(),
            deck_id: Some(1),
            created_at: created,
            updated_at: created,
        }
    }

    fn create_test_deck() -> Deck {
        let mut deck = Deck::new("Java Basics", Some("Basic Java concepts".to_string()));
        deck.id = Some(1);
        deck.set_cards(vec![
            card(1, "What is Java?", "Java is a programming language", at(1, 10)),
            card(2, "What is Spring?", "Spring is a framework", at(2, 11)),
        ]);
        deck
    }

    #[test]
    fn test_export_json_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test-deck.json");

        export_json_to_path(&create_test_deck(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("Java Basics"));
        assert!(content.contains("Basic Java concepts"));
        assert!(content.contains("What is Java?"));
        assert!(content.contains("\"createdAt\": \"2023-01-01T10:00:00\""));
        assert!(content.contains("\"deckId\": 1"));
        // indented
        assert!(content.contains("\n  \"name\""));
    }

    #[test]
    fn test_export_omits_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bare.json");

        export_json_to_path(&Deck::new("Bare", None), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("\"id\""));
        assert!(!content.contains("description"));
        assert!(!content.contains("null"));
        assert!(content.contains("\"cards\": []"));
    }

    #[test]
    fn test_import_json() {
        let json_content = r#"{
  "id": 9,
  "name": "Import Test Deck",
  "cardCount": 1,
  "cards": [
    {
      "id": 4,
      "question": "test question",
      "answer": "test answer",
      "deckId": 9,
      "createdAt": "2023-01-01T10:00:00",
      "updatedAt": "2023-01-01T10:00:00",
      "difficulty": "hard"
    }
  ]
}"#;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_import.json");
        fs::write(&path, json_content).unwrap();

        let deck = import_json(&path).unwrap();
        assert_eq!(deck.name(), "Import Test Deck");
        assert!(deck.description().is_none());
        assert_eq!(deck.card_count(), 1);
        assert_eq!(deck.cards()[0].question, "test question");
        assert_eq!(deck.cards()[0].answer, "test answer");
        assert_eq!(deck.cards()[0].created_at, at(1, 10));
    }

    #[test]
    fn test_export_and_import_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.json");
        let original = create_test_deck();

        export_json_to_path(&original, &path).unwrap();
        let imported = import_json(&path).unwrap();

        assert_eq!(imported.name(), original.name());
        assert_eq!(imported.description(), original.description());
        assert_eq!(imported.card_count(), 2);
        for (orig, imp) in original.cards().iter().zip(imported.cards()) {
            assert_eq!(orig.question, imp.question);
            assert_eq!(orig.answer, imp.answer);
            assert_eq!(orig.created_at, imp.created_at);
        }
        assert_eq!(imported.created_at, original.created_at);
        assert_eq!(imported.updated_at(), original.updated_at());
    }

    #[test]
    fn test_import_nonexistent_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = import_json(dir.path().join("non-existent.json")).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_import_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        let result = import_json(&path);
        assert!(matches!(result, Err(AppError::Serialization { .. })));
    }
}
