//! Card storage: single-table SQL against `cards`.

use std::sync::Arc;

use log::info;
use rusqlite::{OptionalExtension, Row, params};

use super::{Repository, contains_pattern};
use crate::database::Database;
use crate::error::{AppError, Result};
use crate::models::{Card, now};

const SELECT_CARDS: &str =
    "SELECT id, question, answer, deck_id, created_at, updated_at FROM cards";

#[derive(Clone)]
pub struct CardRepository {
    database: Arc<Database>,
}

fn map_card(row: &Row<'_>) -> rusqlite::Result<Card> {
    Ok(Card {
        id: Some(row.get("id")?),
        question: row.get("question")?,
        answer: row.get("answer")?,
        deck_id: Some(row.get("deck_id")?),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

impl CardRepository {
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    pub fn count_by_deck_id(&self, deck_id: i64) -> Result<i64> {
        self.with_connection(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM cards WHERE deck_id = ?1",
                params![deck_id],
                |row| row.get(0),
            )?)
        })
    }

    /// Removes every card of a deck. Returns whether anything was deleted.
    pub fn delete_by_deck_id(&self, deck_id: i64) -> Result<bool> {
        let affected = self.with_connection(|conn| {
            Ok(conn.execute("DELETE FROM cards WHERE deck_id = ?1", params![deck_id])?)
        })?;

        if affected > 0 {
            info!("Deleted {} cards from deck ID: {}", affected, deck_id);
        }
        Ok(affected > 0)
    }

    /// Cards of a deck, oldest first.
    pub fn find_by_deck_id(&self, deck_id: i64) -> Result<Vec<Card>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE deck_id = ?1 ORDER BY created_at ASC, id ASC",
                SELECT_CARDS
            ))?;
            let cards = stmt
                .query_map(params![deck_id], map_card)?
                .collect::<rusqlite::Result<Vec<Card>>>()?;
            Ok(cards)
        })
    }

    /// Case-insensitive substring search over question and answer, newest first.
    pub fn find_by_text_containing(&self, text: &str) -> Result<Vec<Card>> {
        let pattern = contains_pattern(text);

        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!(
                r"{} WHERE fold_case(question) LIKE ?1 ESCAPE '\'
                    OR fold_case(answer) LIKE ?1 ESCAPE '\'
                 ORDER BY created_at DESC, id DESC",
                SELECT_CARDS
            ))?;
            let cards = stmt
                .query_map(params![pattern], map_card)?
                .collect::<rusqlite::Result<Vec<Card>>>()?;
            Ok(cards)
        })
    }
}

impl Repository<Card> for CardRepository {
    fn database(&self) -> &Database {
        &self.database
    }

    fn save(&self, mut card: Card) -> Result<Card> {
        let deck_id = card
            .deck_id
            .ok_or_else(|| AppError::repository("Creating card failed, card has no deck"))?;

        let id = self.with_connection(|conn| {
            conn.query_row(
                "INSERT INTO cards (question, answer, deck_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id",
                params![
                    card.question,
                    card.answer,
                    deck_id,
                    card.created_at,
                    card.updated_at
                ],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .ok_or_else(|| AppError::repository("Creating card failed, no ID obtained"))
        })?;

        card.id = Some(id);
        info!("Card saved with ID: {}", id);
        Ok(card)
    }

    fn update(&self, mut card: Card) -> Result<Card> {
        let id = card
            .id
            .ok_or_else(|| AppError::repository("Updating card failed, card has no ID"))?;
        card.updated_at = now();

        let affected = self.with_connection(|conn| {
            Ok(conn.execute(
                "UPDATE cards SET question = ?1, answer = ?2, updated_at = ?3 WHERE id = ?4",
                params![card.question, card.answer, card.updated_at, id],
            )?)
        })?;

        if affected == 0 {
            return Err(AppError::repository(format!(
                "Updating card failed, card not found with ID: {}",
                id
            )));
        }

        info!("Card updated with ID: {}", id);
        Ok(card)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Card>> {
        self.with_connection(|conn| {
            Ok(conn
                .query_row(
                    &format!("{} WHERE id = ?1", SELECT_CARDS),
                    params![id],
                    map_card,
                )
                .optional()?)
        })
    }

    fn find_all(&self) -> Result<Vec<Card>> {
        self.with_connection(|conn| {
            let mut stmt =
                conn.prepare(&format!("{} ORDER BY created_at DESC, id DESC", SELECT_CARDS))?;
            let cards = stmt
                .query_map([], map_card)?
                .collect::<rusqlite::Result<Vec<Card>>>()?;
            Ok(cards)
        })
    }

    fn delete_by_id(&self, id: i64) -> Result<bool> {
        let affected = self.with_connection(|conn| {
            Ok(conn.execute("DELETE FROM cards WHERE id = ?1", params![id])?)
        })?;

        if affected > 0 {
            info!("Card deleted with ID: {}", id);
        }
        Ok(affected > 0)
    }

    fn exists_by_id(&self, id: i64) -> Result<bool> {
        self.with_connection(|conn| {
            Ok(conn
                .query_row(
                    "SELECT 1 FROM cards WHERE id = ?1 LIMIT 1",
                    params![id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some())
        })
    }

    fn count(&self) -> Result<i64> {
        self.with_connection(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing::test_database;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn insert_deck(database: &Database, name: &str) -> i64 {
        let conn = database.get_connection().unwrap();
        conn.query_row(
            "INSERT INTO decks (name) VALUES (?1) RETURNING id",
            params![name],
            |row| row.get(0),
        )
        .unwrap()
    }

    fn card_at(question: &str, answer: &str, deck_id: i64, created: NaiveDateTime) -> Card {
        let mut card = Card::new(question, answer, Some(deck_id));
        card.created_at = created;
        card.updated_at = created;
        card
    }

    #[test]
    fn test_save_assigns_id_and_keeps_timestamps() {
        let (_dir, database) = test_database();
        let deck_id = insert_deck(&database, "Deck");
        let repo = CardRepository::new(database);

        let saved = repo.save(card_at("q", "a", deck_id, at(1, 10))).unwrap();
        let id = saved.id.unwrap();

        let loaded = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.question, "q");
        assert_eq!(loaded.deck_id, Some(deck_id));
        assert_eq!(loaded.created_at, at(1, 10));
        assert!(repo.exists_by_id(id).unwrap());
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_save_requires_existing_deck() {
        let (_dir, database) = test_database();
        let repo = CardRepository::new(database);

        let orphan = repo.save(Card::new("q", "a", Some(404)));
        assert!(matches!(orphan, Err(AppError::Repository { .. })));

        let unowned = repo.save(Card::new("q", "a", None));
        assert!(matches!(unowned, Err(AppError::Repository { .. })));
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_update_refreshes_updated_at() {
        let (_dir, database) = test_database();
        let deck_id = insert_deck(&database, "Deck");
        let repo = CardRepository::new(database);

        let mut card = repo.save(card_at("q", "a", deck_id, at(1, 10))).unwrap();
        card.answer = "better answer".to_string();
        let updated = repo.update(card).unwrap();

        assert!(updated.updated_at > at(1, 10));
        let loaded = repo.find_by_id(updated.id.unwrap()).unwrap().unwrap();
        assert_eq!(loaded.answer, "better answer");
        assert_eq!(loaded.created_at, at(1, 10));
    }

    #[test]
    fn test_update_missing_card_fails() {
        let (_dir, database) = test_database();
        let repo = CardRepository::new(database);

        let mut ghost = Card::new("q", "a", Some(1));
        ghost.id = Some(77);

        let err = repo.update(ghost).unwrap_err();
        assert!(err.to_string().contains("77"));
        assert!(repo.update(Card::new("q", "a", Some(1))).is_err());
    }

    #[test]
    fn test_find_by_deck_id_is_oldest_first() {
        let (_dir, database) = test_database();
        let deck_id = insert_deck(&database, "Deck");
        let other_id = insert_deck(&database, "Other");
        let repo = CardRepository::new(database);

        repo.save(card_at("second", "a", deck_id, at(2, 10))).unwrap();
        repo.save(card_at("first", "a", deck_id, at(1, 10))).unwrap();
        repo.save(card_at("elsewhere", "a", other_id, at(1, 9))).unwrap();

        let questions: Vec<String> = repo
            .find_by_deck_id(deck_id)
            .unwrap()
            .into_iter()
            .map(|c| c.question)
            .collect();
        assert_eq!(questions, vec!["first", "second"]);

        let all: Vec<String> = repo
            .find_all()
            .unwrap()
            .into_iter()
            .map(|c| c.question)
            .collect();
        assert_eq!(all, vec!["second", "first", "elsewhere"]);
    }

    #[test]
    fn test_find_by_text_containing() {
        let (_dir, database) = test_database();
        let deck_id = insert_deck(&database, "Deck");
        let repo = CardRepository::new(database);

        let base = at(1, 10);
        repo.save(card_at("What is JAVA?", "A language", deck_id, base)).unwrap();
        repo.save(card_at("Capital of Poland", "Warszawa", deck_id, base + Duration::hours(1)))
            .unwrap();
        repo.save(card_at("Coffee", "java, in slang", deck_id, base + Duration::hours(2)))
            .unwrap();
        repo.save(card_at("Żółw", "turtle", deck_id, base + Duration::hours(3)))
            .unwrap();

        let hits: Vec<String> = repo
            .find_by_text_containing("java")
            .unwrap()
            .into_iter()
            .map(|c| c.question)
            .collect();
        assert_eq!(hits, vec!["Coffee", "What is JAVA?"]);

        assert_eq!(repo.find_by_text_containing("ŻÓŁW").unwrap().len(), 1);
        assert!(repo.find_by_text_containing("%").unwrap().is_empty());
    }

    #[test]
    fn test_count_and_delete_by_deck_id() {
        let (_dir, database) = test_database();
        let deck_id = insert_deck(&database, "Deck");
        let repo = CardRepository::new(database);

        repo.save(Card::new("q1", "a1", Some(deck_id))).unwrap();
        repo.save(Card::new("q2", "a2", Some(deck_id))).unwrap();
        assert_eq!(repo.count_by_deck_id(deck_id).unwrap(), 2);

        assert!(repo.delete_by_deck_id(deck_id).unwrap());
        assert!(!repo.delete_by_deck_id(deck_id).unwrap());
        assert_eq!(repo.count_by_deck_id(deck_id).unwrap(), 0);
    }

    #[test]
    fn test_delete() {
        let (_dir, database) = test_database();
        let deck_id = insert_deck(&database, "Deck");
        let repo = CardRepository::new(database);

        let card = repo.save(Card::new("q", "a", Some(deck_id))).unwrap();
        assert!(!repo.delete(&Card::new("unsaved", "a", Some(deck_id))).unwrap());
        assert!(repo.delete(&card).unwrap());
        assert!(!repo.delete_by_id(card.id.unwrap()).unwrap());
        assert!(!repo.exists_by_id(card.id.unwrap()).unwrap());
    }
}
