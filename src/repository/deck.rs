//! Deck storage
//!
//! Every lookup returns fully hydrated decks: the card list is loaded through
//! [`CardRepository::find_by_deck_id`] once the deck query has released its
//! connection. Deleting a deck relies on the `ON DELETE CASCADE` foreign key to
//! remove its cards.

use std::sync::Arc;

use log::info;
use rusqlite::{OptionalExtension, Row, params};

use super::{CardRepository, Repository};
use crate::database::Database;
use crate::error::{AppError, Result};
use crate::models::{Deck, now};

const SELECT_DECKS: &str = "SELECT id, name, description, created_at, updated_at FROM decks";

#[derive(Clone)]
pub struct DeckRepository {
    database: Arc<Database>,
    cards: CardRepository,
}

fn map_deck(row: &Row<'_>) -> rusqlite::Result<Deck> {
    Ok(Deck::from_parts(
        row.get("id")?,
        row.get("name")?,
        row.get("description")?,
        row.get("created_at")?,
        row.get("updated_at")?,
    ))
}

impl DeckRepository {
    pub fn new(database: Arc<Database>, cards: CardRepository) -> Self {
        Self { database, cards }
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<Deck>> {
        let deck = self.with_connection(|conn| {
            Ok(conn
                .query_row(
                    &format!("{} WHERE name = ?1", SELECT_DECKS),
                    params![name],
                    map_deck,
                )
                .optional()?)
        })?;

        deck.map(|d| self.hydrate(d)).transpose()
    }

    fn hydrate(&self, mut deck: Deck) -> Result<Deck> {
        if let Some(id) = deck.id {
            deck.hydrate(self.cards.find_by_deck_id(id)?);
        }
        Ok(deck)
    }
}

impl Repository<Deck> for DeckRepository {
    fn database(&self) -> &Database {
        &self.database
    }

    /// Inserts the deck row only; its cards are saved separately.
    fn save(&self, mut deck: Deck) -> Result<Deck> {
        let id = self.with_connection(|conn| {
            conn.query_row(
                "INSERT INTO decks (name, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4) RETURNING id",
                params![
                    deck.name(),
                    deck.description(),
                    deck.created_at,
                    deck.updated_at()
                ],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .ok_or_else(|| AppError::repository("Creating deck failed, no ID obtained"))
        })?;

        deck.id = Some(id);
        info!("Deck saved with ID: {}", id);
        Ok(deck)
    }

    fn update(&self, mut deck: Deck) -> Result<Deck> {
        let id = deck
            .id
            .ok_or_else(|| AppError::repository("Updating deck failed, deck has no ID"))?;
        deck.set_updated_at(now());

        let affected = self.with_connection(|conn| {
            Ok(conn.execute(
                "UPDATE decks SET name = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
                params![deck.name(), deck.description(), deck.updated_at(), id],
            )?)
        })?;

        if affected == 0 {
            return Err(AppError::repository(format!(
                "Updating deck failed, deck not found with ID: {}",
                id
            )));
        }

        info!("Deck updated with ID: {}", id);
        Ok(deck)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Deck>> {
        let deck = self.with_connection(|conn| {
            Ok(conn
                .query_row(
                    &format!("{} WHERE id = ?1", SELECT_DECKS),
                    params![id],
                    map_deck,
                )
                .optional()?)
        })?;

        deck.map(|d| self.hydrate(d)).transpose()
    }

    fn find_all(&self) -> Result<Vec<Deck>> {
        let decks = self.with_connection(|conn| {
            let mut stmt =
                conn.prepare(&format!("{} ORDER BY created_at DESC, id DESC", SELECT_DECKS))?;
            let decks = stmt
                .query_map([], map_deck)?
                .collect::<rusqlite::Result<Vec<Deck>>>()?;
            Ok(decks)
        })?;

        decks.into_iter().map(|d| self.hydrate(d)).collect()
    }

    fn delete_by_id(&self, id: i64) -> Result<bool> {
        let affected = self.with_connection(|conn| {
            Ok(conn.execute("DELETE FROM decks WHERE id = ?1", params![id])?)
        })?;

        if affected > 0 {
            info!("Deck deleted with ID: {}", id);
        }
        Ok(affected > 0)
    }

    fn exists_by_id(&self, id: i64) -> Result<bool> {
        self.with_connection(|conn| {
            Ok(conn
                .query_row(
                    "SELECT 1 FROM decks WHERE id = ?1 LIMIT 1",
                    params![id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some())
        })
    }

    fn count(&self) -> Result<i64> {
        self.with_connection(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM decks", [], |row| row.get(0))?)
        })
    }
}
