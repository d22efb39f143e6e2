//! Deck is a named set of cards
//!
//! Name, description and the card list are only reachable through accessors so
//! that every change refreshes `updated_at`.
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Card, Entity, now};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    cards: Vec<Card>,
    #[serde(default = "now")]
    pub created_at: NaiveDateTime,
    #[serde(default = "now")]
    updated_at: NaiveDateTime,
}

impl Deck {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        let timestamp = now();
        Self {
            id: None,
            name: name.into(),
            description,
            cards: Vec::new(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Rebuilds a deck exactly as stored, without touching its timestamps.
    pub(crate) fn from_parts(
        id: i64,
        name: String,
        description: Option<String>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: Some(id),
            name,
            description,
            cards: Vec::new(),
            created_at,
            updated_at,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.touch();
    }

    /// Replaces the card list; the deck owns the new vector outright.
    pub fn set_cards(&mut self, cards: Vec<Card>) {
        self.cards = cards;
        self.touch();
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
        self.touch();
    }

    /// Removes the first card equal to `card` (same persisted id).
    pub fn remove_card(&mut self, card: &Card) -> bool {
        match self.cards.iter().position(|c| c == card) {
            Some(index) => {
                self.cards.remove(index);
                self.touch();
                true
            }
            None => false,
        }
    }

    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }

    pub(crate) fn set_updated_at(&mut self, updated_at: NaiveDateTime) {
        self.updated_at = updated_at;
    }

    /// Fills the card list from storage; not a user mutation.
    pub(crate) fn hydrate(&mut self, cards: Vec<Card>) {
        self.cards = cards;
    }

    fn touch(&mut self) {
        self.updated_at = now();
    }
}

impl Entity for Deck {
    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl PartialEq for Deck {
    fn eq(&self, other: &Self) -> bool {
        matches!((self.id, other.id), (Some(a), Some(b)) if a == b)
    }
}

impl fmt::Display for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} cards)", self.name, self.card_count())
    }
}
