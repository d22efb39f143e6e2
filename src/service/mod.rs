//! Use-case layer over the repositories.
//!
//! [`Services`] wires one [`CardRepository`] into both services so deck reads
//! and card operations share the same storage handle.

pub mod card_service;
pub mod deck_service;

pub use card_service::{CardRequest, CardService};
pub use deck_service::{DeckRequest, DeckService};

use std::sync::Arc;

use crate::database::Database;
use crate::error::{AppError, Result};
use crate::repository::{CardRepository, DeckRepository};

pub struct Services {
    deck_service: DeckService,
    card_service: CardService,
}

impl Services {
    pub fn new(database: Arc<Database>) -> Self {
        let cards = CardRepository::new(Arc::clone(&database));
        let decks = DeckRepository::new(database, cards.clone());

        Self {
            deck_service: DeckService::new(decks, cards.clone()),
            card_service: CardService::new(cards),
        }
    }

    pub fn deck_service(&self) -> &DeckService {
        &self.deck_service
    }

    pub fn card_service(&self) -> &CardService {
        &self.card_service
    }
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be blank", field)));
    }
    Ok(())
}
