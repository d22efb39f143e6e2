use log::{info, warn};

use super::require_text;
use crate::error::{AppError, Result};
use crate::models::{Card, Deck};
use crate::repository::{CardRepository, DeckRepository, Repository};

#[derive(Debug, Clone)]
pub struct DeckRequest {
    pub name: String,
    pub description: Option<String>,
}

impl DeckRequest {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_text("Deck name", &self.name)
    }
}

#[derive(Clone)]
pub struct DeckService {
    decks: DeckRepository,
    cards: CardRepository,
}

impl DeckService {
    pub fn new(decks: DeckRepository, cards: CardRepository) -> Self {
        Self { decks, cards }
    }

    /// Creates an empty deck. Names are unique; a taken name is rejected
    /// before anything is written.
    pub fn create_deck(&self, request: DeckRequest) -> Result<Deck> {
        request.validate()?;

        if self.decks.find_by_name(&request.name)?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "Deck with name {} already exists",
                request.name
            )));
        }

        self.decks.save(Deck::new(request.name, request.description))
    }

    pub fn get_all_decks(&self) -> Result<Vec<Deck>> {
        self.decks.find_all()
    }

    pub fn get_deck_by_id(&self, id: i64) -> Result<Deck> {
        self.decks.find_by_id(id)?.ok_or_else(|| AppError::NotFound {
            entity: "Deck",
            key: id.to_string(),
        })
    }

    pub fn get_deck_by_name(&self, name: &str) -> Result<Deck> {
        self.decks.find_by_name(name)?.ok_or_else(|| AppError::NotFound {
            entity: "Deck",
            key: name.to_string(),
        })
    }

    /// Writes the deck back. Renaming onto another deck's name is rejected.
    pub fn update_deck(&self, deck: Deck) -> Result<Deck> {
        require_text("Deck name", deck.name())?;

        if let Some(existing) = self.decks.find_by_name(deck.name())? {
            if existing.id != deck.id {
                return Err(AppError::AlreadyExists(format!(
                    "Deck with name {} already exists",
                    deck.name()
                )));
            }
        }

        self.decks.update(deck)
    }

    /// Deletes the deck and, through the cascade, its cards.
    pub fn delete_deck(&self, id: i64) -> Result<bool> {
        self.decks.delete_by_id(id)
    }

    pub fn get_deck_count(&self) -> Result<i64> {
        self.decks.count()
    }

    /// Persists an imported deck as a new deck with new cards.
    ///
    /// Ids carried by the imported graph are ignored. Every card is checked
    /// before the first insert, and a failure while saving cards removes the
    /// half-written deck again.
    pub fn import_deck(&self, deck: Deck) -> Result<Deck> {
        for (index, card) in deck.cards().iter().enumerate() {
            require_text(&format!("Question of card {}", index + 1), &card.question)?;
            require_text(&format!("Answer of card {}", index + 1), &card.answer)?;
        }

        let request = DeckRequest::new(deck.name(), deck.description().map(str::to_string));
        let created = self.create_deck(request)?;
        let deck_id = created
            .id
            .ok_or_else(|| AppError::repository("Importing deck failed, no ID obtained"))?;

        if let Err(e) = self.save_imported_cards(deck_id, deck.into_cards()) {
            if let Err(cleanup) = self.decks.delete_by_id(deck_id) {
                warn!("Failed to remove partially imported deck {}: {}", deck_id, cleanup);
            }
            return Err(e);
        }

        let imported = self.get_deck_by_id(deck_id)?;
        info!(
            "Deck '{}' imported with {} cards",
            imported.name(),
            imported.card_count()
        );
        Ok(imported)
    }

    fn save_imported_cards(&self, deck_id: i64, cards: Vec<Card>) -> Result<()> {
        for card in cards {
            self.cards.save(Card {
                id: None,
                deck_id: Some(deck_id),
                ..card
            })?;
        }
        Ok(())
    }
}
