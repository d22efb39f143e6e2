use super::require_text;
use crate::error::{AppError, Result};
use crate::models::Card;
use crate::repository::{CardRepository, Repository};

#[derive(Debug, Clone)]
pub struct CardRequest {
    pub question: String,
    pub answer: String,
    pub deck_id: i64,
}

impl CardRequest {
    pub fn new(question: impl Into<String>, answer: impl Into<String>, deck_id: i64) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            deck_id,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_text("Question", &self.question)?;
        require_text("Answer", &self.answer)
    }
}

#[derive(Clone)]
pub struct CardService {
    cards: CardRepository,
}

impl CardService {
    pub fn new(cards: CardRepository) -> Self {
        Self { cards }
    }

    pub fn create(&self, request: CardRequest) -> Result<Card> {
        request.validate()?;
        self.cards.save(Card::new(
            request.question,
            request.answer,
            Some(request.deck_id),
        ))
    }

    pub fn get_cards(&self) -> Result<Vec<Card>> {
        self.cards.find_all()
    }

    pub fn get_card_by_id(&self, card_id: i64) -> Result<Card> {
        self.cards.find_by_id(card_id)?.ok_or_else(|| AppError::NotFound {
            entity: "Card",
            key: card_id.to_string(),
        })
    }

    /// Replaces question and answer. The card stays in its current deck.
    pub fn update(&self, card_id: i64, request: CardRequest) -> Result<Card> {
        request.validate()?;

        let mut card = self.get_card_by_id(card_id)?;
        card.question = request.question;
        card.answer = request.answer;

        self.cards.update(card)
    }

    pub fn delete(&self, card_id: i64) -> Result<bool> {
        self.cards.delete_by_id(card_id)
    }

    pub fn get_cards_by_deck_id(&self, deck_id: i64) -> Result<Vec<Card>> {
        self.cards.find_by_deck_id(deck_id)
    }

    pub fn get_total_card_count(&self) -> Result<i64> {
        self.cards.count()
    }

    pub fn search_cards(&self, text: &str) -> Result<Vec<Card>> {
        self.cards.find_by_text_containing(text)
    }
}
