//! Card is a question/answer pair owned by exactly one deck
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Entity, now};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck_id: Option<i64>,
    #[serde(default = "now")]
    pub created_at: NaiveDateTime,
    #[serde(default = "now")]
    pub updated_at: NaiveDateTime,
}

impl Card {
    pub fn new(question: impl Into<String>, answer: impl Into<String>, deck_id: Option<i64>) -> Self {
        let timestamp = now();
        Self {
            id: None,
            question: question.into(),
            answer: answer.into(),
            deck_id,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }
}

impl Entity for Card {
    fn id(&self) -> Option<i64> {
        self.id
    }
}

/// Cards are the same card iff both are persisted with the same id.
impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        matches!((self.id, other.id), (Some(a), Some(b)) if a == b)
    }
}
