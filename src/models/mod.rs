pub mod card;
pub mod deck;

pub use card::Card;
pub use deck::Deck;

use chrono::{Local, NaiveDateTime};

/// Anything with a storage-assigned identity.
pub trait Entity {
    /// `None` until the entity has been saved.
    fn id(&self) -> Option<i64>;
}

/// Current local wall-clock time, the resolution every timestamp uses.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
