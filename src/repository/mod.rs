//! Repositories over the flashcard tables
//!
//! Every operation borrows exactly one connection from the [`Database`] for
//! its own duration (see [`Repository::with_connection`]) and never keeps it
//! across calls.

pub mod card;
pub mod deck;

pub use card::CardRepository;
pub use deck::DeckRepository;

use log::warn;
use rusqlite::Connection;

use crate::database::Database;
use crate::error::Result;
use crate::models::Entity;

/// CRUD contract shared by the entity repositories.
pub trait Repository<T: Entity> {
    fn database(&self) -> &Database;

    /// Inserts the entity and returns it with its generated id.
    fn save(&self, entity: T) -> Result<T>;

    /// Writes the entity back and refreshes its `updated_at`.
    fn update(&self, entity: T) -> Result<T>;

    fn find_by_id(&self, id: i64) -> Result<Option<T>>;

    fn find_all(&self) -> Result<Vec<T>>;

    fn delete_by_id(&self, id: i64) -> Result<bool>;

    /// Deletes by the entity's id; an unsaved entity deletes nothing.
    fn delete(&self, entity: &T) -> Result<bool> {
        match entity.id() {
            Some(id) => self.delete_by_id(id),
            None => Ok(false),
        }
    }

    fn exists_by_id(&self, id: i64) -> Result<bool>;

    fn count(&self) -> Result<i64>;

    /// Opens a connection, runs `operation`, and closes the connection on
    /// every path. Storage errors surface as `AppError::Repository`.
    fn with_connection<R, F>(&self, operation: F) -> Result<R>
    where
        F: FnOnce(&Connection) -> Result<R>,
        Self: Sized,
    {
        let conn = self.database().get_connection()?;
        let result = operation(&conn);

        if let Err((_, e)) = conn.close() {
            warn!("Failed to close database connection: {}", e);
        }

        result
    }
}

/// Turns `%`, `_` and `\` in user text into literals for `LIKE ... ESCAPE '\'`.
pub(crate) fn contains_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped.to_lowercase())
}
