//! SQLite schema, session settings and demo data.

use log::info;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, params};

use super::DatabaseLoading;
use crate::config::{Config, DbConfig};
use crate::error::Result;
use crate::models::now;

pub const DEMO_DECK_NAME: &str = "Demo Deck";

const DEMO_DECK_DESCRIPTION: &str = "Demonstration deck to get familiar with the app";

const DEMO_CARDS: [(&str, &str); 5] = [
    ("What is Java?", "An object-oriented programming language"),
    ("What is the JVM?", "Java Virtual Machine, the runtime that executes Java bytecode"),
    ("What is OOP?", "Object-oriented programming"),
    ("What is a class?", "A template for creating objects"),
    ("What is encapsulation?", "Hiding the internal implementation of a class"),
];

/// Page cache per connection, in KiB (negative means KiB to SQLite).
const CACHE_SIZE_KIB: i64 = -32_768;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS decks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        description TEXT,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    CREATE TABLE IF NOT EXISTS cards (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        question TEXT NOT NULL,
        answer TEXT NOT NULL,
        deck_id INTEGER NOT NULL,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (deck_id) REFERENCES decks(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_cards_deck_id ON cards(deck_id);
    CREATE INDEX IF NOT EXISTS idx_decks_name ON decks(name);
    CREATE INDEX IF NOT EXISTS idx_decks_created_at ON decks(created_at);
    CREATE INDEX IF NOT EXISTS idx_cards_created_at ON cards(created_at);
";

/// Reads configuration from the standard candidate files and prepares a
/// bundled SQLite database.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteLoading;

impl DatabaseLoading for SqliteLoading {
    fn load_configuration(&self) -> Result<DbConfig> {
        Ok(Config::load()?.db)
    }

    fn configure_session(&self, conn: &Connection, config: &DbConfig) -> Result<()> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.pragma_update(None, "cache_size", CACHE_SIZE_KIB)?;
        conn.busy_timeout(config.busy_timeout())?;

        // SQLite's LOWER() only folds ASCII
        conn.create_scalar_function(
            "fold_case",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let text: Option<String> = ctx.get(0)?;
                Ok(text.map(|t| t.to_lowercase()))
            },
        )?;

        Ok(())
    }

    fn configure_database(&self, conn: &Connection) -> Result<()> {
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        info!("Database configured successfully (journal mode {})", mode);
        Ok(())
    }

    fn initialize_schema(&self, conn: &Connection) -> Result<()> {
        info!("Creating database tables...");
        conn.execute_batch(SCHEMA)?;
        info!("Database tables and indexes created successfully");
        Ok(())
    }

    /// Inserts the demo deck and its cards in one transaction, unless a deck
    /// with the demo name is already present.
    fn seed_demo_data(&self, conn: &mut Connection) -> Result<()> {
        let existing: i64 = conn.query_row(
            "SELECT COUNT(*) FROM decks WHERE name = ?1",
            params![DEMO_DECK_NAME],
            |row| row.get(0),
        )?;

        if existing > 0 {
            info!("Demo deck already exists, skipping creation");
            return Ok(());
        }

        let timestamp = now();
        let tx = conn.transaction()?;

        let deck_id: i64 = tx.query_row(
            "INSERT INTO decks (name, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3) RETURNING id",
            params![DEMO_DECK_NAME, DEMO_DECK_DESCRIPTION, timestamp],
            |row| row.get(0),
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO cards (question, answer, deck_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
            )?;
            for (question, answer) in DEMO_CARDS {
                stmt.execute(params![question, answer, deck_id, timestamp])?;
            }
        }

        tx.commit()?;
        info!("Demo deck created with {} cards", DEMO_CARDS.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        SqliteLoading
            .configure_session(&conn, &DbConfig::default())
            .unwrap();
        conn
    }

    #[test]
    fn test_schema_can_be_applied_twice() {
        let conn = session();
        SqliteLoading.initialize_schema(&conn).unwrap();
        SqliteLoading.initialize_schema(&conn).unwrap();

        let indexes: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(indexes, 4);
    }

    #[test]
    fn test_fold_case_handles_non_ascii() {
        let conn = session();
        let folded: String = conn
            .query_row("SELECT fold_case('ŻÓŁW Java')", [], |row| row.get(0))
            .unwrap();
        assert_eq!(folded, "żółw java");
    }

    #[test]
    fn test_seed_inserts_cards_in_order() {
        let mut conn = session();
        SqliteLoading.initialize_schema(&conn).unwrap();
        SqliteLoading.seed_demo_data(&mut conn).unwrap();
        SqliteLoading.seed_demo_data(&mut conn).unwrap();

        let mut stmt = conn
            .prepare("SELECT question FROM cards ORDER BY created_at ASC, id ASC")
            .unwrap();
        let questions: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();

        assert_eq!(questions.len(), DEMO_CARDS.len());
        assert_eq!(questions[0], "What is Java?");
    }

    #[test]
    fn test_cascade_delete_removes_cards() {
        let mut conn = session();
        SqliteLoading.initialize_schema(&conn).unwrap();
        SqliteLoading.seed_demo_data(&mut conn).unwrap();

        conn.execute("DELETE FROM decks WHERE name = ?1", params![DEMO_DECK_NAME])
            .unwrap();

        let cards: i64 = conn
            .query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))
            .unwrap();
        assert_eq!(cards, 0);
    }
}
