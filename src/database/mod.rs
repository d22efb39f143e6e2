//! Connection provider for the flashcard store
//!
//! [`Database`] owns the connection parameters and hands out one fresh SQLite
//! connection per operation. How configuration is loaded and how a connection
//! or a new database is prepared is delegated to a [`DatabaseLoading`]
//! implementation; [`SqliteLoading`] is the one used by the application.

pub mod db;
pub mod schema;

pub use db::Database;
pub use schema::{DEMO_DECK_NAME, SqliteLoading};

use rusqlite::Connection;

use crate::config::DbConfig;
use crate::error::Result;

/// Hooks a [`Database`] calls while loading settings and preparing storage.
pub trait DatabaseLoading: Send + Sync {
    fn load_configuration(&self) -> Result<DbConfig>;

    /// Runs on every freshly opened connection.
    fn configure_session(&self, conn: &Connection, config: &DbConfig) -> Result<()>;

    /// Database-wide settings applied once during initialization.
    fn configure_database(&self, conn: &Connection) -> Result<()>;

    /// Creates tables and indexes if they are absent.
    fn initialize_schema(&self, conn: &Connection) -> Result<()>;

    fn seed_demo_data(&self, conn: &mut Connection) -> Result<()>;
}
