//! Database handle shared by every repository
//!
//! Built once at startup and passed around as `Arc<Database>`. Connections are
//! never pooled: each call to [`Database::get_connection`] opens a new one and
//! the caller drops it when its unit of work is done.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rusqlite::Connection;

use super::{DatabaseLoading, SqliteLoading};
use crate::config::DbConfig;
use crate::error::{AppError, Result};

pub struct Database {
    config: DbConfig,
    path: PathBuf,
    loading: Box<dyn DatabaseLoading>,
}

impl Database {
    /// Loads configuration from the default file candidates.
    pub fn load() -> Result<Self> {
        Self::with_loading(Box::new(SqliteLoading))
    }

    pub fn with_loading(loading: Box<dyn DatabaseLoading>) -> Result<Self> {
        let config = loading.load_configuration()?;
        Self::build(config, loading)
    }

    pub fn from_config(config: DbConfig) -> Result<Self> {
        config.validate()?;
        Self::build(config, Box::new(SqliteLoading))
    }

    fn build(config: DbConfig, loading: Box<dyn DatabaseLoading>) -> Result<Self> {
        let path = config.database_path()?;
        info!(
            "Database driver loaded successfully: {} (user '{}', file {})",
            config.driver,
            config.user,
            path.display()
        );

        Ok(Self {
            config,
            path,
            loading,
        })
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a new connection with session settings applied.
    pub fn get_connection(&self) -> Result<Connection> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| AppError::connection("Cannot create database directory", e))?;
            }
        }

        let conn = Connection::open(&self.path)
            .map_err(|e| AppError::connection("Cannot connect to database", e))?;

        self.loading
            .configure_session(&conn, &self.config)
            .map_err(|e| AppError::connection("Cannot configure database session", e))?;

        debug!("Database connection established");
        Ok(conn)
    }

    /// Opens one connection, runs a trivial query and closes it again.
    pub fn check_connection(&self) -> Result<()> {
        let conn = self.get_connection()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(|e| AppError::connection("Database connection test failed", e))?;
        conn.close()
            .map_err(|(_, e)| AppError::connection("Database connection test failed", e))
    }

    /// Like [`Database::check_connection`], but never fails; problems are logged.
    pub fn test_connection(&self) -> bool {
        match self.check_connection() {
            Ok(()) => true,
            Err(e) => {
                warn!("Database connection test failed: {}", e);
                false
            }
        }
    }

    /// Creates the schema and the demo deck if they are missing.
    ///
    /// Safe to run on every start.
    pub fn initialize_database(&self) -> Result<()> {
        info!("Starting database initialization...");

        self.run_initialization()
            .map_err(|e| AppError::connection("Exception while initializing database", e))?;

        info!("Database initialization completed successfully");
        Ok(())
    }

    fn run_initialization(&self) -> Result<()> {
        let mut conn = self.get_connection()?;
        self.loading.configure_database(&conn)?;
        self.loading.initialize_schema(&conn)?;
        self.loading.seed_demo_data(&mut conn)?;
        Ok(())
    }

    pub fn clear_all_tables(&self) -> Result<()> {
        let conn = self.get_connection()?;
        conn.execute_batch("DELETE FROM cards; DELETE FROM decks;")
            .map_err(|e| AppError::Repository {
                message: "Cannot clear tables".to_string(),
                source: Some(e),
            })?;

        info!("All tables cleared successfully");
        Ok(())
    }

    /// Best-effort cleanup at process exit; failures are only logged.
    pub fn shutdown(&self) {
        let result = self.get_connection().and_then(|conn| {
            conn.execute_batch("PRAGMA optimize;")?;
            conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
            Ok(())
        });

        match result {
            Ok(()) => info!("Database shutdown completed successfully"),
            Err(e) => warn!("Error during database shutdown: {}", e),
        }
    }
}
