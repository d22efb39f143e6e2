//! Database configuration
//!
//! Settings come from the first TOML file found among a few candidate paths
//! (or the file named by `FLASHCARDS_CONFIG`). Every key is optional and falls
//! back to a built-in default; the mandatory ones must not be blank.
//!
//! ```toml
//! [db]
//! url = "sqlite:./data/flashcards.db"
//! user = "sa"
//! password = ""
//! driver = "sqlite"
//!
//! [db.pool]
//! maxConnections = 10
//! timeout = 30000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub const CONFIG_ENV_VAR: &str = "FLASHCARDS_CONFIG";

pub const CONFIG_CANDIDATES: [&str; 3] = [
    "application.toml",
    "config/application.toml",
    "database.toml",
];

/// The only driver compiled into this build (rusqlite, bundled).
pub const SQLITE_DRIVER: &str = "sqlite";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub url: String,
    pub user: String,
    pub password: String,
    pub driver: String,
    pub pool: PoolConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PoolConfig {
    /// Accepted for compatibility; connections are never pooled.
    pub max_connections: u32,
    /// Milliseconds a connection waits on a locked database.
    pub timeout: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:./data/flashcards.db".to_string(),
            user: "sa".to_string(),
            password: String::new(),
            driver: SQLITE_DRIVER.to_string(),
            pool: PoolConfig::default(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            timeout: 30_000,
        }
    }
}

impl Config {
    /// Loads from `FLASHCARDS_CONFIG` if set, otherwise from the first
    /// existing candidate file in the working directory.
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::load_from(&[PathBuf::from(path)]),
            _ => {
                let candidates: Vec<PathBuf> =
                    CONFIG_CANDIDATES.iter().map(PathBuf::from).collect();
                Self::load_from(&candidates)
            }
        }
    }

    /// Reads the first candidate that exists; later candidates are ignored.
    pub fn load_from(candidates: &[PathBuf]) -> Result<Self> {
        let config = match candidates.iter().find(|path| path.is_file()) {
            Some(path) => {
                let config = Self::read_file(path)?;
                info!("Properties loaded from: {}", path.display());
                config
            }
            None => {
                warn!("No properties file found, using defaults");
                Self::default()
            }
        };

        config.db.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| AppError::Configuration(format!("Invalid configuration: {}", e)))?;
        config.db.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!("Cannot read {}: {}", path.display(), e))
        })?;

        toml::from_str(&contents).map_err(|e| {
            AppError::Configuration(format!("Invalid configuration in {}: {}", path.display(), e))
        })
    }
}

impl DbConfig {
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("db.url", &self.url),
            ("db.user", &self.user),
            ("db.driver", &self.driver),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Configuration(format!(
                    "Required property missing: {}",
                    key
                )));
            }
        }

        if !self.driver.trim().eq_ignore_ascii_case(SQLITE_DRIVER) {
            return Err(AppError::Configuration(format!(
                "Database driver not found: {}",
                self.driver
            )));
        }

        Ok(())
    }

    /// Resolves `db.url` to the database file it points at.
    ///
    /// Accepts `sqlite://path`, `sqlite:path` and bare paths.
    pub fn database_path(&self) -> Result<PathBuf> {
        let url = self.url.trim();
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);

        if path.is_empty() {
            return Err(AppError::Configuration(format!(
                "db.url does not name a database file: {}",
                self.url
            )));
        }

        Ok(PathBuf::from(path))
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.pool.timeout)
    }
}
