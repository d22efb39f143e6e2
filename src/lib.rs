pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;
pub mod repository;
pub mod service;

pub use database::Database;
pub use error::{AppError, Result};
pub use models::{Card, Deck};
pub use service::Services;
