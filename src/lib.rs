pub mod browser;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod db;
pub mod models;
pub mod session;

use std::sync::Arc;
use thiserror::Error;

use catalog::{CardRepository, SqliteCardRepository};
use config::AppConfig;
use db::Database;

#[derive(Error, Debug)]
pub enum InitError {
    #[error("Failed to create data directory: {0}")]
    DataDir(#[from] std::io::Error),

    #[error("Database initialization failed: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database path is not valid UTF-8")]
    InvalidPath,
}

/// Process-wide handles, built once at startup and shared by every
/// browsing session.
pub struct App {
    config: AppConfig,
    db: Arc<Database>,
    repository: Arc<SqliteCardRepository>,
}

impl App {
    pub fn init(config: AppConfig) -> Result<Self, InitError> {
        std::fs::create_dir_all(&config.data_dir)?;

        let db_path = config.db_path();
        log::info!("Database path: {:?}", db_path);
        let db_path_str = db_path.to_str().ok_or(InitError::InvalidPath)?;

        let database = match Database::new(db_path_str) {
            Ok(db) => db,
            Err(e) => {
                log::error!("Database initialization failed: {}", e);
                log::error!(
                    "This might be due to a failed migration or database corruption. \
                     Backups are located at {:?}; replace {} with the most recent one \
                     and restart.",
                    config.backup_dir(),
                    config.db_file
                );
                return Err(e.into());
            }
        };

        let db = Arc::new(database);
        let repository = Arc::new(SqliteCardRepository::new(Arc::clone(&db)));

        Ok(Self {
            config,
            db,
            repository,
        })
    }

    pub fn from_env() -> Result<Self, InitError> {
        Self::init(AppConfig::from_env())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn repository(&self) -> Arc<dyn CardRepository> {
        self.repository.clone()
    }
}
