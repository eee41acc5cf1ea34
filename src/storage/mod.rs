//! Storage layer: relational database and uploaded files

pub mod database;
pub mod files;

use crate::config::Config;
use crate::utils::error::Result;

pub use database::Database;
pub use files::FileStore;

/// Aggregated storage handles shared across the application
#[derive(Clone)]
pub struct StorageLayer {
    /// Relational database
    pub database: Database,
    /// Uploaded file store
    pub files: FileStore,
}

impl StorageLayer {
    /// Connect to the database, run migrations and prepare upload directories
    pub async fn new(config: &Config) -> Result<Self> {
        let database = Database::connect(&config.database).await?;
        database.migrate().await?;
        let files = FileStore::new(&config.uploads)?;
        Ok(Self { database, files })
    }
}
