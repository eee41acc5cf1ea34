//! SeaORM database layer
//!
//! Entities live under [`entities`], schema migrations under [`migration`]
//! and query operations are split per entity under [`ops`].

pub mod entities;
pub mod migration;
mod ops;

pub use ops::{
    GlobalStats, ModuleDetail, NewUser, NoteDetail, NoteFilter, PresenceDetail, PresenceStats,
    StudentDetail, StudentStats,
};

use crate::config::DatabaseConfig;
use crate::utils::error::{ApiError, Result};
use migration::Migrator;
use sea_orm::{ConnectOptions, Database as SeaOrmDatabase, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::info;

/// Handle to the relational store
#[derive(Clone)]
pub struct Database {
    pub(crate) db: DatabaseConnection,
}

impl Database {
    /// Open a connection pool against the configured database
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let mut opt = ConnectOptions::new(config.url.clone());
        opt.max_connections(config.max_connections)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .sqlx_logging(true)
            .sqlx_logging_level(log::LevelFilter::Debug);

        let db = SeaOrmDatabase::connect(opt)
            .await
            .map_err(ApiError::Database)?;

        info!("Database connection established");
        Ok(Self { db })
    }

    /// Wrap an existing connection (tests)
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<()> {
        Migrator::up(&self.db, None)
            .await
            .map_err(ApiError::Database)?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Raw connection handle
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Whether a database error is a uniqueness-constraint violation. The
/// application-level existence checks are best-effort pre-checks; the unique
/// index is the final arbiter and its violation surfaces as a 409.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    let message = err.to_string().to_lowercase();
    message.contains("unique") || message.contains("duplicate key")
}

/// Current timestamp in the column type used across the schema
pub(crate) fn now() -> sea_orm::prelude::DateTimeWithTimeZone {
    chrono::Utc::now().into()
}
