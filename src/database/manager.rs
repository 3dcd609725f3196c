use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors surfaced by the store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    pub fn not_found(message: impl Into<String>) -> Self {
        DatabaseError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        DatabaseError::Conflict(message.into())
    }

    /// Classify constraint violations so callers see a conflict rather than a raw driver error.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            match db_err.code().as_deref() {
                // unique_violation, foreign_key_violation
                Some("23505") | Some("23503") => {
                    return DatabaseError::Conflict(db_err.message().to_string());
                }
                _ => {}
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Builds the Postgres connection pool from configuration
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let connection_string = config
            .connection_string()
            .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&connection_string)
            .await?;

        info!("Created database pool for: {}", config.redacted());
        Ok(pool)
    }
}
