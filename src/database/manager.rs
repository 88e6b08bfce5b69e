use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the data-access layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

const CREATE_POSTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS forum_posts (
        id SERIAL PRIMARY KEY,
        title VARCHAR(255) NOT NULL,
        content TEXT NOT NULL,
        author_id VARCHAR(255) NOT NULL,
        author_name VARCHAR(255) NOT NULL,
        author_image VARCHAR(255),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        likes INTEGER NOT NULL DEFAULT 0
    )
"#;

const CREATE_COMMENTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS forum_comments (
        id SERIAL PRIMARY KEY,
        post_id INTEGER NOT NULL REFERENCES forum_posts(id) ON DELETE CASCADE,
        content TEXT NOT NULL,
        author_id VARCHAR(255) NOT NULL,
        author_name VARCHAR(255) NOT NULL,
        author_image VARCHAR(255),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        likes INTEGER NOT NULL DEFAULT 0
    )
"#;

const CREATE_COMMENTS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS forum_comments_post_id_idx ON forum_comments (post_id, created_at)";

/// Owns the PostgreSQL connection pool
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    /// Connect using DATABASE_URL and pool settings from config
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Database pool created (max_connections={})", config.max_connections);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create forum tables if they do not exist yet
    pub async fn init_schema(&self) -> Result<(), DatabaseError> {
        for statement in [CREATE_POSTS_TABLE, CREATE_COMMENTS_TABLE, CREATE_COMMENTS_INDEX] {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database tables initialized");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the pool on shutdown
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}
