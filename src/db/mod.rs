//! Local key-value persistence.
//!
//! Holds the two pieces of user state that survive restarts:
//! - the theme preference (`"dark"` / `"light"`)
//! - the recent calculation history (JSON array)

mod debounce;

pub use debounce::DebouncedWriter;

use anyhow::{Context, Result};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use thiserror::Error;

/// Storage key for the theme preference.
pub const THEME_KEY: &str = "theme";

/// Storage key for the calculation history.
pub const HISTORY_KEY: &str = "calculationHistory";

/// Failure reading, writing, or decoding persisted state.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("malformed stored value: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("persistence task for '{0}' has stopped")]
    WriterStopped(String),
}

/// SQLite-backed key-value store.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the store.
    pub async fn new(database_url: &str) -> Result<Self> {
        // A single connection also keeps `sqlite::memory:` databases alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        let db = Self { pool };
        db.run_migrations()
            .await
            .context("Failed to initialize key-value table")?;

        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Read a stored value.
    pub async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    /// Insert or replace a value.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Close the pool; later reads and writes fail.
    #[cfg(test)]
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_db() -> Database {
        Database::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_set_get_overwrite() {
        let db = memory_db().await;
        assert_eq!(db.get(THEME_KEY).await.unwrap(), None);

        db.set(THEME_KEY, "dark").await.unwrap();
        assert_eq!(db.get(THEME_KEY).await.unwrap().as_deref(), Some("dark"));

        db.set(THEME_KEY, "light").await.unwrap();
        assert_eq!(db.get(THEME_KEY).await.unwrap().as_deref(), Some("light"));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let db = memory_db().await;
        db.set(THEME_KEY, "dark").await.unwrap();
        db.set(HISTORY_KEY, "[]").await.unwrap();
        db.set(HISTORY_KEY, "[1]").await.unwrap();

        assert_eq!(db.get(HISTORY_KEY).await.unwrap().as_deref(), Some("[1]"));
        assert_eq!(db.get(THEME_KEY).await.unwrap().as_deref(), Some("dark"));
        tokio_test::assert_ok!(db.get("missing").await);
    }

    #[tokio::test]
    async fn test_closed_database_errors() {
        let db = memory_db().await;
        db.close().await;

        let err = db.set(THEME_KEY, "dark").await.unwrap_err();
        assert!(matches!(err, PersistenceError::Storage(_)));
    }
}
