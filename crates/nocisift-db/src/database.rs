//! Connection pool and table management.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::error::Result;
use crate::schema;

/// Main database handle.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    url: String,
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseStats {
    pub compounds: u64,
    pub favorites: u64,
    pub searches: u64,
}

impl Database {
    /// Open or create the database at `url` (e.g. `sqlite://nocisift.db`,
    /// `sqlite::memory:`).
    pub async fn open(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // Every connection to an in-memory URL gets its own database
        let max_connections = if url.contains(":memory:") { 1 } else { 4 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        debug!(url, "Opened database");
        Ok(Self { pool, url: url.to_string() })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Create all tables if they don't exist.
    pub async fn initialize(&self) -> Result<()> {
        for ddl in [
            schema::CREATE_COMPOUNDS,
            schema::CREATE_COMPOUNDS_TARGET_INDEX,
            schema::CREATE_FAVORITES,
            schema::CREATE_SEARCH_HISTORY,
        ] {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        info!(url = %self.url, "Database initialized");
        Ok(())
    }

    pub async fn stats(&self) -> Result<DatabaseStats> {
        Ok(DatabaseStats {
            compounds: self.count(schema::TABLE_COMPOUNDS).await?,
            favorites: self.count(schema::TABLE_FAVORITES).await?,
            searches: self.count(schema::TABLE_SEARCH_HISTORY).await?,
        })
    }

    async fn count(&self, table: &str) -> Result<u64> {
        // table names come from the schema constants only
        let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await?;
        Ok(n.max(0) as u64)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let db = Database::open("sqlite::memory:").await.unwrap();
        db.initialize().await.unwrap();
        db.initialize().await.unwrap();
        let stats = db.stats().await.unwrap();
        assert_eq!(stats, DatabaseStats { compounds: 0, favorites: 0, searches: 0 });
    }
}
