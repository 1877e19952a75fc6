//! Database connection management.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::error::DbResult;

/// Handle to the DropIQ database.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct DropiqDb {
    pool: SqlitePool,
}

impl DropiqDb {
    /// Open or create the database at the given path.
    ///
    /// This will:
    /// 1. Create the parent directory and database file if missing
    /// 2. Configure SQLite (WAL mode, foreign keys)
    /// 3. Run any pending migrations
    pub async fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty() && !p.exists())
        {
            std::fs::create_dir_all(parent)?;
        }

        info!("Opening database: {}", path.display());

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .pragma("cache_size", "-32000") // 32MB cache
            .pragma("synchronous", "NORMAL") // Safe with WAL
            .pragma("temp_store", "MEMORY")
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;

        debug!("Database connection established");

        Self::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Open an in-memory database (for testing).
    pub async fn open_in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(":memory:")
            .journal_mode(SqliteJournalMode::Wal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(1) // In-memory must be single connection to share state
            .connect_with(options)
            .await?;

        Self::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
        debug!("Running database migrations");
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Check if the database is healthy.
    pub async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Get row counts for the main entities.
    pub async fn stats(&self) -> DbResult<DbStats> {
        Ok(DbStats {
            user_count: self.count("SELECT COUNT(*) FROM users").await?,
            airdrop_count: self.count("SELECT COUNT(*) FROM airdrops").await?,
            pending_airdrop_count: self
                .count("SELECT COUNT(*) FROM airdrops WHERE status = 'pending'")
                .await?,
            campaign_count: self.count("SELECT COUNT(*) FROM campaigns").await?,
            strategy_count: self.count("SELECT COUNT(*) FROM strategies").await?,
            blacklist_count: self.count("SELECT COUNT(*) FROM blacklist").await?,
            automated_task_count: self.count("SELECT COUNT(*) FROM automated_tasks").await?,
        })
    }

    async fn count(&self, sql: &'static str) -> DbResult<u64> {
        let row: (i64,) = sqlx::query_as(sql).fetch_one(&self.pool).await?;
        Ok(row.0 as u64)
    }
}

/// Database statistics.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DbStats {
    pub user_count: u64,
    pub airdrop_count: u64,
    pub pending_airdrop_count: u64,
    pub campaign_count: u64,
    pub strategy_count: u64,
    pub blacklist_count: u64,
    pub automated_task_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = DropiqDb::open_in_memory().await.unwrap();
        db.health_check().await.unwrap();

        let stats = db.stats().await.unwrap();
        assert_eq!(stats.user_count, 0);
        assert_eq!(stats.airdrop_count, 0);
        assert_eq!(stats.campaign_count, 0);
    }

    #[tokio::test]
    async fn test_open_file_creates_parent_dir() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("dropiq.db");
        let db = DropiqDb::open(&db_path).await.unwrap();
        db.health_check().await.unwrap();
        assert!(db_path.exists());
        db.close().await;
    }
}
