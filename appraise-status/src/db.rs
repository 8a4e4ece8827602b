//! Read-only database access

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;

/// Open an existing database with `mode=ro`
///
/// Never creates the file; a missing database is an error.
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        anyhow::bail!("Database not found: {}", db_path.display());
    }

    let db_url = format!("sqlite://{}?mode=ro", db_path.display());

    SqlitePoolOptions::new()
        .max_connections(4)
        .connect(&db_url)
        .await
        .with_context(|| format!("Failed to open {} read-only", db_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use appraise_common::db::init_database;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_database_is_not_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("appraise.db");

        let err = connect_readonly(&path).await.unwrap_err();

        assert!(err.to_string().contains("Database not found"));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_writes_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("appraise.db");
        init_database(&path).await.unwrap().close().await;

        let pool = connect_readonly(&path).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);

        let write = sqlx::query("CREATE TABLE _probe (id INTEGER)")
            .execute(&pool)
            .await;
        assert!(write.is_err(), "read-only connection accepted a write");
    }
}
