//! Database initialization and schema migration.

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Tables the service expects after migration, in creation order.
pub const TABLES: &[&str] = &[
    "clients",
    "invoices",
    "proposals",
    "retainers",
    "income",
    "expenses",
    "workflows",
    "workflow_versions",
    "automations",
    "credentials",
];

/// Open (creating if needed) the SQLite database at `db_path` and bring its
/// schema up to date.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }
    }

    // pragmas are applied per connection by the connect options
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    info!(path = %db_path, "Database initialized");
    Ok(pool)
}

/// Apply `schema.sql`. Every statement is `IF NOT EXISTS`, so re-running is
/// harmless.
pub(crate) async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let schema_sql = include_str!("schema.sql");

    let mut applied = 0usize;
    for statement in schema_sql.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
            applied += 1;
        }
    }

    info!(statements = applied, "Migrations applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn fresh_pool(dir: &TempDir) -> SqlitePool {
        let db_path = dir.path().join("ops.db").to_string_lossy().to_string();
        init_db(&db_path).await.expect("init_db failed")
    }

    #[tokio::test]
    async fn test_init_db_creates_nested_path() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("data/nested/ops.db")
            .to_string_lossy()
            .to_string();

        let pool = init_db(&db_path).await.expect("init_db failed");
        assert!(Path::new(&db_path).exists());

        let result: (i64,) = sqlx::query_as("SELECT 1").fetch_one(&pool).await.unwrap();
        assert_eq!(result.0, 1);
    }

    #[tokio::test]
    async fn test_init_db_reports_unusable_parent() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let db_path = blocker.join("ops.db").to_string_lossy().to_string();

        let err = init_db(&db_path).await.unwrap_err();
        assert!(matches!(err, sqlx::Error::Io(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_all_tables_exist() {
        let temp_dir = TempDir::new().unwrap();
        let pool = fresh_pool(&temp_dir).await;

        for table in TABLES {
            let found: Option<(String,)> =
                sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name = ?")
                    .bind(table)
                    .fetch_optional(&pool)
                    .await
                    .unwrap();
            assert!(found.is_some(), "missing table {table}");
        }
    }

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let pool = fresh_pool(&temp_dir).await;

        run_migrations(&pool).await.expect("second run failed");

        let result: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type='table'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(result.0, TABLES.len() as i64);
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let temp_dir = TempDir::new().unwrap();
        let pool = fresh_pool(&temp_dir).await;

        let result: (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(result.0, 1);

        let insert = sqlx::query(
            "INSERT INTO proposals (id, client_id, title, amount, status, created_at)
             VALUES ('p1', 'no-such-client', 'Film', '10', 'draft', '2026-01-01')",
        )
        .execute(&pool)
        .await;
        assert!(insert.is_err());
    }
}
