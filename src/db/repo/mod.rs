//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by domain:
//! - `clients.rs` - Client operations
//! - `billing.rs` - Invoice, proposal, and retainer operations
//! - `ledger.rs` - Income and expense operations
//! - `automations.rs` - Automation and credential operations
//! - `workflows.rs` - Workflow and workflow version operations
//!
//! Money is stored as canonical decimal TEXT and summed in Rust, never with
//! SQLite's REAL-valued SUM.

mod automations;
mod billing;
mod clients;
mod ledger;
mod workflows;

// Single-row inserts against an open transaction, for callers that group
// several writes atomically.
pub(crate) use automations::insert_automation_in;
pub(crate) use billing::{insert_invoice_in, insert_proposal_in, insert_retainer_in};
pub(crate) use clients::insert_client_in;
pub(crate) use ledger::{insert_expense_in, insert_income_in};
pub(crate) use workflows::insert_workflow_in;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::str::FromStr;

use crate::domain::Decimal;

/// Repository for database operations.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Connectivity check used by the readiness endpoint.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Number of rows in `table`. Only called with names from
    /// [`crate::db::migrations::TABLES`].
    pub async fn count_rows(&self, table: &str) -> Result<i64, sqlx::Error> {
        if !crate::db::migrations::TABLES.contains(&table) {
            return Err(sqlx::Error::Protocol(format!("unknown table {table}")));
        }
        let sql = format!("SELECT COUNT(*) AS n FROM {table}");
        let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
        Ok(row.get::<i64, _>("n"))
    }
}

fn column_error(
    column: &str,
    err: impl std::error::Error + Send + Sync + 'static,
) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(err),
    }
}

fn get_decimal(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(&raw).map_err(|e| column_error(column, e))
}

fn get_date(row: &SqliteRow, column: &str) -> Result<NaiveDate, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    NaiveDate::from_str(&raw).map_err(|e| column_error(column, e))
}

fn get_opt_date(row: &SqliteRow, column: &str) -> Result<Option<NaiveDate>, sqlx::Error> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|s| NaiveDate::from_str(&s).map_err(|e| column_error(column, e)))
        .transpose()
}

fn get_parsed<T>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>().map_err(|e| column_error(column, e))
}

fn get_json<T: DeserializeOwned>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    serde_json::from_str(&raw).map_err(|e| column_error(column, e))
}

fn date_text(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Repository;
    use crate::db::init_db;
    use tempfile::TempDir;

    /// A repository over a fresh database; keep the TempDir alive.
    pub async fn repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::repo;

    #[tokio::test]
    async fn test_ping_and_count_rows() {
        let (repo, _temp) = repo().await;
        repo.ping().await.unwrap();
        assert_eq!(repo.count_rows("clients").await.unwrap(), 0);
        assert!(repo.count_rows("sqlite_master; DROP TABLE clients").await.is_err());
    }
}
