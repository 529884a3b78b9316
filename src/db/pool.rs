//! SQLite connection pool used as the import destination.
use anyhow::{Context, Result};
use derive_builder::Builder;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;

use crate::config::{BUSY_TIMEOUT, CONNECT_TIMEOUT};

// Wrap the sqlx pool so the rest of the crate only sees the operations an
// import needs.
#[derive(Debug, Clone)]
pub struct Pool {
    inner: SqlitePool,
}

#[derive(Builder)]
pub struct PoolArgs {
    /// sqlx SQLite URL, e.g. `sqlite://imports.db` or `sqlite::memory:`
    #[builder(setter(into))]
    database_url: String,
    /// SQLite allows a single writer, so more than one connection only helps readers.
    #[builder(default = "1")]
    max_connections: u32,
    #[builder(default = "true")]
    create_if_missing: bool,
}

pub async fn pool(args: PoolArgs) -> Result<Pool> {
    let PoolArgs {
        database_url,
        max_connections,
        create_if_missing,
    } = args;

    let connect_options = SqliteConnectOptions::from_str(&database_url)
        .with_context(|| format!("Invalid SQLite database URL '{}'", database_url))?
        .create_if_missing(create_if_missing)
        .busy_timeout(BUSY_TIMEOUT);

    let inner = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(CONNECT_TIMEOUT)
        .connect_with(connect_options)
        .await
        .with_context(|| format!("Failed to open database '{}'", database_url))?;

    tracing::info!(database_url, max_connections, "database pool ready");

    Ok(Pool { inner })
}

impl Pool {
    /// Create an in-memory SQLite pool for testing
    ///
    /// Every connection to `sqlite::memory:` opens a separate database, so
    /// the pool is pinned to one long-lived connection.
    #[cfg(test)]
    pub async fn sqlite_in_memory() -> Result<Self, sqlx::Error> {
        let inner = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Ok(Pool { inner })
    }

    /// Start a transaction on a pooled connection
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.inner.begin().await
    }

    /// Execute a statement outside of any import transaction
    pub async fn execute_query(&self, sql: &str) -> Result<(), sqlx::Error> {
        sqlx::query(sql).execute(&self.inner).await?;
        Ok(())
    }

    /// Close all connections, waiting for checked-out ones to be returned
    pub async fn close(&self) {
        self.inner.close().await;
    }

    /// Column names and declared types of a table, in ordinal order
    #[cfg(test)]
    pub async fn table_columns(&self, table_name: &str) -> Result<Vec<(String, String)>, sqlx::Error> {
        let pragma_sql = format!(
            "PRAGMA table_info({})",
            crate::db::schema::quote_ident(table_name)
        );
        let rows: Vec<(i64, String, String, i64, Option<String>, i64)> =
            sqlx::query_as(&pragma_sql).fetch_all(&self.inner).await?;

        Ok(rows
            .into_iter()
            .map(|(_, name, col_type, _, _, _)| (name, col_type))
            .collect())
    }

    /// Number of rows in a table
    #[cfg(test)]
    pub async fn count_rows(&self, table_name: &str) -> Result<i64, sqlx::Error> {
        let sql = format!(
            "SELECT COUNT(*) FROM {}",
            crate::db::schema::quote_ident(table_name)
        );
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(&self.inner).await?;
        Ok(count)
    }

    /// Whether a table with this name exists
    #[cfg(test)]
    pub async fn table_exists(&self, table_name: &str) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(table_name)
                .fetch_one(&self.inner)
                .await?;
        Ok(count > 0)
    }

    #[cfg(test)]
    pub fn sqlite(&self) -> &SqlitePool {
        &self.inner
    }
}
