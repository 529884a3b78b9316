//! High-level runner API for the Parquet importer.
//!
//! This module wraps pool setup, the shared table-name registry and progress
//! reporting behind a single call. It is the API used by the CLI.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::PROGRESS_TEMPLATE;
use crate::db::pool::{self as db_pool, PoolArgsBuilder};
use crate::db::Pool;
use crate::ident::IdentRegistry;
use crate::import::{FileMetadata, Importer};

/// Arguments for importing one or more Parquet files
#[derive(Debug, Clone)]
pub struct ImportArgs {
    /// sqlx SQLite URL of the destination database
    pub database_url: String,
    /// Files to import, in order. Each lands in its own table.
    pub paths: Vec<PathBuf>,
    /// Rows decoded per record batch
    pub batch_size: usize,
    pub quiet: bool,

    // Test-only: inject a pre-created pool (for in-memory SQLite)
    #[cfg(test)]
    pub test_pool: Option<Pool>,
}

/// Result of one imported file
#[derive(Debug)]
pub struct ImportResult {
    pub path: PathBuf,
    pub metadata: FileMetadata,
    pub rows_inserted: u64,
    pub duration: Duration,
}

/// Import every file in `args.paths` into the destination database
///
/// Files are imported sequentially, one transaction per file. The first
/// failure stops the run; files imported before it stay committed.
///
/// # Example
///
/// ```no_run
/// use parquet_import::runner::{ImportArgs, run_import};
/// use std::path::PathBuf;
///
/// # async fn example() -> anyhow::Result<()> {
/// let args = ImportArgs {
///     database_url: "sqlite://imports.db".to_string(),
///     paths: vec![PathBuf::from("/data/trades.gz.parquet")],
///     batch_size: 1024,
///     quiet: true,
/// };
///
/// for result in run_import(args).await? {
///     println!("{} rows into {}", result.rows_inserted, result.metadata.table_name);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn run_import(args: ImportArgs) -> Result<Vec<ImportResult>> {
    let progress = progress_bar(args.quiet);
    run_import_with_progress(args, progress).await
}

async fn run_import_with_progress(
    args: ImportArgs,
    progress: ProgressBar,
) -> Result<Vec<ImportResult>> {
    // Create connection pool (or use test pool if provided)
    #[cfg(test)]
    let (pool, owned_pool) = match args.test_pool {
        Some(test_pool) => (test_pool, false),
        None => (open_pool(&args.database_url).await?, true),
    };

    #[cfg(not(test))]
    let (pool, owned_pool) = (open_pool(&args.database_url).await?, true);

    let registry = Arc::new(IdentRegistry::new());
    let importer = Importer::new(pool.clone(), registry)
        .with_batch_size(args.batch_size)
        .with_progress(progress.clone());

    let results = import_all(&importer, args.paths).await;

    // Cleared and closed on failure too, before the error reaches the caller
    progress.finish_and_clear();
    if owned_pool {
        pool.close().await;
    }
    results
}

async fn import_all(importer: &Importer, paths: Vec<PathBuf>) -> Result<Vec<ImportResult>> {
    let mut results = Vec::with_capacity(paths.len());
    for path in paths {
        let start = Instant::now();
        let outcome = importer
            .import_file(&path)
            .await
            .with_context(|| format!("Failed to import '{}'", path.display()))?;

        results.push(ImportResult {
            path,
            metadata: outcome.metadata,
            rows_inserted: outcome.rows_inserted,
            duration: start.elapsed(),
        });
    }
    Ok(results)
}

async fn open_pool(database_url: &str) -> Result<Pool> {
    let pool_args = PoolArgsBuilder::default()
        .database_url(database_url)
        .build()?;
    db_pool::pool(pool_args).await
}

fn progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(0);
    match ProgressStyle::default_bar().template(PROGRESS_TEMPLATE) {
        Ok(style) => bar.set_style(style.progress_chars("=>-")),
        Err(e) => tracing::warn!(error = %e, "invalid progress template, using default style"),
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::parquet::test_files::create_trades_file;
    use tempfile::TempDir;

    fn args(pool: &Pool, paths: Vec<PathBuf>) -> ImportArgs {
        ImportArgs {
            database_url: "sqlite::memory:".to_string(),
            paths,
            batch_size: 100,
            quiet: false,
            test_pool: Some(pool.clone()),
        }
    }

    #[tokio::test]
    async fn test_progress_cleared_after_success() {
        let dir = TempDir::new().unwrap();
        let path = create_trades_file(dir.path(), "trades.parquet", 10, 100);
        let pool = Pool::sqlite_in_memory().await.unwrap();
        let progress = ProgressBar::hidden();

        run_import_with_progress(args(&pool, vec![path]), progress.clone())
            .await
            .unwrap();

        assert!(progress.is_finished());
        assert_eq!(progress.position(), 10);
    }

    #[tokio::test]
    async fn test_progress_cleared_after_failed_file() {
        let dir = TempDir::new().unwrap();
        let good = create_trades_file(dir.path(), "good.parquet", 5, 100);
        let bad = dir.path().join("bad.parquet");
        std::fs::write(&bad, b"not parquet").unwrap();
        let pool = Pool::sqlite_in_memory().await.unwrap();
        let progress = ProgressBar::hidden();

        let err = run_import_with_progress(args(&pool, vec![good, bad]), progress.clone())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("bad.parquet"));
        assert!(progress.is_finished());
    }

    #[tokio::test]
    async fn test_owned_pool_closed_after_failed_file() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("bad.parquet");
        std::fs::write(&bad, b"not parquet").unwrap();
        let db_path = dir.path().join("imports.db");

        let import_args = ImportArgs {
            database_url: format!("sqlite://{}", db_path.display()),
            paths: vec![bad],
            batch_size: 16,
            quiet: true,
            test_pool: None,
        };
        assert!(run_import(import_args).await.is_err());

        // The database file was created, and is free for a new writer
        assert!(db_path.exists());
        let pool = db_pool::pool(
            PoolArgsBuilder::default()
                .database_url(format!("sqlite://{}", db_path.display()))
                .create_if_missing(false)
                .build()
                .unwrap(),
        )
        .await
        .unwrap();
        pool.execute_query("CREATE TABLE t (a INTEGER)").await.unwrap();
    }
}
