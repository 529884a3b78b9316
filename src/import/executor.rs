use indicatif::ProgressBar;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnection};
use sqlx::{Executor, Statement};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::metadata::{FileMetadata, build_metadata};
use crate::config::DEFAULT_BATCH_SIZE;
use crate::db::Pool;
use crate::db::schema::{create_table_sql, drop_table_sql, insert_sql};
use crate::error::ImportError;
use crate::formats::parquet::{ParquetCursor, ParquetFile};
use crate::formats::{RowSource, Value};
use crate::ident::IdentRegistry;

/// Result of a successful import
#[derive(Debug)]
pub struct ImportOutcome {
    pub metadata: FileMetadata,
    pub rows_inserted: u64,
}

/// Imports files into tables of one database
///
/// Table names are reserved in the importer's registry, so every file
/// imported through the same registry lands in a distinct table.
pub struct Importer {
    pool: Pool,
    registry: Arc<IdentRegistry>,
    batch_size: usize,
    progress: ProgressBar,
}

impl Importer {
    pub fn new(pool: Pool, registry: Arc<IdentRegistry>) -> Self {
        Self {
            pool,
            registry,
            batch_size: DEFAULT_BATCH_SIZE,
            progress: ProgressBar::hidden(),
        }
    }

    /// Rows decoded per record batch when reading Parquet files
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Report inserted rows on this progress bar
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn registry(&self) -> &IdentRegistry {
        &self.registry
    }

    /// Import the Parquet file at `path` into a newly named table
    pub async fn import_file(&self, path: &Path) -> Result<ImportOutcome, ImportError> {
        let (metadata, cursor) = self.open_file(path).await.inspect_err(|err| {
            error!(path = %path.display(), error = ?err, "failed to open parquet file for import");
        })?;

        info!(
            path = %path.display(),
            table = %metadata.table_name,
            columns = metadata.num_columns(),
            "importing parquet file"
        );

        self.import(metadata, cursor).await
    }

    async fn open_file(&self, path: &Path) -> Result<(FileMetadata, ParquetCursor), ImportError> {
        let open_error = |source: anyhow::Error| ImportError::FileOpen {
            path: path.to_path_buf(),
            source: source.into(),
        };

        let file = ParquetFile::open(path).await.map_err(open_error)?;
        let fields = file
            .fields()
            .map_err(|e| ImportError::schema(format!("{:#}", e)))?;
        let metadata = build_metadata(path, &fields, &self.registry);

        self.progress.set_length(file.num_rows());
        self.progress.set_position(0);
        self.progress.set_message(metadata.table_name.clone());

        let cursor = file.into_cursor(self.batch_size).map_err(open_error)?;
        Ok((metadata, cursor))
    }

    /// Create the table described by `metadata` and insert every row of
    /// `cursor` into it, in one transaction.
    ///
    /// The table is dropped first if it exists. Rows are inserted in cursor
    /// order. Any failure aborts the whole import without committing.
    pub async fn import<C: RowSource>(
        &self,
        metadata: FileMetadata,
        cursor: C,
    ) -> Result<ImportOutcome, ImportError> {
        let table = metadata.table_name.clone();
        self.run_import(metadata, cursor).await.inspect_err(|err| {
            error!(table = %table, error = ?err, "parquet import failed");
        })
    }

    async fn run_import<C: RowSource>(
        &self,
        metadata: FileMetadata,
        mut cursor: C,
    ) -> Result<ImportOutcome, ImportError> {
        check_alignment(&metadata)?;
        let projection = projection(&metadata.column_names, cursor.field_names())?;
        let table = metadata.table_name.as_str();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|source| ImportError::Transaction {
                action: "begin",
                table: table.to_string(),
                source,
            })?;

        execute_ddl(&mut tx, drop_table_sql(table)).await?;
        execute_ddl(
            &mut tx,
            create_table_sql(table, &metadata.column_ids, &metadata.column_types),
        )
        .await?;
        debug!(table, "table created");

        let insert_stmt = insert_sql(table, metadata.column_names.len());
        let statement = (&mut *tx)
            .prepare(&insert_stmt)
            .await
            .map_err(|source| ImportError::Prepare {
                statement: insert_stmt.clone(),
                source,
            })?;

        let mut rows_inserted = 0u64;
        loop {
            let record = cursor
                .next_row()
                .await
                .map_err(|e| ImportError::Cursor {
                    row: rows_inserted,
                    source: e.into(),
                })?;
            let Some(record) = record else {
                break;
            };

            let mut query = statement.query();
            for &idx in &projection {
                let value = record.fields.get(idx).cloned().ok_or_else(|| {
                    ImportError::RowBind {
                        table: table.to_string(),
                        row: rows_inserted,
                        source: format!(
                            "row has {} fields, expected at least {}",
                            record.fields.len(),
                            idx + 1
                        )
                        .into(),
                    }
                })?;
                query = bind_value(query, value);
            }

            query
                .execute(&mut *tx)
                .await
                .map_err(|source| ImportError::RowBind {
                    table: table.to_string(),
                    row: rows_inserted,
                    source: source.into(),
                })?;

            rows_inserted += 1;
            self.progress.inc(1);
        }

        tx.commit()
            .await
            .map_err(|source| ImportError::Transaction {
                action: "commit",
                table: table.to_string(),
                source,
            })?;
        cursor.close();

        info!(table, rows_inserted, "import committed");

        Ok(ImportOutcome {
            metadata,
            rows_inserted,
        })
    }
}

async fn execute_ddl(conn: &mut SqliteConnection, statement: String) -> Result<(), ImportError> {
    debug!(statement = %statement, "executing ddl");
    let result = conn.execute(statement.as_str()).await;
    result
        .map(|_| ())
        .map_err(|source| ImportError::DdlExecution { statement, source })
}

fn check_alignment(metadata: &FileMetadata) -> Result<(), ImportError> {
    let n = metadata.column_ids.len();
    if n == 0 {
        return Err(ImportError::schema(format!(
            "Table '{}' has no columns",
            metadata.table_name
        )));
    }
    if metadata.column_names.len() != n || metadata.column_types.len() != n {
        return Err(ImportError::schema(format!(
            "Column ids, names and types are not aligned ({} ids, {} names, {} types)",
            n,
            metadata.column_names.len(),
            metadata.column_types.len()
        )));
    }
    Ok(())
}

/// Position of each destination column in the cursor's rows
fn projection(
    column_names: &[String],
    field_names: &[String],
) -> Result<Vec<usize>, ImportError> {
    column_names
        .iter()
        .map(|name| {
            field_names.iter().position(|f| f == name).ok_or_else(|| {
                ImportError::schema(format!("Column '{}' not found in source rows", name))
            })
        })
        .collect()
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Integer(v) => query.bind(v),
        Value::Real(v) => query.bind(v),
        Value::Text(v) => query.bind(v),
        Value::Blob(v) => query.bind(v),
    }
}
