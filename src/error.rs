use std::path::PathBuf;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for a single file import
///
/// Every variant aborts the import of that file; nothing is retried or
/// skipped. The import transaction is dropped without commit. SQLite rolls
/// back the DROP/CREATE statements along with the inserts, but engines with
/// non-transactional DDL would keep them, so callers that need a clean slate
/// should re-run the import, which drops and recreates the table.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to open '{path}'")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("Unsupported schema: {message}")]
    Schema { message: String },

    #[error("DDL statement failed: {statement}")]
    DdlExecution {
        statement: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to prepare insert statement: {statement}")]
    Prepare {
        statement: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Row {row} could not be inserted into '{table}'")]
    RowBind {
        table: String,
        row: u64,
        #[source]
        source: BoxError,
    },

    #[error("Failed to read row {row} from source")]
    Cursor {
        row: u64,
        #[source]
        source: BoxError,
    },

    #[error("Failed to {action} import transaction for '{table}'")]
    Transaction {
        action: &'static str,
        table: String,
        #[source]
        source: sqlx::Error,
    },
}

impl ImportError {
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }
}
