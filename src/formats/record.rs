use anyhow::Result;
use async_trait::async_trait;

/// A single field value, in the forms SQLite can bind
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// A single record (row) from the file, fields in file schema order
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub fields: Vec<Value>,
}

/// Forward-only cursor over the rows of an opened file
///
/// Each row is produced exactly once and in file order. A cursor cannot be
/// rewound; once `next_row` returns `Ok(None)` the stream is exhausted.
#[async_trait]
pub trait RowSource: Send {
    /// Field names in the order rows lay out their values
    fn field_names(&self) -> &[String];

    /// Fetch the next row, or `None` at end of stream
    async fn next_row(&mut self) -> Result<Option<Record>>;

    /// Release the underlying file
    fn close(self)
    where
        Self: Sized;
}
