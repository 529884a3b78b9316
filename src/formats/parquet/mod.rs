//! Parquet file format support for the importer.
//!
//! This module provides functionality to read Apache Parquet files and import them into SQLite
//! tables. It includes:
//! - Schema extraction and mapping from Parquet physical types to SQL types
//! - Conversion from Arrow RecordBatches to row-based Records
//! - ParquetFile / ParquetCursor, which implement the RowSource trait

mod conversion;
mod reader;
mod schema;

pub use reader::{ParquetCursor, ParquetFile};
pub use schema::{FieldDescriptor, field_descriptors, map_type};

#[cfg(test)]
pub(crate) use reader::test_files;
