//! File format readers

pub mod parquet;
pub mod record;

pub use record::{Record, RowSource, Value};
