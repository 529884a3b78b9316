//! Parquet file reader implementation.

use anyhow::{Context, Result};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use parquet::arrow::async_reader::ParquetRecordBatchStreamBuilder;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tokio::fs::File;

use crate::formats::record::{Record, RowSource};

use super::conversion::record_batch_to_records;
use super::schema::{FieldDescriptor, field_descriptors};

/// An opened Parquet file whose footer metadata has been read
pub struct ParquetFile {
    path: PathBuf,
    builder: ParquetRecordBatchStreamBuilder<File>,
}

impl ParquetFile {
    /// Open a file and read its Parquet metadata
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .await
            .with_context(|| format!("Failed to open file '{}'", path.display()))?;

        // Read Parquet metadata from footer
        let builder = ParquetRecordBatchStreamBuilder::new(file)
            .await
            .with_context(|| format!("Failed to read Parquet metadata from '{}'", path.display()))?;

        Ok(Self { path, builder })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Top-level columns of the file, in schema order
    pub fn fields(&self) -> Result<Vec<FieldDescriptor>> {
        field_descriptors(self.builder.metadata().file_metadata().schema_descr())
    }

    /// Total number of rows recorded in the file footer
    pub fn num_rows(&self) -> u64 {
        self.builder
            .metadata()
            .row_groups()
            .iter()
            .map(|rg| rg.num_rows() as u64)
            .sum()
    }

    /// Start streaming rows, decoding `batch_size` rows at a time
    pub fn into_cursor(self, batch_size: usize) -> Result<ParquetCursor> {
        let field_names = self
            .builder
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();

        let stream = self
            .builder
            .with_batch_size(batch_size)
            .build()
            .context("Failed to build Parquet stream")?;

        Ok(ParquetCursor {
            path: self.path,
            field_names,
            stream: stream.boxed(),
            pending: VecDeque::new(),
        })
    }
}

/// Row cursor over a Parquet file
///
/// Decodes one record batch at a time and hands its rows out in order.
pub struct ParquetCursor {
    path: PathBuf,
    field_names: Vec<String>,
    stream: BoxStream<'static, parquet::errors::Result<RecordBatch>>,
    pending: VecDeque<Record>,
}

#[async_trait]
impl RowSource for ParquetCursor {
    fn field_names(&self) -> &[String] {
        &self.field_names
    }

    async fn next_row(&mut self) -> Result<Option<Record>> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Ok(Some(record));
            }

            let Some(batch_result) = self.stream.next().await else {
                return Ok(None);
            };
            let batch = batch_result.context("Failed to read record batch")?;

            let records = record_batch_to_records(&batch)
                .context("Failed to convert RecordBatch to Records")?;
            self.pending.extend(records);
        }
    }

    fn close(self) {
        tracing::debug!(path = %self.path.display(), "closing parquet reader");
    }
}

#[cfg(test)]
pub(crate) mod test_files {
    use arrow::array::*;
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use parquet::file::properties::WriterProperties;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    pub fn trades_schema() -> Schema {
        Schema::new(vec![
            Field::new("id", DataType::Int32, false),
            Field::new("symbol", DataType::Utf8, true),
            Field::new("price", DataType::Float64, true),
            Field::new("volume", DataType::Int64, true),
        ])
    }

    /// Helper to create a test Parquet file with `num_rows` trades rows
    pub fn create_trades_file(
        dir: &Path,
        filename: &str,
        num_rows: usize,
        row_group_size: usize,
    ) -> PathBuf {
        let path = dir.join(filename);
        let schema = Arc::new(trades_schema());

        let props = WriterProperties::builder()
            .set_max_row_group_size(row_group_size)
            .build();

        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, Arc::clone(&schema), Some(props)).unwrap();

        // Write data in batches
        let batch_size = 100;
        for start in (0..num_rows).step_by(batch_size) {
            let end = std::cmp::min(start + batch_size, num_rows);

            let id_array = Int32Array::from_iter_values(start as i32..end as i32);
            let symbol_array = StringArray::from_iter(
                (start..end).map(|i| (i % 7 != 3).then(|| format!("SYM{}", i % 5))),
            );
            let price_array = Float64Array::from_iter_values((start..end).map(|i| i as f64 * 1.5));
            let volume_array = Int64Array::from_iter_values((start..end).map(|i| i as i64 * 100));

            let batch = RecordBatch::try_new(
                Arc::clone(&schema),
                vec![
                    Arc::new(id_array),
                    Arc::new(symbol_array),
                    Arc::new(price_array),
                    Arc::new(volume_array),
                ],
            )
            .unwrap();

            writer.write(&batch).unwrap();
        }

        writer.close().unwrap();
        path
    }

    /// Write a single batch to a new Parquet file
    pub fn create_file_from_batch(dir: &Path, filename: &str, batch: &RecordBatch) -> PathBuf {
        let path = dir.join(filename);
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::test_files::create_trades_file;
    use super::*;
    use crate::formats::record::Value;
    use parquet::basic::Type as PhysicalType;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_parquet_file_metadata() {
        let dir = TempDir::new().unwrap();
        let path = create_trades_file(dir.path(), "trades.parquet", 100, 10_000);

        let file = ParquetFile::open(&path).await.unwrap();
        assert_eq!(file.num_rows(), 100);
        assert_eq!(file.path(), path.as_path());

        let fields = file.fields().unwrap();
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "symbol", "price", "volume"]);
        assert_eq!(fields[0].physical_type, PhysicalType::INT32);
        assert_eq!(fields[1].physical_type, PhysicalType::BYTE_ARRAY);
        assert_eq!(fields[2].physical_type, PhysicalType::DOUBLE);
        assert_eq!(fields[3].physical_type, PhysicalType::INT64);
    }

    #[tokio::test]
    async fn test_cursor_yields_rows_in_order_across_row_groups() {
        let dir = TempDir::new().unwrap();
        // Multiple row groups and a batch size that does not divide them
        let path = create_trades_file(dir.path(), "trades.parquet", 1000, 100);

        let file = ParquetFile::open(&path).await.unwrap();
        let mut cursor = file.into_cursor(64).unwrap();
        assert_eq!(cursor.field_names(), ["id", "symbol", "price", "volume"]);

        let mut expected_id = 0i64;
        while let Some(record) = cursor.next_row().await.unwrap() {
            assert_eq!(record.fields[0], Value::Integer(expected_id));
            assert_eq!(record.fields[2], Value::Real(expected_id as f64 * 1.5));
            expected_id += 1;
        }
        assert_eq!(expected_id, 1000);

        // Exhausted cursors stay exhausted
        assert!(cursor.next_row().await.unwrap().is_none());
        cursor.close();
    }

    #[tokio::test]
    async fn test_cursor_on_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = create_trades_file(dir.path(), "empty.parquet", 0, 100);

        let file = ParquetFile::open(&path).await.unwrap();
        assert_eq!(file.num_rows(), 0);
        assert_eq!(file.fields().unwrap().len(), 4);

        let mut cursor = file.into_cursor(16).unwrap();
        assert!(cursor.next_row().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_rejects_non_parquet_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("not_parquet.parquet");
        std::fs::write(&path, b"id,name\n1,Alice\n").unwrap();

        assert!(ParquetFile::open(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = ParquetFile::open(dir.path().join("missing.parquet"))
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("Failed to open file"));
    }
}
