use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::db::SqlType;
use crate::formats::parquet::{FieldDescriptor, map_type};
use crate::ident::{IdentRegistry, gen_table_name};

/// Per-import options. No options exist yet; the bag is kept so the
/// descriptor format stays stable when some are added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {}

/// Description of the table a file is imported into
///
/// `column_ids`, `column_names` and `column_types` are index-aligned.
/// `column_ids` are the identifiers used in DDL and `column_names` are the
/// source field names rows are projected by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub column_ids: Vec<String>,
    pub column_names: Vec<String>,
    pub column_types: Vec<Option<SqlType>>,
    pub table_name: String,
    /// Set to 0 on construction and not updated by the import
    pub row_count: u64,
    pub options: ImportOptions,
}

impl FileMetadata {
    pub fn num_columns(&self) -> usize {
        self.column_ids.len()
    }
}

/// Build the import descriptor for the file at `path` with the given columns
///
/// Reserves the table name in `registry`.
pub fn build_metadata(
    path: &Path,
    fields: &[FieldDescriptor],
    registry: &IdentRegistry,
) -> FileMetadata {
    let column_names: Vec<String> = fields.iter().map(|f| f.name.clone()).collect();
    let column_types = fields
        .iter()
        .map(|f| Some(map_type(f.physical_type)))
        .collect();

    FileMetadata {
        column_ids: column_names.clone(),
        column_names,
        column_types,
        table_name: gen_table_name(path, registry),
        row_count: 0,
        options: ImportOptions::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parquet::basic::Type as PhysicalType;

    fn field(name: &str, physical_type: PhysicalType, position: usize) -> FieldDescriptor {
        FieldDescriptor {
            name: name.to_string(),
            physical_type,
            position,
        }
    }

    #[test]
    fn test_build_metadata() {
        let registry = IdentRegistry::new();
        let fields = vec![
            field("id", PhysicalType::INT64, 0),
            field("symbol", PhysicalType::BYTE_ARRAY, 1),
            field("price", PhysicalType::DOUBLE, 2),
            field("flag", PhysicalType::BOOLEAN, 3),
        ];

        let md = build_metadata(Path::new("/data/trades.gz.parquet"), &fields, &registry);

        assert_eq!(md.table_name, "trades_gz");
        assert_eq!(md.column_names, vec!["id", "symbol", "price", "flag"]);
        assert_eq!(md.column_ids, md.column_names);
        assert_eq!(
            md.column_types,
            vec![
                Some(SqlType::Integer),
                Some(SqlType::Text),
                Some(SqlType::Real),
                Some(SqlType::Text),
            ]
        );
        assert_eq!(md.row_count, 0);
        assert_eq!(md.options, ImportOptions::default());
        assert_eq!(md.num_columns(), 4);
    }

    #[test]
    fn test_build_metadata_registers_table_name() {
        let registry = IdentRegistry::new();
        let fields = vec![field("a", PhysicalType::INT32, 0)];

        let first = build_metadata(Path::new("/data/trades.gz.parquet"), &fields, &registry);
        let second = build_metadata(Path::new("/backup/trades.gz.parquet"), &fields, &registry);

        assert_eq!(first.table_name, "trades_gz");
        assert_eq!(second.table_name, "trades_gz_1");
        assert_eq!(registry.lookup("trades_gz"), Some(2));
    }

    #[test]
    fn test_column_names_are_kept_verbatim() {
        let registry = IdentRegistry::new();
        let fields = vec![field("unit price ($)", PhysicalType::FLOAT, 0)];

        let md = build_metadata(Path::new("prices.parquet"), &fields, &registry);

        assert_eq!(md.column_ids, vec!["unit price ($)"]);
        assert_eq!(md.column_types, vec![Some(SqlType::Real)]);
    }

    #[test]
    fn test_metadata_serializes_to_json() {
        let registry = IdentRegistry::new();
        let fields = vec![field("price", PhysicalType::DOUBLE, 0)];
        let md = build_metadata(Path::new("prices.parquet"), &fields, &registry);

        let json = serde_json::to_value(&md).unwrap();

        assert_eq!(json["table_name"], "prices");
        assert_eq!(json["column_types"][0], "Real");
        assert_eq!(json["options"], serde_json::json!({}));
    }
}
