//! Schema mapping between Parquet fields and SQL column types.

use anyhow::{Result, bail};
use parquet::basic::Type as PhysicalType;
use parquet::schema::types::SchemaDescriptor;

use crate::db::SqlType;

/// A top-level column of a Parquet file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub physical_type: PhysicalType,
    pub position: usize,
}

/// Map a Parquet physical type to the destination column type
///
/// Types without a dedicated mapping are stored as text.
pub fn map_type(physical_type: PhysicalType) -> SqlType {
    match physical_type {
        PhysicalType::BYTE_ARRAY => SqlType::Text,
        PhysicalType::DOUBLE | PhysicalType::FLOAT => SqlType::Real,
        PhysicalType::INT32 | PhysicalType::INT64 => SqlType::Integer,
        _ => SqlType::Text,
    }
}

/// Extract the flat list of columns from a Parquet schema
///
/// Only flat records are importable: a schema without columns, or with any
/// group (nested or repeated) column, is rejected.
pub fn field_descriptors(schema: &SchemaDescriptor) -> Result<Vec<FieldDescriptor>> {
    let fields = schema.root_schema().get_fields();
    if fields.is_empty() {
        bail!("Schema '{}' has no columns", schema.name());
    }

    let mut descriptors = Vec::with_capacity(fields.len());
    for (position, field) in fields.iter().enumerate() {
        if !field.is_primitive() {
            bail!(
                "Column '{}' is a nested group; only flat records are supported",
                field.name()
            );
        }

        descriptors.push(FieldDescriptor {
            name: field.name().to_string(),
            physical_type: field.get_physical_type(),
            position,
        });
    }

    Ok(descriptors)
}
