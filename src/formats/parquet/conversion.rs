//! Conversion from Arrow RecordBatch to row-based Records.
//!
//! Arrow's columnar batches are transposed into rows of [`Value`]s that bind
//! directly to SQLite parameters. Values keep their physical representation:
//! integers (including dates, times and timestamps) become `Integer`, floats
//! become `Real`, strings become `Text` and raw bytes become `Blob`. Dictionary
//! and view arrays are decoded to their value type first. Nulls are
//! `Value::Null`. Decimals are rendered as text so no precision is lost.

use anyhow::{Context, Result};
use arrow::array::*;
use arrow::compute::cast;
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Decimal128Type, Decimal256Type, Float32Type, Float64Type,
    Int8Type, Int16Type, Int32Type, Int64Type, Time32MillisecondType, Time32SecondType,
    Time64MicrosecondType, Time64NanosecondType, TimeUnit, TimestampMicrosecondType,
    TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType, UInt8Type, UInt16Type,
    UInt32Type, UInt64Type,
};
use arrow::record_batch::RecordBatch;

use crate::formats::record::{Record, Value};

/// Convert an Arrow RecordBatch to a vector of Records
pub fn record_batch_to_records(batch: &RecordBatch) -> Result<Vec<Record>> {
    let num_rows = batch.num_rows();
    let num_columns = batch.num_columns();

    if num_rows == 0 {
        return Ok(Vec::new());
    }

    let mut columns: Vec<std::vec::IntoIter<Value>> = Vec::with_capacity(num_columns);
    for col_idx in 0..num_columns {
        let array = batch.column(col_idx);
        let values = array_to_values(array).with_context(|| {
            format!(
                "Failed to convert column {} ({:?}) to row values",
                col_idx,
                array.data_type()
            )
        })?;
        columns.push(values.into_iter());
    }

    // Transpose to rows
    let mut records = Vec::with_capacity(num_rows);
    for _ in 0..num_rows {
        let fields = columns
            .iter_mut()
            .map(|col| col.next().unwrap_or(Value::Null))
            .collect();
        records.push(Record { fields });
    }

    Ok(records)
}

/// Convert an Arrow array to a vector of bindable values
fn array_to_values(array: &dyn Array) -> Result<Vec<Value>> {
    let mut values = Vec::with_capacity(array.len());

    match array.data_type() {
        DataType::Null => values.resize(array.len(), Value::Null),
        DataType::Boolean => {
            let arr = as_boolean_array(array);
            for i in 0..arr.len() {
                values.push(if arr.is_null(i) {
                    Value::Null
                } else {
                    Value::Integer(i64::from(arr.value(i)))
                });
            }
        }
        DataType::Int8 => convert_integer::<Int8Type>(array, &mut values),
        DataType::Int16 => convert_integer::<Int16Type>(array, &mut values),
        DataType::Int32 => convert_integer::<Int32Type>(array, &mut values),
        DataType::Int64 => convert_integer::<Int64Type>(array, &mut values),
        DataType::UInt8 => convert_integer::<UInt8Type>(array, &mut values),
        DataType::UInt16 => convert_integer::<UInt16Type>(array, &mut values),
        DataType::UInt32 => convert_integer::<UInt32Type>(array, &mut values),
        DataType::UInt64 => {
            let arr = as_primitive_array::<UInt64Type>(array);
            for i in 0..arr.len() {
                values.push(if arr.is_null(i) {
                    Value::Null
                } else {
                    let value = arr.value(i);
                    let value = i64::try_from(value)
                        .with_context(|| format!("UInt64 value {} exceeds INTEGER range", value))?;
                    Value::Integer(value)
                });
            }
        }
        DataType::Float32 => convert_float::<Float32Type>(array, &mut values),
        DataType::Float64 => convert_float::<Float64Type>(array, &mut values),
        DataType::Utf8 => {
            let arr = as_string_array(array);
            for i in 0..arr.len() {
                values.push(if arr.is_null(i) {
                    Value::Null
                } else {
                    Value::Text(arr.value(i).to_string())
                });
            }
        }
        DataType::LargeUtf8 => {
            let arr = as_largestring_array(array);
            for i in 0..arr.len() {
                values.push(if arr.is_null(i) {
                    Value::Null
                } else {
                    Value::Text(arr.value(i).to_string())
                });
            }
        }
        DataType::Binary => {
            let arr = as_generic_binary_array::<i32>(array);
            for i in 0..arr.len() {
                values.push(if arr.is_null(i) {
                    Value::Null
                } else {
                    Value::Blob(arr.value(i).to_vec())
                });
            }
        }
        DataType::LargeBinary => {
            let arr = as_generic_binary_array::<i64>(array);
            for i in 0..arr.len() {
                values.push(if arr.is_null(i) {
                    Value::Null
                } else {
                    Value::Blob(arr.value(i).to_vec())
                });
            }
        }
        DataType::FixedSizeBinary(_) => {
            let arr = array
                .as_any()
                .downcast_ref::<FixedSizeBinaryArray>()
                .context("Expected FixedSizeBinaryArray")?;
            for i in 0..arr.len() {
                values.push(if arr.is_null(i) {
                    Value::Null
                } else {
                    Value::Blob(arr.value(i).to_vec())
                });
            }
        }
        // Temporal values keep their stored integer form (days, millis, ...)
        DataType::Date32 => convert_integer::<Date32Type>(array, &mut values),
        DataType::Date64 => convert_integer::<Date64Type>(array, &mut values),
        DataType::Time32(TimeUnit::Second) => {
            convert_integer::<Time32SecondType>(array, &mut values)
        }
        DataType::Time32(TimeUnit::Millisecond) => {
            convert_integer::<Time32MillisecondType>(array, &mut values)
        }
        DataType::Time64(TimeUnit::Microsecond) => {
            convert_integer::<Time64MicrosecondType>(array, &mut values)
        }
        DataType::Time64(TimeUnit::Nanosecond) => {
            convert_integer::<Time64NanosecondType>(array, &mut values)
        }
        DataType::Timestamp(unit, _) => match unit {
            TimeUnit::Second => convert_integer::<TimestampSecondType>(array, &mut values),
            TimeUnit::Millisecond => {
                convert_integer::<TimestampMillisecondType>(array, &mut values)
            }
            TimeUnit::Microsecond => {
                convert_integer::<TimestampMicrosecondType>(array, &mut values)
            }
            TimeUnit::Nanosecond => convert_integer::<TimestampNanosecondType>(array, &mut values),
        },
        DataType::Decimal128(_, _) => {
            let arr = as_primitive_array::<Decimal128Type>(array);
            for i in 0..arr.len() {
                values.push(if arr.is_null(i) {
                    Value::Null
                } else {
                    Value::Text(arr.value_as_string(i))
                });
            }
        }
        DataType::Decimal256(_, _) => {
            let arr = as_primitive_array::<Decimal256Type>(array);
            for i in 0..arr.len() {
                values.push(if arr.is_null(i) {
                    Value::Null
                } else {
                    Value::Text(arr.value_as_string(i))
                });
            }
        }
        // Dictionary-encoded and view columns decode to their plain form
        DataType::Dictionary(_, value_type) => {
            let decoded = cast(array, value_type).context("Failed to decode dictionary array")?;
            return array_to_values(decoded.as_ref());
        }
        DataType::Utf8View => {
            let decoded = cast(array, &DataType::Utf8).context("Failed to decode string view")?;
            return array_to_values(decoded.as_ref());
        }
        DataType::BinaryView => {
            let decoded = cast(array, &DataType::Binary).context("Failed to decode binary view")?;
            return array_to_values(decoded.as_ref());
        }
        _ => {
            return Err(anyhow::anyhow!(
                "Unsupported array type for conversion: {:?}",
                array.data_type()
            ));
        }
    }

    Ok(values)
}

/// Helper to convert integer-backed primitive arrays
fn convert_integer<T: ArrowPrimitiveType>(array: &dyn Array, values: &mut Vec<Value>)
where
    T::Native: Into<i64>,
{
    let arr = as_primitive_array::<T>(array);
    for i in 0..arr.len() {
        values.push(if arr.is_null(i) {
            Value::Null
        } else {
            Value::Integer(arr.value(i).into())
        });
    }
}

/// Helper to convert floating point arrays
fn convert_float<T: ArrowPrimitiveType>(array: &dyn Array, values: &mut Vec<Value>)
where
    T::Native: Into<f64>,
{
    let arr = as_primitive_array::<T>(array);
    for i in 0..arr.len() {
        values.push(if arr.is_null(i) {
            Value::Null
        } else {
            Value::Real(arr.value(i).into())
        });
    }
}
