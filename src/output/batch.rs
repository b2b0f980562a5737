//! Arrow RecordBatch conversion
//!
//! Converts typed tables to Arrow RecordBatches, and RecordBatches back to
//! JSON records.

use crate::decode::{format_datetime, Cell};
use crate::error::{Error, Result};
use crate::schema::{ColumnSchema, TypeTag};
use crate::table::TypedTable;
use arrow::array::{
    Array, ArrayRef, Float64Array, Int32Array, Int64Array, StringArray,
    TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use serde_json::Value;
use std::sync::Arc;

/// Arrow type for a declared column type
fn arrow_type(tag: TypeTag) -> DataType {
    match tag {
        TypeTag::Int64 => DataType::Int64,
        TypeTag::Int32 => DataType::Int32,
        TypeTag::Double => DataType::Float64,
        TypeTag::String | TypeTag::Date => DataType::Utf8,
        TypeTag::DateTime => DataType::Timestamp(TimeUnit::Microsecond, None),
    }
}

/// Build the Arrow schema for a column list (all fields nullable)
pub fn to_arrow_schema(columns: &[ColumnSchema]) -> Schema {
    let fields: Vec<Field> = columns
        .iter()
        .map(|c| Field::new(&c.name, arrow_type(c.declared_type), true))
        .collect();
    Schema::new(fields)
}

/// Convert a typed table to an Arrow RecordBatch
pub fn to_record_batch(table: &TypedTable) -> Result<RecordBatch> {
    let schema = Arc::new(to_arrow_schema(table.columns()));

    let columns: Vec<ArrayRef> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let cells: Vec<&Cell> = table
                .rows()
                .iter()
                .map(|row| row.get(index).unwrap_or(&Cell::Null))
                .collect();
            build_array(&cells, column.declared_type)
        })
        .collect();

    // Row count is explicit so zero-column tables keep their rows
    let options = RecordBatchOptions::new().with_row_count(Some(table.num_rows()));
    RecordBatch::try_new_with_options(schema, columns, &options).map_err(|e| Error::Output {
        message: format!("Failed to create RecordBatch: {e}"),
    })
}

/// Build an Arrow array from the cells of one column
fn build_array(cells: &[&Cell], tag: TypeTag) -> ArrayRef {
    match tag {
        TypeTag::Int64 => {
            let arr: Int64Array = cells.iter().map(|c| c.as_i64()).collect();
            Arc::new(arr)
        }
        TypeTag::Int32 => {
            let arr: Int32Array = cells
                .iter()
                .map(|c| match c {
                    Cell::Int32(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Arc::new(arr)
        }
        TypeTag::Double => {
            let arr: Float64Array = cells.iter().map(|c| c.as_f64()).collect();
            Arc::new(arr)
        }
        TypeTag::String | TypeTag::Date => {
            let arr: StringArray = cells.iter().map(|c| c.as_str()).collect();
            Arc::new(arr)
        }
        // i64 microseconds span the whole chrono date range
        TypeTag::DateTime => {
            let arr: TimestampMicrosecondArray = cells
                .iter()
                .map(|c| c.as_datetime().map(|dt| dt.and_utc().timestamp_micros()))
                .collect();
            Arc::new(arr)
        }
    }
}

/// Convert an Arrow RecordBatch to JSON records
///
/// Returns a vector of JSON objects, one per row in the batch. Timestamps
/// use the same ISO-8601 text as record rendering.
pub fn arrow_to_json(batch: &RecordBatch) -> Result<Vec<Value>> {
    let schema = batch.schema();
    let num_rows = batch.num_rows();
    let mut records = Vec::with_capacity(num_rows);

    for row_idx in 0..num_rows {
        let mut record = serde_json::Map::new();

        for (col_idx, field) in schema.fields().iter().enumerate() {
            let column = batch.column(col_idx);
            let value = array_value_to_json(column.as_ref(), row_idx)?;
            record.insert(field.name().clone(), value);
        }

        records.push(Value::Object(record));
    }

    Ok(records)
}

/// Convert a single array element to JSON
fn array_value_to_json(array: &dyn Array, row: usize) -> Result<Value> {
    if array.is_null(row) {
        return Ok(Value::Null);
    }

    match array.data_type() {
        DataType::Null => Ok(Value::Null),

        DataType::Int32 => {
            let arr = downcast::<Int32Array>(array, "Int32Array")?;
            Ok(Value::Number(arr.value(row).into()))
        }

        DataType::Int64 => {
            let arr = downcast::<Int64Array>(array, "Int64Array")?;
            Ok(Value::Number(arr.value(row).into()))
        }

        DataType::Float64 => {
            let arr = downcast::<Float64Array>(array, "Float64Array")?;
            Ok(serde_json::Number::from_f64(arr.value(row)).map_or(Value::Null, Value::Number))
        }

        DataType::Utf8 => {
            let arr = downcast::<StringArray>(array, "StringArray")?;
            Ok(Value::String(arr.value(row).to_string()))
        }

        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            let arr = downcast::<TimestampMicrosecondArray>(array, "TimestampMicrosecondArray")?;
            Ok(arr
                .value_as_datetime(row)
                .map_or(Value::Null, |dt| Value::String(format_datetime(&dt))))
        }

        other => Err(Error::output(format!(
            "Unsupported Arrow type for JSON conversion: {other:?}"
        ))),
    }
}

fn downcast<'a, T: 'static>(array: &'a dyn Array, name: &str) -> Result<&'a T> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| Error::Output {
            message: format!("Failed to downcast to {name}"),
        })
}
