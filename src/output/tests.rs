//! Tests for output module

use super::*;
use crate::decode::Cell;
use crate::pipeline::decode_table;
use crate::schema::{ColumnSchema, TypeTag};
use crate::table::{Row, TypedTable};
use crate::types::{OutputMode, ParquetCompression};
use arrow::array::Array;
use arrow::datatypes::{DataType, TimeUnit};
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::tempdir;
use test_case::test_case;

const MIXED: &str = r#"<document><data id="marketdata">
  <metadata><columns>
    <column name="SECID" type="string"/>
    <column name="LAST" type="double"/>
    <column name="NUMTRADES" type="int64"/>
    <column name="LOTSIZE" type="int32"/>
    <column name="SYSTIME" type="datetime"/>
    <column name="TRADEDATE" type="date"/>
  </columns></metadata>
  <rows>
    <row SECID="SBER" LAST="281.5" NUMTRADES="120345" LOTSIZE="10" SYSTIME="2024-03-01 18:45:00" TRADEDATE="2024-03-01"/>
    <row SECID="GAZP" LAST="" NUMTRADES="" SYSTIME="0000-00-00 00:00:00"/>
  </rows>
</data></document>"#;

fn mixed_table() -> TypedTable {
    decode_table(MIXED, None).unwrap()
}

// ============================================================================
// Record Rendering Tests
// ============================================================================

#[test]
fn test_render_scenario_id_name() {
    let columns = vec![
        ColumnSchema::new("ID", TypeTag::Int64),
        ColumnSchema::new("NAME", TypeTag::String),
    ];
    let rows = vec![
        Row::new(vec![Cell::Int64(1), Cell::Text("Sber".into())]),
        Row::new(vec![Cell::Int64(2), Cell::Text(String::new())]),
    ];
    let table = TypedTable::try_new(columns, rows).unwrap();

    let rendered = render(table, OutputMode::RecordJson).unwrap();
    assert_eq!(
        rendered.as_json(),
        Some(r#"[{"id":1,"name":"Sber"},{"id":2,"name":""}]"#)
    );
}

#[test]
fn test_render_json_types_and_nulls() {
    let json: Value = serde_json::from_str(&render_json(&mixed_table()).unwrap()).unwrap();

    assert_eq!(
        json,
        json!([
            {
                "secid": "SBER",
                "last": 281.5,
                "numtrades": 120_345,
                "lotsize": 10,
                "systime": "2024-03-01T18:45:00",
                "tradedate": "2024-03-01"
            },
            {
                "secid": "GAZP",
                "last": null,
                "numtrades": null,
                "lotsize": null,
                "systime": null,
                "tradedate": null
            }
        ])
    );
}

#[test]
fn test_render_json_key_order_follows_schema() {
    let text = render_json(&mixed_table()).unwrap();
    let first_row = &text[..text.find('}').unwrap()];

    let positions: Vec<usize> = ["secid", "last", "numtrades", "lotsize", "systime", "tradedate"]
        .iter()
        .map(|key| first_row.find(&format!("\"{key}\"")).unwrap())
        .collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
}

#[test]
fn test_render_json_is_stable() {
    let table = mixed_table();
    let text = render_json(&table).unwrap();
    assert_eq!(text, render_json(&table).unwrap());
    assert_eq!(text, render_json(&table.clone()).unwrap());
}

#[test]
fn test_render_empty_table() {
    let table = TypedTable::new(vec![ColumnSchema::new("a", TypeTag::Int64)]);
    assert_eq!(render_json(&table).unwrap(), "[]");
}

#[test]
fn test_render_tabular_returns_table() {
    let table = mixed_table();
    let rendered = render(table.clone(), OutputMode::Tabular).unwrap();

    assert_eq!(rendered.mode(), OutputMode::Tabular);
    assert_eq!(rendered.as_table(), Some(&table));
    assert!(rendered.as_json().is_none());
}

#[test]
fn test_tabular_then_records_round_trip() {
    let table = mixed_table();
    let direct = render(table.clone(), OutputMode::RecordJson).unwrap();

    let tabular = render(table, OutputMode::Tabular).unwrap();
    assert_eq!(tabular.to_json().unwrap(), direct.to_json().unwrap());

    let rerendered = render(tabular.into_table().unwrap(), OutputMode::RecordJson).unwrap();
    assert_eq!(direct, rerendered);
}

#[test]
fn test_to_json_values() {
    let values = mixed_table().to_json_values().unwrap();
    assert_eq!(values.len(), 2);
    assert_eq!(values[0]["secid"], "SBER");
    assert_eq!(values[1]["last"], Value::Null);
}

#[test]
fn test_render_non_finite_doubles_as_null() {
    let table = TypedTable::try_new(
        vec![ColumnSchema::new("LAST", TypeTag::Double)],
        vec![
            Row::new(vec![Cell::Double(f64::NAN)]),
            Row::new(vec![Cell::Double(f64::INFINITY)]),
            Row::new(vec![Cell::Double(1.5)]),
        ],
    )
    .unwrap();

    let rendered = render(table, OutputMode::RecordJson).unwrap();
    assert_eq!(
        rendered.as_json(),
        Some(r#"[{"last":null},{"last":null},{"last":1.5}]"#)
    );
}

// ============================================================================
// Arrow Tests
// ============================================================================

#[test]
fn test_to_arrow_schema_types() {
    let schema = to_arrow_schema(mixed_table().columns());

    let types: Vec<DataType> = schema
        .fields()
        .iter()
        .map(|f| f.data_type().clone())
        .collect();
    assert_eq!(
        types,
        vec![
            DataType::Utf8,
            DataType::Float64,
            DataType::Int64,
            DataType::Int32,
            DataType::Timestamp(TimeUnit::Microsecond, None),
            DataType::Utf8,
        ]
    );
    assert!(schema.fields().iter().all(|f| f.is_nullable()));
}

#[test]
fn test_to_record_batch() {
    let batch = to_record_batch(&mixed_table()).unwrap();

    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.num_columns(), 6);
    assert_eq!(batch.schema().field(0).name(), "secid");
    assert_eq!(batch.column(1).null_count(), 1);
    assert_eq!(batch.column(4).null_count(), 1);
}

#[test]
fn test_record_batch_json_matches_direct_render() {
    let table = mixed_table();
    let direct: Vec<Value> = serde_json::from_str(&render_json(&table).unwrap()).unwrap();

    let batch = to_record_batch(&table).unwrap();
    let via_arrow = arrow_to_json(&batch).unwrap();

    assert_eq!(via_arrow, direct);
}

#[test]
fn test_record_batch_keeps_datetimes_outside_nanosecond_range() {
    let far = |year| {
        NaiveDate::from_ymd_opt(year, 6, 30)
            .unwrap()
            .and_hms_micro_opt(12, 0, 0, 250_000)
            .unwrap()
    };
    let table = TypedTable::try_new(
        vec![ColumnSchema::new("MATDATE", TypeTag::DateTime)],
        vec![
            Row::new(vec![Cell::DateTime(far(1600))]),
            Row::new(vec![Cell::DateTime(far(2300))]),
            Row::new(vec![Cell::Null]),
        ],
    )
    .unwrap();

    let batch = to_record_batch(&table).unwrap();
    assert_eq!(batch.column(0).null_count(), 1);
    assert_eq!(
        arrow_to_json(&batch).unwrap(),
        vec![
            json!({"matdate": "1600-06-30T12:00:00.250"}),
            json!({"matdate": "2300-06-30T12:00:00.250"}),
            json!({"matdate": null}),
        ]
    );
    assert_eq!(
        arrow_to_json(&batch).unwrap(),
        table.to_json_values().unwrap()
    );
}

#[test]
fn test_record_batch_for_zero_column_table() {
    let table = TypedTable::try_new(Vec::new(), vec![Row::new(Vec::new())]).unwrap();
    let batch = to_record_batch(&table).unwrap();

    assert_eq!(batch.num_rows(), 1);
    assert_eq!(batch.num_columns(), 0);
}

// ============================================================================
// Parquet Tests
// ============================================================================

fn read_parquet(path: &std::path::Path) -> Vec<arrow::record_batch::RecordBatch> {
    let file = std::fs::File::open(path).unwrap();
    ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap()
        .map(Result::unwrap)
        .collect()
}

#[test]
fn test_write_table_to_parquet() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("marketdata.parquet");
    let table = mixed_table();

    let rows = write_table_to_parquet(&path, &table, ParquetCompression::default()).unwrap();
    assert_eq!(rows, 2);

    let batches = read_parquet(&path);
    let total: usize = batches.iter().map(|b| b.num_rows()).sum();
    assert_eq!(total, 2);

    let from_file: Vec<Value> = batches
        .iter()
        .flat_map(|b| arrow_to_json(b).unwrap())
        .collect();
    assert_eq!(from_file, table.to_json_values().unwrap());
}

#[test_case(ParquetCompression::None ; "uncompressed")]
#[test_case(ParquetCompression::Snappy ; "snappy")]
#[test_case(ParquetCompression::Gzip ; "gzip")]
#[test_case(ParquetCompression::Zstd ; "zstd")]
fn test_parquet_compression_is_applied(compression: ParquetCompression) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("compressed.parquet");
    write_table_to_parquet(&path, &mixed_table(), compression).unwrap();

    let file = std::fs::File::open(&path).unwrap();
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
    let codec = builder.metadata().row_group(0).column(0).compression();
    let matches = match compression {
        ParquetCompression::None => codec == Compression::UNCOMPRESSED,
        ParquetCompression::Snappy => codec == Compression::SNAPPY,
        ParquetCompression::Gzip => matches!(codec, Compression::GZIP(_)),
        ParquetCompression::Zstd => matches!(codec, Compression::ZSTD(_)),
    };
    assert!(matches, "{compression:?} written as {codec:?}");
}

#[test]
fn test_write_parquet_into_missing_directory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent").join("out.parquet");

    let err = write_table_to_parquet(&path, &mixed_table(), ParquetCompression::None).unwrap_err();
    assert!(matches!(err, crate::error::Error::Output { .. }));
}
