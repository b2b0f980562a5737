//! Parquet file output

use super::batch::to_record_batch;
use crate::error::{Error, Result};
use crate::table::TypedTable;
use crate::types::ParquetCompression;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use tracing::debug;

fn codec(compression: ParquetCompression) -> Compression {
    match compression {
        ParquetCompression::None => Compression::UNCOMPRESSED,
        ParquetCompression::Snappy => Compression::SNAPPY,
        ParquetCompression::Gzip => Compression::GZIP(GzipLevel::default()),
        ParquetCompression::Zstd => Compression::ZSTD(ZstdLevel::default()),
    }
}

/// Write a typed table to a Parquet file
///
/// Returns the number of rows written. An existing file is replaced.
pub fn write_table_to_parquet(
    path: impl AsRef<Path>,
    table: &TypedTable,
    compression: ParquetCompression,
) -> Result<usize> {
    let path = path.as_ref();
    let batch = to_record_batch(table)?;

    let file = File::create(path)
        .map_err(|e| Error::output(format!("Failed to create {}: {e}", path.display())))?;
    let props = WriterProperties::builder()
        .set_compression(codec(compression))
        .build();

    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    let rows = batch.num_rows();
    debug!(path = %path.display(), rows, ?compression, "wrote parquet file");
    Ok(rows)
}
