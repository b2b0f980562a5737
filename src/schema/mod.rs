//! Column schema module
//!
//! Reads the ordered column list an ISS data block declares in its
//! `<metadata>` section.
//!
//! # Features
//!
//! - **Closed type vocabulary**: `int64`, `int32`, `string`, `datetime`, `double`, `date`
//! - **Name normalization**: column names are lower-cased on extraction
//! - **Order preservation**: columns keep their declared order

mod reader;
mod types;

pub use reader::{read_schema, SchemaReader};
pub use types::{ColumnSchema, TypeTag};
