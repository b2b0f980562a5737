//! Output module
//!
//! Renders decoded tables for callers.
//!
//! # Overview
//!
//! This module provides:
//! - Rendering a table as itself or as a JSON array of row objects
//! - Converting tables to Arrow RecordBatches and back to JSON
//! - Writing Parquet files

mod batch;
mod render;
mod writer;

pub use batch::{arrow_to_json, to_arrow_schema, to_record_batch};
pub use render::{render, render_json, Rendered};
pub use writer::write_table_to_parquet;

#[cfg(test)]
mod tests;
