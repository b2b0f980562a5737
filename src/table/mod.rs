//! Typed table module
//!
//! Materializes the rows of an ISS data block in schema column order.
//!
//! # Overview
//!
//! A [`TypedTable`] pairs the ordered [`ColumnSchema`](crate::schema::ColumnSchema)
//! list with rows of coerced [`Cell`](crate::decode::Cell)s. Rows are
//! positionally aligned with the columns and keep the order the service sent
//! them in; nothing here re-sorts.

mod builder;
mod types;

pub use builder::{build_table, TableBuilder};
pub use types::{Row, RowView, TypedTable};
