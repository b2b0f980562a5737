//! Row materialization

use super::types::{Row, TypedTable};
use crate::decode::{coerce, XmlElement};
use crate::error::Result;
use crate::schema::ColumnSchema;
use std::collections::HashMap;
use tracing::trace;

/// Builds a [`TypedTable`] from the `<rows>` section of a data block
#[derive(Debug, Clone)]
pub struct TableBuilder {
    schema: Vec<ColumnSchema>,
}

impl TableBuilder {
    /// Create a builder for the given schema
    pub fn new(schema: Vec<ColumnSchema>) -> Self {
        Self { schema }
    }

    /// Get the schema rows are built against
    pub fn schema(&self) -> &[ColumnSchema] {
        &self.schema
    }

    /// Build one row from a `<row>` element
    ///
    /// Cells are looked up by lower-cased attribute name, so attribute order
    /// in the source does not matter. Missing attributes become null cells and
    /// attributes outside the schema are ignored.
    pub fn build_row(&self, element: &XmlElement) -> Row {
        let attributes: HashMap<String, &str> = element
            .attributes
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v.as_str()))
            .collect();

        self.schema
            .iter()
            .map(|column| {
                coerce(
                    attributes.get(&column.name).copied(),
                    column.declared_type,
                )
            })
            .collect::<Vec<_>>()
            .into()
    }

    /// Build the table from a `<data>` block, keeping source row order
    pub fn build(self, block: &XmlElement) -> Result<TypedTable> {
        let rows_section = block.require_child("rows")?;

        let rows: Vec<Row> = rows_section
            .children_named("row")
            .map(|element| self.build_row(element))
            .collect();

        trace!(rows = rows.len(), columns = self.schema.len(), "built rows");
        TypedTable::try_new(self.schema, rows)
    }
}

/// Build a table for a schema from a `<data>` block
pub fn build_table(schema: Vec<ColumnSchema>, block: &XmlElement) -> Result<TypedTable> {
    TableBuilder::new(schema).build(block)
}
