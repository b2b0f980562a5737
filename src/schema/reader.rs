//! Schema extraction from ISS metadata

use super::types::{ColumnSchema, TypeTag};
use crate::decode::{XmlDocument, XmlElement};
use crate::error::{Error, Result};
use std::collections::HashSet;
use tracing::trace;

/// Reads the column schema of one data block
#[derive(Debug, Clone, Default)]
pub struct SchemaReader {
    /// Data block id; the first block is used when unset
    block: Option<String>,
}

impl SchemaReader {
    /// Create a reader for the first data block
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reader for the data block with the given id
    pub fn for_block(id: impl Into<String>) -> Self {
        Self {
            block: Some(id.into()),
        }
    }

    /// Read the schema of the selected block
    pub fn read(&self, document: &XmlDocument) -> Result<Vec<ColumnSchema>> {
        let block = document.block(self.block.as_deref())?;
        read_schema(block)
    }
}

/// Read the ordered column schema from a `<data>` block
///
/// Walks `metadata > columns > column`. Each column needs a `name` and a
/// `type` attribute; the type must belong to the supported vocabulary.
pub fn read_schema(block: &XmlElement) -> Result<Vec<ColumnSchema>> {
    let columns = block.require_child("metadata")?.require_child("columns")?;

    let mut schema = Vec::new();
    let mut seen = HashSet::new();

    for column in columns.children_named("column") {
        let name = column
            .attr("name")
            .ok_or_else(|| Error::malformed("<column> without a 'name' attribute"))?;
        let token = column.attr("type").ok_or_else(|| {
            Error::malformed(format!("Column '{name}' has no 'type' attribute"))
        })?;
        let declared_type =
            TypeTag::from_token(token).ok_or_else(|| Error::unknown_type(name, token))?;

        let column = ColumnSchema::new(name, declared_type);
        if !seen.insert(column.name.clone()) {
            return Err(Error::malformed(format!(
                "Duplicate column '{}'",
                column.name
            )));
        }

        trace!(column = %column.name, declared_type = %column.declared_type, "schema column");
        schema.push(column);
    }

    Ok(schema)
}
