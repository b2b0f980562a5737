//! Table rendering

use crate::error::Result;
use crate::table::TypedTable;
use crate::types::OutputMode;
use serde::ser::{Serialize, Serializer};

/// A rendered pipeline result
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    /// The table itself
    Tabular(TypedTable),
    /// JSON array of row objects
    Records(String),
}

impl Rendered {
    /// Get the table, if rendered in tabular mode
    pub fn as_table(&self) -> Option<&TypedTable> {
        match self {
            Rendered::Tabular(table) => Some(table),
            Rendered::Records(_) => None,
        }
    }

    /// Consume into the table, if rendered in tabular mode
    pub fn into_table(self) -> Option<TypedTable> {
        match self {
            Rendered::Tabular(table) => Some(table),
            Rendered::Records(_) => None,
        }
    }

    /// Get the JSON text, if rendered in record mode
    pub fn as_json(&self) -> Option<&str> {
        match self {
            Rendered::Records(json) => Some(json),
            Rendered::Tabular(_) => None,
        }
    }

    /// Output mode this result was rendered with
    pub fn mode(&self) -> OutputMode {
        match self {
            Rendered::Tabular(_) => OutputMode::Tabular,
            Rendered::Records(_) => OutputMode::RecordJson,
        }
    }

    /// JSON text for either variant
    pub fn to_json(&self) -> Result<String> {
        match self {
            Rendered::Tabular(table) => render_json(table),
            Rendered::Records(json) => Ok(json.clone()),
        }
    }
}

/// Render a table in the requested output mode
pub fn render(table: TypedTable, mode: OutputMode) -> Result<Rendered> {
    Ok(match mode {
        OutputMode::Tabular => Rendered::Tabular(table),
        OutputMode::RecordJson => Rendered::Records(render_json(&table)?),
    })
}

/// Render a table as a JSON array of row objects
///
/// Keys follow schema order and rows follow table order, so equal tables
/// always produce identical text.
pub fn render_json(table: &TypedTable) -> Result<String> {
    Ok(serde_json::to_string(&Records(table))?)
}

/// Serializes a table as a sequence of row objects
struct Records<'a>(&'a TypedTable);

impl Serialize for Records<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl TypedTable {
    /// Render this table as a JSON array of row objects
    pub fn to_json_string(&self) -> Result<String> {
        render_json(self)
    }

    /// Convert this table into `serde_json` values, one object per row
    pub fn to_json_values(&self) -> Result<Vec<serde_json::Value>> {
        self.iter()
            .map(|row| serde_json::to_value(row).map_err(Into::into))
            .collect()
    }
}
