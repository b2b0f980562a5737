//! Entity pivot
//!
//! Single-entity ISS responses (for example `/securities/SBER`) describe the
//! entity as rows of `name`/`value` pairs. The pivot turns them into one wide
//! row keyed by the lower-cased names.

use crate::decode::Cell;
use crate::error::{Error, Result};
use crate::schema::ColumnSchema;
use crate::table::{Row, TypedTable};
use crate::types::TransformMode;
use std::collections::HashMap;
use tracing::trace;

/// Column holding attribute names
pub const NAME_COLUMN: &str = "name";

/// Column holding attribute values
pub const VALUE_COLUMN: &str = "value";

/// Apply a transform mode to a table
pub fn apply_transform(table: TypedTable, mode: TransformMode) -> Result<TypedTable> {
    match mode {
        TransformMode::Default => Ok(table),
        TransformMode::EntityPivot => entity_pivot(&table),
    }
}

/// Pivot name/value rows into a single-row table
///
/// Columns appear in order of first appearance of each name. When a name
/// repeats, the later value wins. Rows with a null name are skipped. Output
/// columns carry the declared type of the `value` column.
pub fn entity_pivot(table: &TypedTable) -> Result<TypedTable> {
    let name_index = required_column(table, NAME_COLUMN)?;
    let value_index = required_column(table, VALUE_COLUMN)?;
    let value_type = table.columns()[value_index].declared_type;

    let mut names: Vec<String> = Vec::new();
    let mut values: Vec<Cell> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in table.rows() {
        let Some(name) = row.get(name_index).and_then(Cell::to_text) else {
            continue;
        };
        let value = row.get(value_index).cloned().unwrap_or(Cell::Null);
        let name = name.to_lowercase();

        match positions.get(&name) {
            Some(&position) => values[position] = value,
            None => {
                positions.insert(name.clone(), names.len());
                names.push(name);
                values.push(value);
            }
        }
    }

    trace!(
        source_rows = table.num_rows(),
        columns = names.len(),
        "pivoted entity"
    );

    let columns = names
        .iter()
        .map(|name| ColumnSchema::new(name, value_type))
        .collect();
    TypedTable::try_new(columns, vec![Row::new(values)])
}

fn required_column(table: &TypedTable, name: &str) -> Result<usize> {
    table.column_index(name).ok_or_else(|| {
        Error::shape(format!(
            "Entity pivot needs a '{name}' column, table has [{}]",
            table.column_names().join(", ")
        ))
    })
}
