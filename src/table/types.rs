//! Table types

use crate::decode::Cell;
use crate::error::{Error, Result};
use crate::schema::ColumnSchema;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One row of cells, aligned with the owning table's columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    /// Create a row from cells in column order
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Get the cells in column order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Get a cell by column position
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Consume the row, returning its cells
    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }
}

impl From<Vec<Cell>> for Row {
    fn from(cells: Vec<Cell>) -> Self {
        Self::new(cells)
    }
}

/// An ordered, schema-typed table
///
/// Every row holds exactly one cell per column, in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypedTable {
    columns: Vec<ColumnSchema>,
    rows: Vec<Row>,
}

impl TypedTable {
    /// Create a table with no rows
    pub fn new(columns: Vec<ColumnSchema>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create a table, checking that every row matches the column count
    pub fn try_new(columns: Vec<ColumnSchema>, rows: Vec<Row>) -> Result<Self> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(Error::shape(format!(
                "Row {index} has {} cells but the table has {} columns",
                row.len(),
                columns.len()
            )));
        }

        Ok(Self { columns, rows })
    }

    /// Get the columns in schema order
    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    /// Get the column names in schema order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get the rows in source order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find a column position by name (case-insensitive)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.to_lowercase();
        self.columns.iter().position(|c| c.name == name)
    }

    /// Find a column by name (case-insensitive)
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.column_index(name).map(|i| &self.columns[i])
    }

    /// Get a named view of one row
    pub fn row(&self, index: usize) -> Option<RowView<'_>> {
        self.rows.get(index).map(|row| RowView {
            columns: &self.columns,
            row,
        })
    }

    /// Iterate over named row views in source order
    pub fn iter(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(|row| RowView {
            columns: &self.columns,
            row,
        })
    }

    /// Get a cell by row position and column name
    pub fn value(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    /// Iterate over one column's cells in row order
    pub fn column_cells<'a>(&'a self, column: &str) -> Option<impl Iterator<Item = &'a Cell>> {
        let index = self.column_index(column)?;
        Some(self.rows.iter().filter_map(move |row| row.get(index)))
    }

    /// Consume the table, returning columns and rows
    pub fn into_parts(self) -> (Vec<ColumnSchema>, Vec<Row>) {
        (self.columns, self.rows)
    }
}

/// A row paired with its table's column names
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    columns: &'a [ColumnSchema],
    row: &'a Row,
}

impl<'a> RowView<'a> {
    /// Get a cell by column name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&'a Cell> {
        let name = name.to_lowercase();
        let index = self.columns.iter().position(|c| c.name == name)?;
        self.row.get(index)
    }

    /// Iterate over (column name, cell) pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Cell)> {
        self.columns
            .iter()
            .map(|c| c.name.as_str())
            .zip(self.row.cells().iter())
    }
}

/// Serializes as an object whose keys follow schema order
impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, cell) in self.iter() {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}
