//! Minimal in-memory tables for sheet-shaped inputs.
//!
//! Project lists, parametric lists and project data sheets all arrive as
//! loosely typed grids. [`Table`] keeps the column order of the source and
//! hands out typed views through [`Row`].

use std::fmt;

use serde::Serialize;

/// A single loosely typed cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Null,
}

impl Cell {
    /// Parses a raw string: numbers become [`Cell::Number`], blanks become [`Cell::Null`].
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Null;
        }
        match trimmed.parse::<f64>() {
            Ok(n) => Cell::Number(n),
            Err(_) => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
            Cell::Null => Ok(()),
        }
    }
}

/// Column-labelled grid of cells. Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a table from string literals; handy for fixtures.
    pub fn from_rows(columns: &[&str], rows: &[&[&str]]) -> Self {
        let mut table = Self::new(columns.iter().map(|c| (*c).to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|raw| Cell::parse(raw)).collect());
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Appends a row, padding with nulls or truncating to the column count.
    pub fn push_row(&mut self, mut cells: Vec<Cell>) {
        cells.resize(self.columns.len(), Cell::Null);
        self.rows.push(cells);
    }

    /// Adds a column filled with nulls and returns its index. Existing columns are reused.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(Cell::Null);
        }
        self.columns.len() - 1
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    cells: &'a [Cell],
}

impl<'a> Row<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.cells[idx])
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Cell::as_f64)
    }

    /// Cell rendered as text; `None` for missing or null cells.
    pub fn text(&self, column: &str) -> Option<String> {
        match self.get(column)? {
            Cell::Null => None,
            cell => Some(cell.to_string()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Cell)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter())
    }

    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }
}

/// Ordered collection of named sheets.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub name: String,
    sheets: Vec<(String, Table)>,
}

impl Workbook {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sheets: Vec::new(),
        }
    }

    pub fn with_sheet(mut self, name: impl Into<String>, table: Table) -> Self {
        self.insert(name, table);
        self
    }

    /// Inserts or replaces a sheet, keeping first-insertion order.
    pub fn insert(&mut self, name: impl Into<String>, table: Table) {
        let name = name.into();
        match self.sheets.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = table,
            None => self.sheets.push((name, table)),
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&Table> {
        self.sheets.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn into_sheets(self) -> Vec<(String, Table)> {
        self.sheets
    }
}
