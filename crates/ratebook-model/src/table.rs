#![deny(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{PipelineError, Result};

/// A single scalar cell: text, a number, or nothing.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Missing,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Short description of the value kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Missing => "missing",
        }
    }

    /// Canonical string form used for fingerprints, dedupe keys, and CSV
    /// output. Integral numbers render without a fractional part so a
    /// `2023` read from one source and a `2023.0` from another key the
    /// same; missing cells render empty.
    pub fn key_string(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Number(value) => {
                if value.is_finite() && value.fract() == 0.0 && value.abs() < 9e15 {
                    format!("{}", *value as i64)
                } else {
                    format!("{value}")
                }
            }
            Self::Missing => String::new(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key_string())
    }
}

/// One record: a mapping from column name to scalar value.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Row {
    pub cells: BTreeMap<String, CellValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.insert(column.into(), value);
    }

    pub fn with(mut self, column: impl Into<String>, value: CellValue) -> Self {
        self.set(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }
}

/// An in-memory table: ordered unique columns and the rows that carry them.
///
/// Every stored row has exactly the table's column set. `push_row` fills
/// absent columns with [`CellValue::Missing`] and rejects cells naming a
/// column the table does not have; schema conformance beyond that is the
/// job of explicit validation operations, never of construction.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(PipelineError::DuplicateColumn {
                    column: column.clone(),
                });
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    pub fn column_set(&self) -> BTreeSet<&str> {
        self.columns.iter().map(String::as_str).collect()
    }

    pub fn push_row(&mut self, mut row: Row) -> Result<()> {
        if let Some(unknown) = row
            .cells
            .keys()
            .find(|column| !self.has_column(column.as_str()))
            .cloned()
        {
            return Err(PipelineError::MissingColumn { column: unknown });
        }
        for column in &self.columns {
            row.cells
                .entry(column.clone())
                .or_insert(CellValue::Missing);
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append a row given positionally, one value per column.
    pub fn push_values(&mut self, values: Vec<CellValue>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(PipelineError::IndexOutOfRange {
                index: values.len(),
                len: self.columns.len(),
            });
        }
        let mut row = Row::new();
        for (column, value) in self.columns.iter().zip(values) {
            row.set(column.clone(), value);
        }
        self.push_row(row)
    }

    /// New table keeping only the named columns, in this table's order.
    /// Columns in `keep` that this table lacks are ignored.
    pub fn select_columns(&self, keep: &[String]) -> Self {
        let columns: Vec<String> = self
            .columns
            .iter()
            .filter(|column| keep.contains(column))
            .cloned()
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let cells = row
                    .cells
                    .iter()
                    .filter(|(column, _)| columns.contains(*column))
                    .map(|(column, value)| (column.clone(), value.clone()))
                    .collect();
                Row { cells }
            })
            .collect();
        Self { columns, rows }
    }
}
