#![deny(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{PipelineError, Result};
use crate::table::CellValue;

/// Column whitelist plus per-column allowed-value constraints.
///
/// Loaded once from a declarative source and shared read-only (wrap it in
/// an `Arc`) across every dataset that validates against it. Immutable
/// after construction.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Schema {
    columns: Vec<String>,
    allowed_values: BTreeMap<String, Vec<String>>,
}

impl Schema {
    pub fn new(
        columns: Vec<String>,
        allowed_values: BTreeMap<String, Vec<String>>,
    ) -> Result<Self> {
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
            allowed_values,
        })
    }

    /// The ordered column whitelist.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn permits_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    /// Permitted values for a column; `None` means unconstrained.
    pub fn allowed_values(&self, column: &str) -> Option<&[String]> {
        self.allowed_values.get(column).map(Vec::as_slice)
    }

    /// Columns that carry a value constraint, in deterministic order.
    pub fn constrained_columns(&self) -> impl Iterator<Item = &str> {
        self.allowed_values.keys().map(String::as_str)
    }

    /// Whether a non-missing cell satisfies the column's constraint.
    /// Unconstrained columns and missing cells always pass.
    pub fn permits_value(&self, column: &str, value: &CellValue) -> bool {
        if value.is_missing() {
            return true;
        }
        match self.allowed_values.get(column) {
            Some(allowed) => {
                let key = value.key_string();
                allowed.iter().any(|candidate| *candidate == key)
            }
            None => true,
        }
    }
}
