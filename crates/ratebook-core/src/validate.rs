//! The built-in validation catalogue.

use ratebook_model::{PipelineError, Result, Schema, Table};

use crate::operation::SchemaCheck;

/// Drop every column the schema whitelist does not name, reporting each
/// dropped column through the diagnostic channel.
pub struct DropUnknownColumns;

impl SchemaCheck for DropUnknownColumns {
    fn name(&self) -> &str {
        "drop_unknown_columns"
    }

    fn apply(&self, table: &Table, schema: &Schema) -> Result<Table> {
        let keep: Vec<String> = table
            .columns()
            .iter()
            .filter(|column| schema.permits_column(column))
            .cloned()
            .collect();
        let dropped: Vec<&String> = table
            .columns()
            .iter()
            .filter(|column| !schema.permits_column(column))
            .collect();
        if dropped.is_empty() {
            tracing::debug!("no columns dropped; all columns are in the schema");
        } else {
            tracing::info!(columns = ?dropped, "dropping columns not present in the schema");
        }
        Ok(table.select_columns(&keep))
    }
}

/// Reject non-missing values outside a column's allowed list. The table is
/// returned unchanged when every constrained column passes.
pub struct CheckAllowedValues;

impl SchemaCheck for CheckAllowedValues {
    fn name(&self) -> &str {
        "check_allowed_values"
    }

    fn apply(&self, table: &Table, schema: &Schema) -> Result<Table> {
        let mut violations = Vec::new();
        for column in schema.constrained_columns() {
            if !table.has_column(column) {
                continue;
            }
            let mut offenders: Vec<String> = Vec::new();
            for row in table.rows() {
                let Some(value) = row.get(column) else {
                    continue;
                };
                if schema.permits_value(column, value) {
                    continue;
                }
                let key = value.key_string();
                if !offenders.contains(&key) {
                    offenders.push(key);
                }
            }
            if !offenders.is_empty() {
                violations.push(format!(
                    "invalid values in column '{column}': {}",
                    offenders.join(", ")
                ));
            }
        }
        if violations.is_empty() {
            Ok(table.clone())
        } else {
            Err(PipelineError::InvalidValue {
                message: violations.join("\n"),
            })
        }
    }
}
