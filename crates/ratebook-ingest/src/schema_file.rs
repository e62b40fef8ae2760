//! YAML schema-file loading.
//!
//! A schema document has a `COLUMNS` section — an ordered mapping of
//! column name to a placeholder type tag — defining the whitelist, plus
//! optional top-level sequences listing the permitted values for a
//! column:
//!
//! ```yaml
//! COLUMNS:
//!   STATE: str
//!   CITY: str
//! LEVEL:
//!   - 1-APPRENTICE
//!   - 3-JOURNEY
//! ```
//!
//! The document is loaded once into an immutable [`Schema`].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_yaml::Value;

use ratebook_model::Schema;

use crate::error::IngestError;

const COLUMNS_SECTION: &str = "COLUMNS";

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Load a schema document from disk.
pub fn load_schema(path: &Path) -> Result<Schema, IngestError> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let document: Value = serde_yaml::from_str(&text).map_err(|source| IngestError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    let Some(mapping) = document.as_mapping() else {
        return Err(IngestError::InvalidSection {
            path: path.to_path_buf(),
            section: "document root".to_string(),
            message: "expected a mapping".to_string(),
        });
    };

    let columns_value =
        document
            .get(COLUMNS_SECTION)
            .ok_or_else(|| IngestError::MissingColumnsSection {
                path: path.to_path_buf(),
            })?;
    let Some(columns_mapping) = columns_value.as_mapping() else {
        return Err(IngestError::InvalidSection {
            path: path.to_path_buf(),
            section: COLUMNS_SECTION.to_string(),
            message: "expected a mapping of column names".to_string(),
        });
    };
    let mut columns = Vec::with_capacity(columns_mapping.len());
    for key in columns_mapping.keys() {
        let column = scalar_string(key).ok_or_else(|| IngestError::InvalidSection {
            path: path.to_path_buf(),
            section: COLUMNS_SECTION.to_string(),
            message: format!("column name is not a scalar: {key:?}"),
        })?;
        columns.push(column);
    }

    let mut allowed_values = BTreeMap::new();
    for (key, value) in mapping {
        let Some(section) = scalar_string(key) else {
            continue;
        };
        if section == COLUMNS_SECTION {
            continue;
        }
        let Some(sequence) = value.as_sequence() else {
            // Sections that are not value lists carry no constraints.
            tracing::debug!(section, "skipping non-list schema section");
            continue;
        };
        let mut values = Vec::with_capacity(sequence.len());
        for entry in sequence {
            let value = scalar_string(entry).ok_or_else(|| IngestError::InvalidSection {
                path: path.to_path_buf(),
                section: section.clone(),
                message: format!("allowed value is not a scalar: {entry:?}"),
            })?;
            values.push(value);
        }
        allowed_values.insert(section, values);
    }

    tracing::debug!(
        path = %path.display(),
        columns = columns.len(),
        constrained = allowed_values.len(),
        "loaded schema"
    );
    Ok(Schema::new(columns, allowed_values)?)
}
