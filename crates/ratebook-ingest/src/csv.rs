//! CSV reading and writing for in-memory tables.
//!
//! The core crates never touch files; everything on disk passes through
//! here. Reading types cells on the way in (empty cells become missing,
//! numeric-looking cells become numbers); writing emits the canonical
//! cell strings.

use std::path::Path;

use csv::ReaderBuilder;

use ratebook_model::{CellValue, Row, Table};

use crate::error::IngestError;

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn parse_cell(raw: &str) -> CellValue {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    if trimmed.is_empty() {
        return CellValue::Missing;
    }
    let numeric_shape = trimmed
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '.')
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    if numeric_shape {
        if let Ok(number) = trimmed.parse::<f64>() {
            if number.is_finite() {
                return CellValue::Number(number);
            }
        }
    }
    CellValue::Text(trimmed.to_string())
}

/// Materialize a CSV file into a [`Table`].
pub fn read_table(path: &Path) -> Result<Table, IngestError> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|error| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|error| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?
        .iter()
        .map(normalize_header)
        .collect();

    let mut table = Table::new(headers.clone())?;
    for record in reader.records() {
        let record = record.map_err(|error| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
        let mut row = Row::new();
        for (index, cell) in record.iter().enumerate() {
            let Some(column) = headers.get(index) else {
                // Ragged trailing cells have no column to land in.
                continue;
            };
            row.set(column.clone(), parse_cell(cell));
        }
        table.push_row(row)?;
    }
    tracing::debug!(
        path = %path.display(),
        columns = table.columns().len(),
        rows = table.height(),
        "loaded table"
    );
    Ok(table)
}

/// Write a [`Table`] as CSV using canonical cell strings.
pub fn write_table(path: &Path, table: &Table) -> Result<(), IngestError> {
    let mut writer = csv::Writer::from_path(path).map_err(|error| IngestError::FileWrite {
        path: path.to_path_buf(),
        source: std::io::Error::other(error.to_string()),
    })?;
    writer
        .write_record(table.columns())
        .map_err(|error| IngestError::FileWrite {
            path: path.to_path_buf(),
            source: std::io::Error::other(error.to_string()),
        })?;
    for row in table.rows() {
        let record: Vec<String> = table
            .columns()
            .iter()
            .map(|column| {
                row.get(column)
                    .map(CellValue::key_string)
                    .unwrap_or_default()
            })
            .collect();
        writer
            .write_record(&record)
            .map_err(|error| IngestError::FileWrite {
                path: path.to_path_buf(),
                source: std::io::Error::other(error.to_string()),
            })?;
    }
    writer.flush().map_err(|source| IngestError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), rows = table.height(), "wrote table");
    Ok(())
}
