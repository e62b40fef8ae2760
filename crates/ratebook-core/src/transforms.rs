//! The built-in cleaning catalogue.
//!
//! All transforms are pure: they rebuild the table rather than editing it,
//! and text-typed cells are the only ones they touch.

use std::sync::LazyLock;

use regex::Regex;

use ratebook_model::{CellValue, PipelineError, Result, Row, Table};

use crate::operation::TableTransform;

static COMMA_SPACING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*,\s*").expect("comma pattern"));
static COLON_SPACING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*:\s*").expect("colon pattern"));
static HYPHEN_SPACING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*-\s*").expect("hyphen pattern"));
static SEPARATOR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[,;:]\s*").expect("separator pattern"));

fn map_cells<F>(table: &Table, mut map: F) -> Result<Table>
where
    F: FnMut(&str, &CellValue) -> CellValue,
{
    let mut out = Table::new(table.columns().to_vec())?;
    for row in table.rows() {
        let mut mapped = Row::new();
        for (column, value) in &row.cells {
            mapped.set(column.clone(), map(column, value));
        }
        out.push_row(mapped)?;
    }
    Ok(out)
}

fn map_text<F>(table: &Table, mut map: F) -> Result<Table>
where
    F: FnMut(&str) -> String,
{
    map_cells(table, |_, value| match value {
        CellValue::Text(text) => CellValue::Text(map(text)),
        other => other.clone(),
    })
}

/// Uppercase column names and every text cell.
pub struct UppercaseStrings;

impl TableTransform for UppercaseStrings {
    fn name(&self) -> &str {
        "uppercase_strings"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        let columns: Vec<String> = table
            .columns()
            .iter()
            .map(|column| column.to_uppercase())
            .collect();
        let mut out = Table::new(columns)?;
        for row in table.rows() {
            let mut mapped = Row::new();
            for (column, value) in &row.cells {
                let value = match value {
                    CellValue::Text(text) => CellValue::Text(text.to_uppercase()),
                    other => other.clone(),
                };
                mapped.set(column.to_uppercase(), value);
            }
            out.push_row(mapped)?;
        }
        Ok(out)
    }
}

/// Trim leading and trailing whitespace from column names and text cells.
pub struct TrimWhitespace;

impl TableTransform for TrimWhitespace {
    fn name(&self) -> &str {
        "trim_whitespace"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        let columns: Vec<String> = table
            .columns()
            .iter()
            .map(|column| column.trim().to_string())
            .collect();
        let mut out = Table::new(columns)?;
        for row in table.rows() {
            let mut mapped = Row::new();
            for (column, value) in &row.cells {
                let value = match value {
                    CellValue::Text(text) => CellValue::Text(text.trim().to_string()),
                    other => other.clone(),
                };
                mapped.set(column.trim().to_string(), value);
            }
            out.push_row(mapped)?;
        }
        Ok(out)
    }
}

/// Remove spaces around commas, colons, and hyphens inside text cells.
pub struct CollapsePunctuationSpacing;

impl TableTransform for CollapsePunctuationSpacing {
    fn name(&self) -> &str {
        "collapse_punctuation_spacing"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        map_text(table, |text| {
            let text = COMMA_SPACING.replace_all(text, ",");
            let text = COLON_SPACING.replace_all(&text, ":");
            HYPHEN_SPACING.replace_all(&text, "-").into_owned()
        })
    }
}

/// Replace spaced commas, semicolons, and colons with a hyphen.
pub struct HyphenateSeparators;

impl TableTransform for HyphenateSeparators {
    fn name(&self) -> &str {
        "hyphenate_separators"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        map_text(table, |text| {
            SEPARATOR_RUN.replace_all(text, "-").into_owned()
        })
    }
}

/// Convert numeric-looking text cells into numbers, stripping a leading
/// dollar sign. Cells that fail to parse are left untouched.
pub struct NormalizeNumericValues;

impl TableTransform for NormalizeNumericValues {
    fn name(&self) -> &str {
        "normalize_numeric_values"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        map_cells(table, |_, value| match value {
            CellValue::Text(text) => {
                let stripped = text
                    .strip_prefix('$')
                    .map(str::trim)
                    .unwrap_or(text.as_str());
                match parse_plain_number(stripped) {
                    Some(number) => CellValue::Number(number),
                    None => value.clone(),
                }
            }
            other => other.clone(),
        })
    }
}

fn parse_plain_number(text: &str) -> Option<f64> {
    if text.is_empty() || !text.chars().next().is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '.') {
        return None;
    }
    if !text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
    {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Exact text substitution in a single column, e.g. canonicalizing
/// `3-JOURNEYMAN` to `3-JOURNEY` in `LEVEL`.
pub struct ReplaceValue {
    column: String,
    from: String,
    to: String,
}

impl ReplaceValue {
    pub fn new(
        column: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            from: from.into(),
            to: to.into(),
        }
    }
}

impl TableTransform for ReplaceValue {
    fn name(&self) -> &str {
        "replace_value"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        if !table.has_column(&self.column) {
            return Err(PipelineError::MissingColumn {
                column: self.column.clone(),
            });
        }
        let mut replaced = 0usize;
        let out = map_cells(table, |column, value| {
            if column == self.column && value.as_text() == Some(self.from.as_str()) {
                replaced += 1;
                CellValue::text(self.to.clone())
            } else {
                value.clone()
            }
        })?;
        if replaced > 0 {
            tracing::debug!(
                column = %self.column,
                from = %self.from,
                to = %self.to,
                replaced,
                "replaced cell values"
            );
        }
        Ok(out)
    }
}
