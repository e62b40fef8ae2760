//! The merge/override resolver and its single-table dedupe companions.
//!
//! Reconciliation is row-granular: once an override row survives the
//! same-row filter, it replaces every main row sharing its identity
//! fingerprint, with no field-by-field merging.

use std::collections::{BTreeMap, BTreeSet};

use ratebook_model::{CellValue, Fingerprint, PipelineError, Result, Row, Table};

use crate::fingerprint::FingerprintScheme;
use crate::operation::{TableMerge, TableTransform};

/// Merges never proceed on shape-incompatible tables.
fn ensure_same_shape(left: &Table, right: &Table) -> Result<()> {
    let left_set = left.column_set();
    let right_set = right.column_set();
    if left_set == right_set {
        return Ok(());
    }
    Err(PipelineError::ShapeMismatch {
        left_only: left_set
            .difference(&right_set)
            .map(|c| (*c).to_string())
            .collect(),
        right_only: right_set
            .difference(&left_set)
            .map(|c| (*c).to_string())
            .collect(),
    })
}

/// Drop override rows whose combined fingerprint already occurs in the
/// main table: exact-or-near-exact duplicates never re-enter it.
pub fn filter_same_rows(
    main: &Table,
    overrides: &Table,
    scheme: &FingerprintScheme,
) -> Result<Table> {
    let mut present = BTreeSet::new();
    for row in main.rows() {
        present.insert(scheme.combined(row)?);
    }
    let mut out = Table::new(overrides.columns().to_vec())?;
    let mut dropped = 0usize;
    for row in overrides.rows() {
        if present.contains(&scheme.combined(row)?) {
            dropped += 1;
            continue;
        }
        out.push_row(row.clone())?;
    }
    if dropped > 0 {
        tracing::debug!(dropped, "override rows already present in the main table");
    }
    Ok(out)
}

/// Fold an override table into the main table.
///
/// Override rows surviving the same-row filter win unconditionally: every
/// main row sharing their identity fingerprint is removed and the override
/// rows are appended. An identity fingerprint contributed by the override
/// set that still occurs more than once afterwards is a structural error.
pub fn apply_override(
    main: &Table,
    overrides: &Table,
    scheme: &FingerprintScheme,
) -> Result<Table> {
    ensure_same_shape(main, overrides)?;
    let incoming = filter_same_rows(main, overrides, scheme)?;

    let mut override_tags = BTreeSet::new();
    for row in incoming.rows() {
        override_tags.insert(scheme.identity(row)?);
    }
    tracing::debug!(
        count = override_tags.len(),
        "override identities after same-row filtering"
    );

    let mut out = Table::new(main.columns().to_vec())?;
    let mut replaced = 0usize;
    for row in main.rows() {
        if override_tags.contains(&scheme.identity(row)?) {
            replaced += 1;
            continue;
        }
        out.push_row(row.clone())?;
    }
    for row in incoming.rows() {
        out.push_row(row.clone())?;
    }

    let tags: Vec<Fingerprint> = out
        .rows()
        .iter()
        .map(|row| scheme.identity(row))
        .collect::<Result<_>>()?;
    let mut counts: BTreeMap<&Fingerprint, usize> = BTreeMap::new();
    for tag in &tags {
        *counts.entry(tag).or_default() += 1;
    }
    for tag in &override_tags {
        if counts.get(tag).copied().unwrap_or(0) > 1 {
            return Err(PipelineError::DuplicateIdentity {
                fingerprint: tag.to_string(),
            });
        }
    }

    tracing::info!(
        replaced,
        appended = incoming.height(),
        "override reconciliation complete"
    );
    Ok(out)
}

/// Collapse identity-fingerprint duplicates within one table, keeping the
/// row with the largest numeric comparison values. Rows come back in the
/// sorted (descending) order, matching replace-whole-table semantics.
pub fn keep_largest(table: &Table, scheme: &FingerprintScheme) -> Result<Table> {
    let mut decorated: Vec<(Vec<f64>, usize)> = Vec::with_capacity(table.height());
    for (index, row) in table.rows().iter().enumerate() {
        let mut key = Vec::with_capacity(scheme.numeric_columns().len());
        for column in scheme.numeric_columns() {
            key.push(scheme.numeric(row, column)?);
        }
        decorated.push((key, index));
    }
    // Descending lexicographic on the numeric key; the index tiebreak
    // keeps the sort deterministic for fully equal keys.
    decorated.sort_by(|a, b| {
        for (x, y) in a.0.iter().zip(&b.0) {
            let ordering = y.total_cmp(x);
            if ordering.is_ne() {
                return ordering;
            }
        }
        a.1.cmp(&b.1)
    });

    let mut seen = BTreeSet::new();
    let mut out = Table::new(table.columns().to_vec())?;
    for (_, index) in decorated {
        let row = &table.rows()[index];
        if seen.insert(scheme.identity(row)?) {
            out.push_row(row.clone())?;
        }
    }
    let dropped = table.height() - out.height();
    tracing::info!(dropped, "rows dropped during deduplication");
    Ok(out)
}

fn confirmed_flag(row: &Row, column: &str) -> Option<bool> {
    match row.get(column)?.as_number()? {
        n if n == 1.0 => Some(true),
        n if n == 0.0 => Some(false),
        _ => None,
    }
}

/// Drop unconfirmed rows whose identity fingerprint also occurs among
/// confirmed rows. Confirmed rows take precedence regardless of numeric
/// magnitude; every other row keeps its original position.
pub fn replace_unconfirmed(
    table: &Table,
    scheme: &FingerprintScheme,
    confirmed_column: &str,
) -> Result<Table> {
    if !table.has_column(confirmed_column) {
        return Err(PipelineError::MissingColumn {
            column: confirmed_column.to_string(),
        });
    }
    let mut confirmed_tags = BTreeSet::new();
    for row in table.rows() {
        if confirmed_flag(row, confirmed_column) == Some(true) {
            confirmed_tags.insert(scheme.identity(row)?);
        }
    }
    let mut out = Table::new(table.columns().to_vec())?;
    let mut dropped = 0usize;
    for row in table.rows() {
        if confirmed_flag(row, confirmed_column) == Some(false)
            && confirmed_tags.contains(&scheme.identity(row)?)
        {
            dropped += 1;
            continue;
        }
        out.push_row(row.clone())?;
    }
    tracing::info!(dropped, "unconfirmed rows superseded by confirmed rows");
    Ok(out)
}

/// Full-column value tuple, used for exact-duplicate detection in the
/// additive merge. Column order follows `columns` so both tables key
/// identically regardless of their own column ordering.
fn full_tuple_key(row: &Row, columns: &[String]) -> String {
    let mut key = String::new();
    for column in columns {
        let value = row.get(column).unwrap_or(&CellValue::Missing);
        key.push_str(&value.key_string());
        key.push('\u{1f}');
    }
    key
}

fn dedupe_exact(table: &Table) -> Result<Table> {
    let mut seen = BTreeSet::new();
    let mut out = Table::new(table.columns().to_vec())?;
    for row in table.rows() {
        if seen.insert(full_tuple_key(row, table.columns())) {
            out.push_row(row.clone())?;
        }
    }
    Ok(out)
}

/// Append rows from `additions` that do not already exist in `main` as an
/// identical full-column value tuple. Both inputs are internally
/// deduplicated first.
pub fn add_new_rows(main: &Table, additions: &Table) -> Result<Table> {
    ensure_same_shape(main, additions)?;
    let mut out = dedupe_exact(main)?;
    let additions = dedupe_exact(additions)?;

    let mut present: BTreeSet<String> = out
        .rows()
        .iter()
        .map(|row| full_tuple_key(row, out.columns()))
        .collect();
    let mut appended = 0usize;
    let mut skipped = 0usize;
    for row in additions.rows() {
        let key = full_tuple_key(row, out.columns());
        if present.insert(key) {
            out.push_row(row.clone())?;
            appended += 1;
        } else {
            skipped += 1;
        }
    }
    tracing::info!(appended, skipped, "additive merge complete");
    Ok(out)
}

/// Two-table override merge operation.
pub struct OverrideRows {
    scheme: FingerprintScheme,
}

impl OverrideRows {
    pub fn new(scheme: FingerprintScheme) -> Self {
        Self { scheme }
    }
}

impl TableMerge for OverrideRows {
    fn name(&self) -> &str {
        "override_rows"
    }

    fn apply(&self, main: &Table, other: &Table) -> Result<Table> {
        apply_override(main, other, &self.scheme)
    }
}

/// Two-table additive merge operation.
pub struct AppendNewRows;

impl TableMerge for AppendNewRows {
    fn name(&self) -> &str {
        "append_new_rows"
    }

    fn apply(&self, main: &Table, other: &Table) -> Result<Table> {
        add_new_rows(main, other)
    }
}

/// Single-table keep-largest dedupe, usable anywhere in a pipeline.
pub struct KeepLargestDuplicates {
    scheme: FingerprintScheme,
}

impl KeepLargestDuplicates {
    pub fn new(scheme: FingerprintScheme) -> Self {
        Self { scheme }
    }
}

impl TableTransform for KeepLargestDuplicates {
    fn name(&self) -> &str {
        "keep_largest_duplicates"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        keep_largest(table, &self.scheme)
    }
}

/// Single-table confirmed-wins dedupe.
pub struct ReplaceUnconfirmed {
    scheme: FingerprintScheme,
    confirmed_column: String,
}

impl ReplaceUnconfirmed {
    pub fn new(scheme: FingerprintScheme, confirmed_column: impl Into<String>) -> Self {
        Self {
            scheme,
            confirmed_column: confirmed_column.into(),
        }
    }
}

impl TableTransform for ReplaceUnconfirmed {
    fn name(&self) -> &str {
        "replace_unconfirmed"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        replace_unconfirmed(table, &self.scheme, &self.confirmed_column)
    }
}
