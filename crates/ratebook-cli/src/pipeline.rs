//! Pipeline construction: the collection-sheet split and the standard
//! operation registrations for a rate-book merge run.

use std::sync::Arc;

use ratebook_core::{
    AppendNewRows, CheckAllowedValues, CollapsePunctuationSpacing, Dataset, DatasetId,
    DropUnknownColumns, ExecutionManager, FingerprintScheme, HyphenateSeparators,
    KeepLargestDuplicates, NormalizeNumericValues, Operation, OverrideRows, Processor,
    ReplaceUnconfirmed, ReplaceValue, RunReport, TrimWhitespace, UppercaseStrings,
};
use ratebook_model::{CellValue, Result, Row, Schema, Table};

/// Marker column splitting a collection sheet into overrides and additions.
pub const OVERRIDE_COLUMN: &str = "OVERRIDE";

/// Confirmation flag column used by the confirmed-wins pass.
pub const CONFIRMED_COLUMN: &str = "CONFIRMED";

fn is_truthy(value: &CellValue) -> bool {
    match value {
        CellValue::Number(number) => *number != 0.0,
        CellValue::Text(text) => text.eq_ignore_ascii_case("true") || text == "1",
        CellValue::Missing => false,
    }
}

/// Split a collection sheet on its OVERRIDE marker into (overrides,
/// additions), dropping the marker column from both. A sheet without the
/// marker is all additions.
pub fn split_collection(collection: &Table) -> Result<(Table, Table)> {
    let keep: Vec<String> = collection
        .columns()
        .iter()
        .filter(|column| *column != OVERRIDE_COLUMN)
        .cloned()
        .collect();
    if !collection.has_column(OVERRIDE_COLUMN) {
        let overrides = Table::new(keep)?;
        return Ok((overrides, collection.clone()));
    }

    let mut overrides = Table::new(keep.clone())?;
    let mut additions = Table::new(keep)?;
    for row in collection.rows() {
        let marked = row.get(OVERRIDE_COLUMN).is_some_and(is_truthy);
        let mut stripped = Row::new();
        for (column, value) in &row.cells {
            if column != OVERRIDE_COLUMN {
                stripped.set(column.clone(), value.clone());
            }
        }
        if marked {
            overrides.push_row(stripped)?;
        } else {
            additions.push_row(stripped)?;
        }
    }
    tracing::info!(
        overrides = overrides.height(),
        additions = additions.height(),
        "split collection sheet"
    );
    Ok((overrides, additions))
}

/// Register the standard rate-book pipeline and return the manager plus
/// the handle of the main dataset.
///
/// Orders are spaced by ten so a caller can interleave custom operations
/// between the standard ones.
pub fn build_manager(
    main: Table,
    overrides: Table,
    additions: Table,
    schema: &Arc<Schema>,
) -> Result<(ExecutionManager, DatasetId)> {
    let scheme = FingerprintScheme::default();
    let mut manager = ExecutionManager::new();
    let main_id = manager.add_dataset(Dataset::with_schema(main, Arc::clone(schema)));
    let override_id = manager.add_dataset(Dataset::with_schema(overrides, Arc::clone(schema)));
    let addition_id = manager.add_dataset(Dataset::with_schema(additions, Arc::clone(schema)));
    let all = [main_id, override_id, addition_id];

    manager.add_operation(
        10,
        Processor::cleaning(),
        Operation::transform(UppercaseStrings),
        &all,
    )?;
    manager.add_operation(
        20,
        Processor::cleaning(),
        Operation::transform(CollapsePunctuationSpacing),
        &all,
    )?;
    manager.add_operation(
        30,
        Processor::cleaning(),
        Operation::transform(HyphenateSeparators),
        &all,
    )?;
    manager.add_operation(
        40,
        Processor::cleaning(),
        Operation::transform(TrimWhitespace),
        &all,
    )?;
    manager.add_operation(
        50,
        Processor::cleaning(),
        Operation::transform(NormalizeNumericValues),
        &all,
    )?;
    manager.add_operation(
        60,
        Processor::cleaning(),
        Operation::transform(ReplaceValue::new("LEVEL", "3-JOURNEYMAN", "3-JOURNEY")),
        &all,
    )?;
    manager.add_operation(
        70,
        Processor::validation(),
        Operation::check(DropUnknownColumns),
        &all,
    )?;
    manager.add_operation(
        80,
        Processor::validation(),
        Operation::check(CheckAllowedValues),
        &all,
    )?;
    manager.add_operation(
        90,
        Processor::cleaning(),
        Operation::transform(KeepLargestDuplicates::new(scheme.clone())),
        &all,
    )?;
    manager.add_operation(
        100,
        Processor::merge(),
        Operation::merge(OverrideRows::new(scheme.clone())),
        &[main_id, override_id],
    )?;
    manager.add_operation(
        110,
        Processor::merge(),
        Operation::merge(AppendNewRows),
        &[main_id, addition_id],
    )?;
    manager.add_operation(
        120,
        Processor::cleaning(),
        Operation::transform(ReplaceUnconfirmed::new(scheme.clone(), CONFIRMED_COLUMN)),
        &[main_id],
    )?;
    manager.add_operation(
        130,
        Processor::cleaning(),
        Operation::transform(KeepLargestDuplicates::new(scheme)),
        &[main_id],
    )?;

    Ok((manager, main_id))
}

/// Build, execute, and return the final main table with the run report.
pub fn run_pipeline(
    main: Table,
    overrides: Table,
    additions: Table,
    schema: &Arc<Schema>,
) -> Result<(Table, RunReport)> {
    let (mut manager, main_id) = build_manager(main, overrides, additions, schema)?;
    let report = manager.execute()?;
    let table = manager.into_dataset(main_id)?.into_table();
    Ok((table, report))
}
