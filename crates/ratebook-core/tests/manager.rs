//! Tests for ordered execution, failure containment, and registration
//! checks on the execution manager.

use std::collections::BTreeMap;
use std::sync::Arc;

use ratebook_core::{
    CheckAllowedValues, Dataset, ExecutionManager, FailureCategory, FingerprintScheme, Operation,
    OperationCategory, OverrideRows, Processor, TableTransform,
};
use ratebook_model::{CellValue, PipelineError, Result, Row, Schema, Table};

fn log_table() -> Table {
    let mut table = Table::new(vec!["LOG".into()]).expect("table");
    table
        .push_values(vec![CellValue::text("")])
        .expect("row");
    table
}

fn log_value(dataset: &Dataset) -> String {
    dataset.table().rows()[0]
        .get("LOG")
        .and_then(|v| v.as_text())
        .unwrap_or_default()
        .to_string()
}

/// Appends its tag to the LOG cell, recording execution order.
struct AppendTag(&'static str);

impl TableTransform for AppendTag {
    fn name(&self) -> &str {
        "append_tag"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        let mut out = Table::new(table.columns().to_vec())?;
        for row in table.rows() {
            let mut log = row
                .get("LOG")
                .and_then(|v| v.as_text())
                .unwrap_or_default()
                .to_string();
            log.push_str(self.0);
            out.push_row(Row::new().with("LOG", CellValue::text(log)))?;
        }
        Ok(out)
    }
}

/// Always fails with a containable error.
struct Explode;

impl TableTransform for Explode {
    fn name(&self) -> &str {
        "explode"
    }

    fn apply(&self, _table: &Table) -> Result<Table> {
        Err(PipelineError::MissingColumn {
            column: "NOPE".into(),
        })
    }
}

/// A transform mislabeled with the merge category.
struct Mislabeled;

impl TableTransform for Mislabeled {
    fn name(&self) -> &str {
        "mislabeled"
    }

    fn category(&self) -> OperationCategory {
        OperationCategory::Merge
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        Ok(table.clone())
    }
}

/// A transform that shadows a built-in name.
struct Shadow;

impl TableTransform for Shadow {
    fn name(&self) -> &str {
        "override_rows"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        Ok(table.clone())
    }
}

#[test]
fn executes_in_ascending_order_regardless_of_registration() {
    let mut manager = ExecutionManager::new();
    let id = manager.add_dataset(Dataset::new(log_table()));
    manager
        .add_operation(3, Processor::cleaning(), Operation::transform(AppendTag("c")), &[id])
        .expect("register");
    manager
        .add_operation(1, Processor::cleaning(), Operation::transform(AppendTag("a")), &[id])
        .expect("register");
    manager
        .add_operation(2, Processor::cleaning(), Operation::transform(AppendTag("b")), &[id])
        .expect("register");

    let report = manager.execute().expect("run");
    assert_eq!(report.executed, 3);
    assert!(!report.has_failures());
    assert_eq!(log_value(manager.dataset(id).expect("dataset")), "abc");
}

#[test]
fn contained_failure_leaves_dataset_unchanged_and_run_continues() {
    let mut manager = ExecutionManager::new();
    let id = manager.add_dataset(Dataset::new(log_table()));
    manager
        .add_operation(1, Processor::cleaning(), Operation::transform(AppendTag("a")), &[id])
        .expect("register");
    manager
        .add_operation(2, Processor::cleaning(), Operation::transform(Explode), &[id])
        .expect("register");
    manager
        .add_operation(3, Processor::cleaning(), Operation::transform(AppendTag("b")), &[id])
        .expect("register");

    let report = manager.execute().expect("run");
    assert_eq!(report.executed, 3);
    assert_eq!(report.diagnostics.len(), 1);
    let diagnostic = &report.diagnostics[0];
    assert_eq!(diagnostic.order, 2);
    assert_eq!(diagnostic.processor, "cleaning");
    assert_eq!(diagnostic.category, FailureCategory::MissingColumn);
    // The failing step contributed nothing; the run carried on.
    assert_eq!(log_value(manager.dataset(id).expect("dataset")), "ab");
}

#[test]
fn duplicate_orders_are_rejected_at_registration() {
    let mut manager = ExecutionManager::new();
    let id = manager.add_dataset(Dataset::new(log_table()));
    manager
        .add_operation(5, Processor::cleaning(), Operation::transform(AppendTag("a")), &[id])
        .expect("register");
    let err = manager
        .add_operation(5, Processor::cleaning(), Operation::transform(AppendTag("b")), &[id])
        .unwrap_err();
    assert!(matches!(err, PipelineError::DuplicateOrder { order: 5 }));
}

#[test]
fn category_mismatch_is_rejected_at_registration() {
    let mut manager = ExecutionManager::new();
    let id = manager.add_dataset(Dataset::new(log_table()));
    let err = manager
        .add_operation(1, Processor::cleaning(), Operation::check(CheckAllowedValues), &[id])
        .unwrap_err();
    assert!(matches!(err, PipelineError::CategoryMismatch { .. }));

    let err = manager
        .add_operation(1, Processor::merge(), Operation::transform(AppendTag("a")), &[id])
        .unwrap_err();
    assert!(matches!(err, PipelineError::CategoryMismatch { .. }));
}

#[test]
fn custom_registration_skips_the_category_check() {
    let mut manager = ExecutionManager::new();
    let id = manager.add_dataset(Dataset::new(log_table()));
    // The direct path refuses the mislabeled operation...
    let err = manager
        .add_operation(1, Processor::cleaning(), Operation::transform(Mislabeled), &[id])
        .unwrap_err();
    assert!(matches!(err, PipelineError::CategoryMismatch { .. }));
    // ...but the trusted path accepts and runs it.
    manager
        .add_custom_operation(1, Processor::cleaning(), Operation::transform(Mislabeled), &[id])
        .expect("custom register");
    let report = manager.execute().expect("run");
    assert_eq!(report.executed, 1);
}

#[test]
fn custom_registration_rejects_reserved_names() {
    let mut manager = ExecutionManager::new();
    let id = manager.add_dataset(Dataset::new(log_table()));
    let err = manager
        .add_custom_operation(1, Processor::cleaning(), Operation::transform(Shadow), &[id])
        .unwrap_err();
    assert!(matches!(err, PipelineError::ReservedOperation { name } if name == "override_rows"));
}

#[test]
fn validation_without_schema_halts_without_mutation() {
    let mut manager = ExecutionManager::new();
    let id = manager.add_dataset(Dataset::new(log_table()));
    manager
        .add_operation(1, Processor::validation(), Operation::check(CheckAllowedValues), &[id])
        .expect("register");
    manager
        .add_operation(2, Processor::cleaning(), Operation::transform(AppendTag("x")), &[id])
        .expect("register");

    let err = manager.execute().unwrap_err();
    match err {
        PipelineError::Halted {
            order,
            processor,
            operation,
            source,
        } => {
            assert_eq!(order, 1);
            assert_eq!(processor, "validation");
            assert_eq!(operation, "check_allowed_values");
            assert!(matches!(*source, PipelineError::SchemaNotProvided));
        }
        other => panic!("unexpected error: {other}"),
    }
    // Nothing ran, nothing changed.
    assert_eq!(log_value(manager.dataset(id).expect("dataset")), "");
}

#[test]
fn validation_with_schema_runs() {
    let schema = Arc::new(
        Schema::new(vec!["LOG".into()], BTreeMap::new()).expect("schema"),
    );
    let mut manager = ExecutionManager::new();
    let id = manager.add_dataset(Dataset::with_schema(log_table(), schema));
    manager
        .add_operation(1, Processor::validation(), Operation::check(CheckAllowedValues), &[id])
        .expect("register");
    let report = manager.execute().expect("run");
    assert_eq!(report.executed, 1);
    assert!(!report.has_failures());
}

#[test]
fn merge_requires_at_least_two_datasets() {
    let scheme = FingerprintScheme::new(vec!["LOG".into()], vec![]);
    let mut manager = ExecutionManager::new();
    let id = manager.add_dataset(Dataset::new(log_table()));
    manager
        .add_operation(1, Processor::merge(), Operation::merge(OverrideRows::new(scheme)), &[id])
        .expect("register");
    let err = manager.execute().unwrap_err();
    match err {
        PipelineError::Halted { source, .. } => {
            assert!(matches!(*source, PipelineError::NotEnoughDatasets { got: 1 }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn merge_halts_on_shape_mismatch_with_the_entry_identified() {
    let scheme = FingerprintScheme::new(vec!["LOG".into()], vec![]);
    let mut manager = ExecutionManager::new();
    let main = manager.add_dataset(Dataset::new(log_table()));
    let other = manager.add_dataset(Dataset::new(
        Table::new(vec!["SOMETHING_ELSE".into()]).expect("table"),
    ));
    manager
        .add_operation(
            9,
            Processor::merge(),
            Operation::merge(OverrideRows::new(scheme)),
            &[main, other],
        )
        .expect("register");
    let err = manager.execute().unwrap_err();
    match err {
        PipelineError::Halted { order, processor, source, .. } => {
            assert_eq!(order, 9);
            assert_eq!(processor, "merge");
            assert!(matches!(*source, PipelineError::ShapeMismatch { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn non_merge_entries_run_once_per_dataset() {
    let mut manager = ExecutionManager::new();
    let first = manager.add_dataset(Dataset::new(log_table()));
    let second = manager.add_dataset(Dataset::new(log_table()));
    manager
        .add_operation(
            1,
            Processor::cleaning(),
            Operation::transform(AppendTag("x")),
            &[first, second],
        )
        .expect("register");
    manager.execute().expect("run");
    assert_eq!(log_value(manager.dataset(first).expect("dataset")), "x");
    assert_eq!(log_value(manager.dataset(second).expect("dataset")), "x");
}

#[test]
fn unknown_dataset_ids_are_rejected_at_registration() {
    let mut manager = ExecutionManager::new();
    let id = manager.add_dataset(Dataset::new(log_table()));
    let mut other_manager = ExecutionManager::new();
    let _ = other_manager.add_dataset(Dataset::new(log_table()));
    let foreign = other_manager.add_dataset(Dataset::new(log_table()));
    drop(other_manager);

    let err = manager
        .add_operation(
            1,
            Processor::cleaning(),
            Operation::transform(AppendTag("a")),
            &[id, foreign],
        )
        .unwrap_err();
    assert!(matches!(err, PipelineError::IndexOutOfRange { .. }));
}

#[test]
fn into_dataset_returns_the_final_table() {
    let mut manager = ExecutionManager::new();
    let id = manager.add_dataset(Dataset::new(log_table()));
    manager
        .add_operation(1, Processor::cleaning(), Operation::transform(AppendTag("z")), &[id])
        .expect("register");
    manager.execute().expect("run");
    let dataset = manager.into_dataset(id).expect("dataset");
    assert_eq!(
        dataset.table().rows()[0].get("LOG"),
        Some(&CellValue::text("z"))
    );
}
