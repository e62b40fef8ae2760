//! End-to-end tests for the standard merge pipeline.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use ratebook_cli::pipeline::{run_pipeline, split_collection};
use ratebook_ingest::read_table;
use ratebook_model::{CellValue, Schema, Table};

const COLUMNS: [&str; 8] = [
    "STATE", "CITY", "YEAR", "LEVEL", "TRADE", "BASE", "FRINGE", "CONFIRMED",
];

fn schema() -> Arc<Schema> {
    let mut allowed = BTreeMap::new();
    allowed.insert(
        "LEVEL".to_string(),
        vec!["1-APPRENTICE".to_string(), "3-JOURNEY".to_string()],
    );
    Arc::new(
        Schema::new(
            COLUMNS.iter().map(|c| (*c).to_string()).collect(),
            allowed,
        )
        .expect("schema"),
    )
}

fn write_fixture(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create fixture");
    file.write_all(contents.as_bytes()).expect("write fixture");
    path
}

fn base_fringe(table: &Table, city: &str) -> Vec<(f64, f64)> {
    table
        .rows()
        .iter()
        .filter(|row| row.get("CITY").and_then(|v| v.as_text()) == Some(city))
        .map(|row| {
            (
                row.get("BASE").and_then(|v| v.as_number()).expect("base"),
                row.get("FRINGE").and_then(|v| v.as_number()).expect("fringe"),
            )
        })
        .collect()
}

#[test]
fn split_collection_honors_the_override_marker() {
    let mut collection =
        Table::new(vec!["CITY".into(), "BASE".into(), "OVERRIDE".into()]).expect("table");
    collection
        .push_values(vec![
            CellValue::text("SEATTLE"),
            CellValue::Number(41.0),
            CellValue::text("True"),
        ])
        .expect("row");
    collection
        .push_values(vec![
            CellValue::text("TACOMA"),
            CellValue::Number(12.0),
            CellValue::Number(0.0),
        ])
        .expect("row");
    collection
        .push_values(vec![
            CellValue::text("OLYMPIA"),
            CellValue::Number(20.0),
            CellValue::Missing,
        ])
        .expect("row");

    let (overrides, additions) = split_collection(&collection).expect("split");
    assert_eq!(overrides.height(), 1);
    assert_eq!(additions.height(), 2);
    assert!(!overrides.has_column("OVERRIDE"));
    assert!(!additions.has_column("OVERRIDE"));
}

#[test]
fn split_collection_without_marker_is_all_additions() {
    let collection = Table::new(vec!["CITY".into(), "BASE".into()]).expect("table");
    let (overrides, additions) = split_collection(&collection).expect("split");
    assert_eq!(overrides.height(), 0);
    assert_eq!(additions.height(), 0);
    assert_eq!(overrides.columns(), collection.columns());
}

/// The canonical flow: clean raw collection input, override conflicting
/// rate-book rows, append genuinely new ones, and let confirmed rows win.
#[test]
fn merge_pipeline_end_to_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    let main_path = write_fixture(
        &dir,
        "main.csv",
        concat!(
            "STATE,CITY,YEAR,LEVEL,TRADE,BASE,FRINGE,CONFIRMED\n",
            "WA,SEATTLE,2023,3-JOURNEY,ELECTRICIAN,39,29,1\n",
            "WA,TACOMA,2023,3-JOURNEY,ELECTRICIAN,12,6,1\n",
            "WA,OLYMPIA,2023,3-JOURNEY,ELECTRICIAN,59,35,0\n",
        ),
    );
    // Raw collection input: lowercase strings, dollar-prefixed rates, and
    // the legacy JOURNEYMAN level name.
    let collection_path = write_fixture(
        &dir,
        "collection.csv",
        concat!(
            "STATE,CITY,YEAR,LEVEL,TRADE,BASE,FRINGE,CONFIRMED,OVERRIDE\n",
            "WA,seattle,2023,3-JOURNEYMAN,electrician,$41.00,29,1,True\n",
            "WA,bellingham,2023,3-JOURNEY,electrician,18,7,1,False\n",
            "WA,tacoma,2023,3-JOURNEY,electrician,12,6,1,False\n",
            "WA,olympia,2023,3-JOURNEY,electrician,22,12,1,False\n",
        ),
    );

    let main = read_table(&main_path).expect("read main");
    let collection = read_table(&collection_path).expect("read collection");
    let (overrides, additions) = split_collection(&collection).expect("split");

    let (merged, report) = run_pipeline(main, overrides, additions, &schema()).expect("run");
    assert!(!report.has_failures());
    assert_eq!(report.executed, 13);

    // SEATTLE: override wins, cleaned to an uppercase, numeric row.
    assert_eq!(base_fringe(&merged, "SEATTLE"), vec![(41.0, 29.0)]);
    // TACOMA: the addition duplicated an existing row; nothing gained.
    assert_eq!(base_fringe(&merged, "TACOMA"), vec![(12.0, 6.0)]);
    // BELLINGHAM: genuinely new, appended.
    assert_eq!(base_fringe(&merged, "BELLINGHAM"), vec![(18.0, 7.0)]);
    // OLYMPIA: the confirmed row replaced the bigger unconfirmed one.
    assert_eq!(base_fringe(&merged, "OLYMPIA"), vec![(22.0, 12.0)]);
    assert_eq!(merged.height(), 4);
}

/// Running the same collection into the merged output a second time must
/// not grow the row set.
#[test]
fn merge_pipeline_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let main_path = write_fixture(
        &dir,
        "main.csv",
        concat!(
            "STATE,CITY,YEAR,LEVEL,TRADE,BASE,FRINGE,CONFIRMED\n",
            "WA,SEATTLE,2023,3-JOURNEY,ELECTRICIAN,39,29,1\n",
        ),
    );
    let collection_path = write_fixture(
        &dir,
        "collection.csv",
        concat!(
            "STATE,CITY,YEAR,LEVEL,TRADE,BASE,FRINGE,CONFIRMED,OVERRIDE\n",
            "WA,SEATTLE,2023,3-JOURNEY,ELECTRICIAN,41,29,1,True\n",
            "WA,BELLINGHAM,2023,3-JOURNEY,ELECTRICIAN,18,7,1,False\n",
        ),
    );

    let main = read_table(&main_path).expect("read main");
    let collection = read_table(&collection_path).expect("read collection");
    let (overrides, additions) = split_collection(&collection).expect("split");

    let (once, _) = run_pipeline(
        main,
        overrides.clone(),
        additions.clone(),
        &schema(),
    )
    .expect("first run");
    let (twice, _) = run_pipeline(once.clone(), overrides, additions, &schema()).expect("second run");
    assert_eq!(once, twice);
}

/// A schema violation inside validation is contained: the dataset is left
/// unchanged for that step and the run completes with a diagnostic.
#[test]
fn invalid_values_surface_as_diagnostics() {
    let dir = tempfile::tempdir().expect("tempdir");
    let main_path = write_fixture(
        &dir,
        "main.csv",
        concat!(
            "STATE,CITY,YEAR,LEVEL,TRADE,BASE,FRINGE,CONFIRMED\n",
            "WA,SEATTLE,2023,9-MASTER,ELECTRICIAN,39,29,1\n",
        ),
    );
    let collection_path = write_fixture(
        &dir,
        "collection.csv",
        concat!(
            "STATE,CITY,YEAR,LEVEL,TRADE,BASE,FRINGE,CONFIRMED,OVERRIDE\n",
            "WA,TACOMA,2023,3-JOURNEY,ELECTRICIAN,12,6,1,False\n",
        ),
    );

    let main = read_table(&main_path).expect("read main");
    let collection = read_table(&collection_path).expect("read collection");
    let (overrides, additions) = split_collection(&collection).expect("split");

    let (merged, report) = run_pipeline(main, overrides, additions, &schema()).expect("run");
    assert!(report.has_failures());
    assert!(
        report
            .diagnostics
            .iter()
            .any(|d| d.operation == "check_allowed_values" && d.message.contains("9-MASTER"))
    );
    // The offending row is still present; validation never mutates.
    assert_eq!(base_fringe(&merged, "SEATTLE"), vec![(39.0, 29.0)]);
}
