//! Command implementations for the Ratebook CLI.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use ratebook_cli::pipeline::{run_pipeline, split_collection};
use ratebook_core::Diagnostic;
use ratebook_ingest::{load_schema, read_table, write_table};
use ratebook_model::Schema;

use crate::cli::{MergeArgs, SchemaArgs};

/// Summary data for a completed merge run.
pub struct MergeOutcome {
    pub output: PathBuf,
    pub main_rows: usize,
    pub override_rows: usize,
    pub addition_rows: usize,
    pub final_rows: usize,
    pub executed: usize,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn run_merge(args: &MergeArgs) -> Result<MergeOutcome> {
    let schema = Arc::new(load_schema(&args.schema)?);
    let main = read_table(&args.main)?;
    let collection = read_table(&args.collection)?;
    let (overrides, additions) = split_collection(&collection)?;

    let main_rows = main.height();
    let override_rows = overrides.height();
    let addition_rows = additions.height();
    tracing::info!(
        main_rows,
        override_rows,
        addition_rows,
        "starting merge pipeline"
    );

    let (table, report) = run_pipeline(main, overrides, additions, &schema)?;
    write_table(&args.out, &table)?;

    Ok(MergeOutcome {
        output: args.out.clone(),
        main_rows,
        override_rows,
        addition_rows,
        final_rows: table.height(),
        executed: report.executed,
        diagnostics: report.diagnostics,
    })
}

pub fn run_schema(args: &SchemaArgs) -> Result<Schema> {
    Ok(load_schema(&args.schema)?)
}
