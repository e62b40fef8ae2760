//! Run summaries rendered with `comfy-table`.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use ratebook_model::Schema;

use crate::commands::MergeOutcome;

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn print_merge_summary(outcome: &MergeOutcome) {
    println!("Output: {}", outcome.output.display());

    let mut table = styled_table();
    table.set_header(vec![header_cell("Dataset"), header_cell("Rows")]);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Main (in)"), Cell::new(outcome.main_rows)]);
    table.add_row(vec![
        Cell::new("Overrides"),
        Cell::new(outcome.override_rows),
    ]);
    table.add_row(vec![
        Cell::new("Additions"),
        Cell::new(outcome.addition_rows),
    ]);
    table.add_row(vec![
        Cell::new("Merged (out)").add_attribute(Attribute::Bold),
        Cell::new(outcome.final_rows).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    println!("Operations executed: {}", outcome.executed);

    if outcome.diagnostics.is_empty() {
        return;
    }
    let mut diagnostics = styled_table();
    diagnostics.set_header(vec![
        header_cell("Order"),
        header_cell("Processor"),
        header_cell("Operation"),
        header_cell("Category"),
        header_cell("Message"),
    ]);
    align_column(&mut diagnostics, 0, CellAlignment::Right);
    for diagnostic in &outcome.diagnostics {
        diagnostics.add_row(vec![
            Cell::new(diagnostic.order),
            Cell::new(diagnostic.processor),
            Cell::new(&diagnostic.operation),
            Cell::new(diagnostic.category.as_str()).fg(Color::Yellow),
            Cell::new(&diagnostic.message),
        ]);
    }
    println!("{} contained failure(s):", outcome.diagnostics.len());
    println!("{diagnostics}");
}

pub fn print_schema(schema: &Schema) {
    let mut table = styled_table();
    table.set_header(vec![header_cell("Column"), header_cell("Allowed values")]);
    for column in schema.columns() {
        let constraint = match schema.allowed_values(column) {
            Some(values) => values.join(", "),
            None => "(unconstrained)".to_string(),
        };
        table.add_row(vec![Cell::new(column), Cell::new(constraint)]);
    }
    println!("{table}");
}
