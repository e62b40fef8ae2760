use std::sync::Arc;

use ratebook_model::{Schema, Table};

/// A table plus an optional shared schema reference.
///
/// Operations never mutate a dataset's table in place: they receive the
/// current table and produce a replacement, which the owning processor
/// commits with [`Dataset::set_table`] only on success. A failing
/// operation therefore never leaves a dataset partially transformed.
#[derive(Debug, Clone)]
pub struct Dataset {
    table: Table,
    schema: Option<Arc<Schema>>,
}

impl Dataset {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            schema: None,
        }
    }

    pub fn with_schema(table: Table, schema: Arc<Schema>) -> Self {
        Self {
            table,
            schema: Some(schema),
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn set_table(&mut self, table: Table) {
        self.table = table;
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_deref()
    }

    pub fn record_count(&self) -> usize {
        self.table.height()
    }
}
