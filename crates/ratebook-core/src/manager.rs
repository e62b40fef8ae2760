//! Ordered execution of registered operations across datasets.
//!
//! The manager owns the datasets and the entry bag for one pipeline run.
//! It is an ordinary value: construct one per pipeline, never share one
//! process-wide, and independent pipelines (and tests) stay isolated.

use std::collections::BTreeSet;

use ratebook_model::{PipelineError, Result};

use crate::classify::Diagnostic;
use crate::dataset::Dataset;
use crate::operation::{Operation, is_reserved};
use crate::processor::{ApplyOutcome, Processor};

/// Handle to a dataset owned by an [`ExecutionManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatasetId(usize);

impl DatasetId {
    pub fn index(self) -> usize {
        self.0
    }
}

struct Entry {
    order: u32,
    seq: usize,
    processor: Processor,
    operation: Operation,
    datasets: Vec<DatasetId>,
}

/// Outcome of a completed run: entries executed plus the diagnostics of
/// every contained failure.
#[derive(Debug, Default)]
pub struct RunReport {
    pub executed: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Accumulates execution entries and runs them in ascending order.
#[derive(Default)]
pub struct ExecutionManager {
    datasets: Vec<Dataset>,
    entries: Vec<Entry>,
    orders: BTreeSet<u32>,
}

impl ExecutionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dataset(&mut self, dataset: Dataset) -> DatasetId {
        self.datasets.push(dataset);
        DatasetId(self.datasets.len() - 1)
    }

    pub fn dataset(&self, id: DatasetId) -> Result<&Dataset> {
        self.datasets.get(id.0).ok_or(PipelineError::IndexOutOfRange {
            index: id.0,
            len: self.datasets.len(),
        })
    }

    /// Take a dataset out of the manager, consuming it. Call after
    /// `execute` to retrieve the final result.
    pub fn into_dataset(mut self, id: DatasetId) -> Result<Dataset> {
        if id.0 >= self.datasets.len() {
            return Err(PipelineError::IndexOutOfRange {
                index: id.0,
                len: self.datasets.len(),
            });
        }
        Ok(self.datasets.swap_remove(id.0))
    }

    /// Register an operation under an explicit order, verifying that its
    /// declared category matches the processor's.
    pub fn add_operation(
        &mut self,
        order: u32,
        processor: Processor,
        operation: Operation,
        datasets: &[DatasetId],
    ) -> Result<()> {
        processor.register(&operation)?;
        self.push_entry(order, processor, operation, datasets)
    }

    /// Trusted registration: skips the category check but refuses names
    /// that shadow a built-in operation.
    pub fn add_custom_operation(
        &mut self,
        order: u32,
        processor: Processor,
        operation: Operation,
        datasets: &[DatasetId],
    ) -> Result<()> {
        if is_reserved(operation.name()) {
            return Err(PipelineError::ReservedOperation {
                name: operation.name().to_string(),
            });
        }
        self.push_entry(order, processor, operation, datasets)
    }

    fn push_entry(
        &mut self,
        order: u32,
        processor: Processor,
        operation: Operation,
        datasets: &[DatasetId],
    ) -> Result<()> {
        for id in datasets {
            if id.0 >= self.datasets.len() {
                return Err(PipelineError::IndexOutOfRange {
                    index: id.0,
                    len: self.datasets.len(),
                });
            }
        }
        if !self.orders.insert(order) {
            return Err(PipelineError::DuplicateOrder { order });
        }
        self.entries.push(Entry {
            order,
            seq: self.entries.len(),
            processor,
            operation,
            datasets: datasets.to_vec(),
        });
        Ok(())
    }

    /// Run every registered entry in ascending order. Entries are consumed
    /// by the run and never replayed.
    ///
    /// Contained failures leave their dataset unchanged and are collected
    /// in the report; fatal failures abort the run wrapped with the
    /// offending entry's order, processor, and operation.
    pub fn execute(&mut self) -> Result<RunReport> {
        let mut entries = std::mem::take(&mut self.entries);
        // Orders are unique by registration policy; the stable sort keeps
        // the total order deterministic regardless.
        entries.sort_by_key(|entry| (entry.order, entry.seq));

        let mut report = RunReport::default();
        for entry in &entries {
            tracing::debug!(
                order = entry.order,
                processor = entry.processor.name(),
                operation = entry.operation.name(),
                datasets = entry.datasets.len(),
                "executing entry"
            );
            if let Err(source) = self.run_entry(entry, &mut report) {
                return Err(PipelineError::Halted {
                    order: entry.order,
                    processor: entry.processor.name(),
                    operation: entry.operation.name().to_string(),
                    source: Box::new(source),
                });
            }
            report.executed += 1;
        }
        Ok(report)
    }

    fn run_entry(&mut self, entry: &Entry, report: &mut RunReport) -> Result<()> {
        match &entry.processor {
            Processor::Merge(processor) => {
                if entry.datasets.len() < 2 {
                    return Err(PipelineError::NotEnoughDatasets {
                        got: entry.datasets.len(),
                    });
                }
                let others: Vec<_> = entry.datasets[1..]
                    .iter()
                    .map(|id| self.datasets[id.0].table().clone())
                    .collect();
                let main = &mut self.datasets[entry.datasets[0].0];
                processor.apply(&entry.operation, main, &others)
            }
            Processor::Cleaning(processor) => {
                for id in &entry.datasets {
                    let dataset = &mut self.datasets[id.0];
                    let outcome = processor.apply_one(&entry.operation, dataset)?;
                    Self::record(entry, outcome, report);
                }
                Ok(())
            }
            Processor::Validation(processor) => {
                for id in &entry.datasets {
                    let dataset = &mut self.datasets[id.0];
                    let outcome = processor.apply_one(&entry.operation, dataset)?;
                    Self::record(entry, outcome, report);
                }
                Ok(())
            }
        }
    }

    fn record(entry: &Entry, outcome: ApplyOutcome, report: &mut RunReport) {
        if let ApplyOutcome::Skipped { category, message } = outcome {
            report.diagnostics.push(Diagnostic {
                order: entry.order,
                processor: entry.processor.name(),
                operation: entry.operation.name().to_string(),
                category,
                message,
            });
        }
    }
}
