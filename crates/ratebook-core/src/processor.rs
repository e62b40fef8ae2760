//! The three processor kinds and their containment behavior.
//!
//! A processor verifies an operation's declared category at registration,
//! runs it against a dataset's current table, and commits the replacement
//! table only on success. Failures are classified once, here; contained
//! failures come back as [`ApplyOutcome::Skipped`] with the dataset
//! untouched, fatal ones as `Err`.

use ratebook_model::{PipelineError, Result, Table};

use crate::classify::{Disposition, ErrorClassifier, FailureCategory};
use crate::dataset::Dataset;
use crate::operation::{Operation, OperationCategory};

/// Result of applying one operation to one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Skipped {
        category: FailureCategory,
        message: String,
    },
}

fn wrong_shape(operation: &Operation, expected: OperationCategory) -> PipelineError {
    PipelineError::CategoryMismatch {
        operation: operation.name().to_string(),
        expected: expected.as_str(),
        found: operation.category().as_str(),
    }
}

fn contain(
    classifier: &ErrorClassifier,
    processor: OperationCategory,
    operation: &Operation,
    error: PipelineError,
) -> Result<ApplyOutcome> {
    let category = classifier.classify(&error);
    match classifier.disposition(category, processor) {
        Disposition::Halt => Err(error),
        Disposition::Continue => {
            tracing::warn!(
                operation = operation.name(),
                category = category.as_str(),
                %error,
                "operation failed; dataset left unchanged"
            );
            Ok(ApplyOutcome::Skipped {
                category,
                message: error.to_string(),
            })
        }
    }
}

/// Applies cleaning transforms, one dataset at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleaningProcessor {
    classifier: ErrorClassifier,
}

impl CleaningProcessor {
    pub const NAME: &'static str = "cleaning";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self) -> OperationCategory {
        OperationCategory::Cleaning
    }

    pub fn register(&self, operation: &Operation) -> Result<()> {
        if operation.category() != OperationCategory::Cleaning {
            return Err(wrong_shape(operation, OperationCategory::Cleaning));
        }
        Ok(())
    }

    pub fn apply_one(&self, operation: &Operation, dataset: &mut Dataset) -> Result<ApplyOutcome> {
        let Operation::Transform(op) = operation else {
            return Err(wrong_shape(operation, OperationCategory::Cleaning));
        };
        match op.apply(dataset.table()) {
            Ok(table) => {
                dataset.set_table(table);
                Ok(ApplyOutcome::Applied)
            }
            Err(error) => contain(
                &self.classifier,
                OperationCategory::Cleaning,
                operation,
                error,
            ),
        }
    }
}

/// Applies validation checks; requires the dataset to carry a schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationProcessor {
    classifier: ErrorClassifier,
}

impl ValidationProcessor {
    pub const NAME: &'static str = "validation";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self) -> OperationCategory {
        OperationCategory::Validation
    }

    pub fn register(&self, operation: &Operation) -> Result<()> {
        if operation.category() != OperationCategory::Validation {
            return Err(wrong_shape(operation, OperationCategory::Validation));
        }
        Ok(())
    }

    pub fn apply_one(&self, operation: &Operation, dataset: &mut Dataset) -> Result<ApplyOutcome> {
        let result = match (dataset.schema(), operation) {
            (_, Operation::Merge(_)) => {
                return Err(wrong_shape(operation, OperationCategory::Validation));
            }
            // A dataset without a schema cannot be validated; skipping
            // silently would break the validation guarantee.
            (None, _) => Err(PipelineError::SchemaNotProvided),
            (Some(schema), Operation::Check(op)) => op.apply(dataset.table(), schema),
            // Table-only operations arrive through the trusted
            // registration path; they validate without schema access.
            (Some(_), Operation::Transform(op)) => op.apply(dataset.table()),
        };
        match result {
            Ok(table) => {
                dataset.set_table(table);
                Ok(ApplyOutcome::Applied)
            }
            Err(error) => contain(
                &self.classifier,
                OperationCategory::Validation,
                operation,
                error,
            ),
        }
    }
}

/// Left-folds a merge operation across a dataset sequence: the first
/// dataset accumulates, each subsequent table is folded into it pairwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeProcessor {
    classifier: ErrorClassifier,
}

impl MergeProcessor {
    pub const NAME: &'static str = "merge";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self) -> OperationCategory {
        OperationCategory::Merge
    }

    pub fn register(&self, operation: &Operation) -> Result<()> {
        if operation.category() != OperationCategory::Merge {
            return Err(wrong_shape(operation, OperationCategory::Merge));
        }
        Ok(())
    }

    pub fn apply(
        &self,
        operation: &Operation,
        main: &mut Dataset,
        others: &[Table],
    ) -> Result<()> {
        let Operation::Merge(op) = operation else {
            return Err(wrong_shape(operation, OperationCategory::Merge));
        };
        let mut accumulated = main.table().clone();
        for other in others {
            match op.apply(&accumulated, other) {
                Ok(table) => accumulated = table,
                Err(error) => {
                    let category = self.classifier.classify(&error);
                    tracing::error!(
                        operation = operation.name(),
                        category = category.as_str(),
                        %error,
                        "merge failed"
                    );
                    return Err(error);
                }
            }
        }
        main.set_table(accumulated);
        Ok(())
    }
}

/// A processor of any kind, as stored on an execution entry.
#[derive(Debug, Clone, Copy)]
pub enum Processor {
    Cleaning(CleaningProcessor),
    Validation(ValidationProcessor),
    Merge(MergeProcessor),
}

impl Processor {
    pub fn cleaning() -> Self {
        Self::Cleaning(CleaningProcessor::new())
    }

    pub fn validation() -> Self {
        Self::Validation(ValidationProcessor::new())
    }

    pub fn merge() -> Self {
        Self::Merge(MergeProcessor::new())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Cleaning(_) => CleaningProcessor::NAME,
            Self::Validation(_) => ValidationProcessor::NAME,
            Self::Merge(_) => MergeProcessor::NAME,
        }
    }

    pub fn category(&self) -> OperationCategory {
        match self {
            Self::Cleaning(_) => OperationCategory::Cleaning,
            Self::Validation(_) => OperationCategory::Validation,
            Self::Merge(_) => OperationCategory::Merge,
        }
    }

    pub fn register(&self, operation: &Operation) -> Result<()> {
        match self {
            Self::Cleaning(processor) => processor.register(operation),
            Self::Validation(processor) => processor.register(operation),
            Self::Merge(processor) => processor.register(operation),
        }
    }
}
