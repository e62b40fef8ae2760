//! Diagnostic routing for operation failures.
//!
//! The classifier is the single place the typed error enum is mapped onto
//! the bounded reporting taxonomy and onto the continue/halt policy. It
//! holds no state and is safe to share across processors.

use std::fmt;

use ratebook_model::PipelineError;

use crate::operation::OperationCategory;

/// The bounded reporting taxonomy for operation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    MissingColumn,
    TypeMismatch,
    InvalidValue,
    IndexOutOfRange,
    SchemaNotProvided,
    ShapeMismatch,
    ResourceError,
    Unclassified,
}

impl FailureCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingColumn => "missing column",
            Self::TypeMismatch => "type mismatch",
            Self::InvalidValue => "invalid value",
            Self::IndexOutOfRange => "index out of range",
            Self::SchemaNotProvided => "schema not provided",
            Self::ShapeMismatch => "shape mismatch",
            Self::ResourceError => "resource error",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the pipeline continues past a classified failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Continue,
    Halt,
}

/// A swallowed operation failure, surfaced in the run report.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub order: u32,
    pub processor: &'static str,
    pub operation: String,
    pub category: FailureCategory,
    pub message: String,
}

/// Stateless classifier mapping typed errors onto [`FailureCategory`] and
/// deciding whether execution continues.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    pub fn classify(&self, error: &PipelineError) -> FailureCategory {
        match error {
            PipelineError::MissingColumn { .. } => FailureCategory::MissingColumn,
            PipelineError::TypeMismatch { .. } => FailureCategory::TypeMismatch,
            PipelineError::InvalidValue { .. }
            | PipelineError::DuplicateColumn { .. }
            | PipelineError::DuplicateIdentity { .. } => FailureCategory::InvalidValue,
            PipelineError::IndexOutOfRange { .. } => FailureCategory::IndexOutOfRange,
            PipelineError::SchemaNotProvided => FailureCategory::SchemaNotProvided,
            PipelineError::ShapeMismatch { .. } => FailureCategory::ShapeMismatch,
            PipelineError::Resource(_) => FailureCategory::ResourceError,
            PipelineError::Halted { source, .. } => self.classify(source),
            PipelineError::CategoryMismatch { .. }
            | PipelineError::ReservedOperation { .. }
            | PipelineError::DuplicateOrder { .. }
            | PipelineError::NotEnoughDatasets { .. }
            | PipelineError::Unclassified(_) => FailureCategory::Unclassified,
        }
    }

    /// Propagation policy: cleaning and validation failures are contained,
    /// except a missing schema, which would silently skip validation and
    /// is therefore always fatal. Every failure under a merge processor is
    /// fatal.
    pub fn disposition(
        &self,
        category: FailureCategory,
        processor: OperationCategory,
    ) -> Disposition {
        match (category, processor) {
            (FailureCategory::SchemaNotProvided, _) => Disposition::Halt,
            (FailureCategory::ShapeMismatch, _) => Disposition::Halt,
            (_, OperationCategory::Merge) => Disposition::Halt,
            _ => Disposition::Continue,
        }
    }
}
