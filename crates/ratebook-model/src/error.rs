#![deny(unsafe_code)]

use thiserror::Error;

/// The failure taxonomy shared by every layer of the pipeline.
///
/// Operation implementations return these directly; the error classifier
/// maps them onto the bounded reporting categories and decides whether the
/// run continues.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("column not found: {column}")]
    MissingColumn { column: String },

    #[error("duplicate column: {column}")]
    DuplicateColumn { column: String },

    #[error("incompatible value in column {column}: expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: String,
    },

    #[error("{message}")]
    InvalidValue { message: String },

    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("schema required to validate the dataset")]
    SchemaNotProvided,

    #[error("tables have incompatible columns (left only: {left_only:?}, right only: {right_only:?})")]
    ShapeMismatch {
        left_only: Vec<String>,
        right_only: Vec<String>,
    },

    #[error("identity fingerprint {fingerprint} occurs more than once after reconciliation")]
    DuplicateIdentity { fingerprint: String },

    #[error("operation '{operation}' is tagged {found} but the processor expects {expected}")]
    CategoryMismatch {
        operation: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("operation name '{name}' collides with a built-in operation")]
    ReservedOperation { name: String },

    #[error("execution order {order} is already registered")]
    DuplicateOrder { order: u32 },

    #[error("merge requires at least two datasets, got {got}")]
    NotEnoughDatasets { got: usize },

    #[error("io error: {0}")]
    Resource(#[from] std::io::Error),

    #[error("{0}")]
    Unclassified(String),

    /// A fatal failure wrapped with the execution entry that raised it.
    #[error("pipeline halted at order {order} ({processor}/{operation}): {source}")]
    Halted {
        order: u32,
        processor: &'static str,
        operation: String,
        #[source]
        source: Box<PipelineError>,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
