//! Error types for table and schema ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur at the file boundary.
#[derive(Debug, Error)]
pub enum IngestError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read a file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a CSV file.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Failed to parse a YAML schema file.
    #[error("failed to parse schema {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Schema file has no COLUMNS section.
    #[error("schema {path} is missing the COLUMNS section")]
    MissingColumnsSection { path: PathBuf },

    /// Schema file section has an unexpected shape.
    #[error("invalid schema section '{section}' in {path}: {message}")]
    InvalidSection {
        path: PathBuf,
        section: String,
        message: String,
    },

    /// Table or schema construction failed on loaded data.
    #[error(transparent)]
    Model(#[from] ratebook_model::PipelineError),
}
