//! Operation interfaces and the declared category tag.
//!
//! Every operation implements exactly one of three interfaces, selected by
//! the caller at registration time: a single-table transform, a
//! schema-aware check, or a two-table merge function. There is no
//! signature probing; an operation that wants schema access implements
//! [`SchemaCheck`], full stop.

use std::fmt;

use ratebook_model::{Result, Schema, Table};

/// The category an operation declares itself to belong to.
///
/// Processors verify the tag at registration and reject mismatches, so a
/// validation function can never end up on a cleaning processor by
/// accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationCategory {
    Cleaning,
    Validation,
    Merge,
}

impl OperationCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cleaning => "cleaning",
            Self::Validation => "validation",
            Self::Merge => "merge",
        }
    }
}

impl fmt::Display for OperationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pure single-table operation: current table in, replacement table out.
pub trait TableTransform: Send + Sync {
    fn name(&self) -> &str;

    fn category(&self) -> OperationCategory {
        OperationCategory::Cleaning
    }

    fn apply(&self, table: &Table) -> Result<Table>;
}

/// A table operation that also reads the dataset's schema.
pub trait SchemaCheck: Send + Sync {
    fn name(&self) -> &str;

    fn category(&self) -> OperationCategory {
        OperationCategory::Validation
    }

    fn apply(&self, table: &Table, schema: &Schema) -> Result<Table>;
}

/// A two-table merge function folding `other` into `main`.
pub trait TableMerge: Send + Sync {
    fn name(&self) -> &str;

    fn category(&self) -> OperationCategory {
        OperationCategory::Merge
    }

    fn apply(&self, main: &Table, other: &Table) -> Result<Table>;
}

/// A registered operation of any capability.
pub enum Operation {
    Transform(Box<dyn TableTransform>),
    Check(Box<dyn SchemaCheck>),
    Merge(Box<dyn TableMerge>),
}

impl Operation {
    pub fn transform(op: impl TableTransform + 'static) -> Self {
        Self::Transform(Box::new(op))
    }

    pub fn check(op: impl SchemaCheck + 'static) -> Self {
        Self::Check(Box::new(op))
    }

    pub fn merge(op: impl TableMerge + 'static) -> Self {
        Self::Merge(Box::new(op))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Transform(op) => op.name(),
            Self::Check(op) => op.name(),
            Self::Merge(op) => op.name(),
        }
    }

    pub fn category(&self) -> OperationCategory {
        match self {
            Self::Transform(op) => op.category(),
            Self::Check(op) => op.category(),
            Self::Merge(op) => op.category(),
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name())
            .field("category", &self.category())
            .finish()
    }
}

/// Names of the built-in operations. Custom operations registered through
/// the trusted path must not shadow any of these.
pub const RESERVED_OPERATIONS: &[&str] = &[
    "uppercase_strings",
    "trim_whitespace",
    "collapse_punctuation_spacing",
    "hyphenate_separators",
    "normalize_numeric_values",
    "replace_value",
    "keep_largest_duplicates",
    "replace_unconfirmed",
    "drop_unknown_columns",
    "check_allowed_values",
    "override_rows",
    "append_new_rows",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_OPERATIONS.contains(&name)
}
