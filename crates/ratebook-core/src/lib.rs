pub mod classify;
pub mod dataset;
pub mod fingerprint;
pub mod manager;
pub mod merge;
pub mod operation;
pub mod processor;
pub mod transforms;
pub mod validate;

pub use classify::{Diagnostic, Disposition, ErrorClassifier, FailureCategory};
pub use dataset::Dataset;
pub use fingerprint::{FingerprintScheme, sha256_hex};
pub use manager::{DatasetId, ExecutionManager, RunReport};
pub use merge::{
    AppendNewRows, KeepLargestDuplicates, OverrideRows, ReplaceUnconfirmed, add_new_rows,
    apply_override, filter_same_rows, keep_largest, replace_unconfirmed,
};
pub use operation::{
    Operation, OperationCategory, RESERVED_OPERATIONS, SchemaCheck, TableMerge, TableTransform,
    is_reserved,
};
pub use processor::{
    ApplyOutcome, CleaningProcessor, MergeProcessor, Processor, ValidationProcessor,
};
pub use transforms::{
    CollapsePunctuationSpacing, HyphenateSeparators, NormalizeNumericValues, ReplaceValue,
    TrimWhitespace, UppercaseStrings,
};
pub use validate::{CheckAllowedValues, DropUnknownColumns};
