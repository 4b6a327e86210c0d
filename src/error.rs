use thiserror::Error;

/// Convenience result type for quality-gate operations.
pub type GateResult<T> = Result<T, GateError>;

/// Error type returned by the quality gate and its orchestration layer.
///
/// Row-level problems (null required values, out-of-range years, bad percentages) are never
/// errors; they become [`crate::validation::Violation`]s and route the record to quarantine.
/// Every variant here aborts the run before any output is written.
#[derive(Debug, Error)]
pub enum GateError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding/decoding error outside of schema parsing (summary, config).
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The schema document is structurally malformed.
    #[error("malformed schema document: {message}")]
    SchemaFormat { message: String },

    /// One or more required fields are entirely absent from the input columns.
    #[error("missing required columns: {columns:?}")]
    MissingColumns { columns: Vec<String> },

    /// The partition field is absent from the clean record set.
    #[error("partition field '{field}' missing in clean data; cannot partition")]
    MissingPartitionField { field: String },

    /// No raw input object could be selected.
    #[error("no raw input found under prefix '{prefix}'")]
    NoRawInput { prefix: String },

    /// A named object does not exist in the store.
    #[error("object not found: {name}")]
    ObjectNotFound { name: String },

    /// An output object name is unusable: a partition key that is not a single path segment, or
    /// two outputs that would land on the same object.
    #[error("invalid output name '{name}': {reason}")]
    InvalidOutputName { name: String, reason: String },

    /// Invalid configuration or input layout (bad glob, duplicate header, ...).
    #[error("configuration error: {message}")]
    Config { message: String },
}
