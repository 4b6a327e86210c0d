//! Run summary.

use serde::{Deserialize, Serialize};

/// Run-level counts and metadata, written once per run as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Run timestamp, `YYYYMMDDTHHMMSSZ`.
    pub run_ts: String,
    /// Identifier of the raw input that was processed.
    pub raw_blob: String,
    /// Records after deduplication.
    pub total_rows: usize,
    /// Clean records.
    pub valid_rows: usize,
    /// Quarantined records.
    pub invalid_rows: usize,
    /// Required field names from the schema, in schema order.
    pub required_fields: Vec<String>,
}

impl RunSummary {
    /// Assemble a summary. `total_rows` is `valid_rows + invalid_rows`, since every deduplicated
    /// record lands in exactly one of the two sets.
    pub fn new(
        run_ts: impl Into<String>,
        raw_blob: impl Into<String>,
        valid_rows: usize,
        invalid_rows: usize,
        required_fields: Vec<String>,
    ) -> Self {
        Self {
            run_ts: run_ts.into(),
            raw_blob: raw_blob.into(),
            total_rows: valid_rows + invalid_rows,
            valid_rows,
            invalid_rows,
            required_fields,
        }
    }
}
