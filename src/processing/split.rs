//! Routing records into the clean and quarantine sets.

use crate::types::{DataSet, Value};
use crate::validation::RecordVerdict;

/// Name of the annotation column appended to quarantined records.
pub const ERROR_REASON_COLUMN: &str = "__error_reason__";

/// Clean and quarantined records of one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    /// Records with no violations, original columns only.
    pub clean: DataSet,
    /// Records with at least one violation, original columns plus [`ERROR_REASON_COLUMN`].
    pub quarantine: DataSet,
}

/// Split `dataset` by `verdicts` (one per row, aligned by position).
///
/// Every row lands in exactly one of the two outputs. Rows without a verdict are treated as
/// valid.
pub fn split(dataset: &DataSet, verdicts: &[RecordVerdict]) -> Split {
    let is_valid = |idx: usize| verdicts.get(idx).is_none_or(RecordVerdict::is_valid);

    let clean = dataset.filter_rows(|idx, _| is_valid(idx));

    let mut columns = dataset.columns.clone();
    columns.push(ERROR_REASON_COLUMN.to_string());
    let rows = dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(idx, _)| !is_valid(*idx))
        .map(|(idx, row)| {
            let mut out = row.clone();
            out.push(Value::Utf8(verdicts[idx].annotation()));
            out
        })
        .collect();

    Split {
        clean,
        quarantine: DataSet::new(columns, rows),
    }
}
