use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of row-level violation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationReason {
    /// A required field is null, empty, or failed numeric coercion.
    RequiredFieldNull,
    /// A year field lies outside the configured bounds.
    YearOutOfRange,
    /// A percentage value is null, unparsable, or outside `[min, max]`.
    PercentOutOfRangeOrNull,
}

impl ViolationReason {
    /// Stable code written to the quarantine annotation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RequiredFieldNull => "required_field_null",
            Self::YearOutOfRange => "year_out_of_range",
            Self::PercentOutOfRangeOrNull => "percent_out_of_range_or_null",
        }
    }
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rule failure for one field of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Record ordinal in the coerced batch (before deduplication).
    pub row: usize,
    /// Field the rule fired on.
    pub field: String,
    /// Violation code.
    pub reason: ViolationReason,
}

impl Violation {
    /// Create a violation of `reason` on `field` of record `row`.
    pub fn new(row: usize, field: impl Into<String>, reason: ViolationReason) -> Self {
        Self {
            row,
            field: field.into(),
            reason,
        }
    }
}

/// Accumulated violation codes for a single record.
///
/// Codes keep the order the rules produced them; repeats from different fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordVerdict {
    /// Reason codes, in rule order.
    pub reasons: Vec<ViolationReason>,
}

impl RecordVerdict {
    /// A record is valid iff it has no violations.
    pub fn is_valid(&self) -> bool {
        self.reasons.is_empty()
    }

    /// Semicolon-joined reason codes, e.g. `required_field_null;year_out_of_range`.
    pub fn annotation(&self) -> String {
        self.reasons
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Fold a violation list into one verdict per record.
///
/// Violations pointing past `row_count` are ignored.
pub fn verdicts(row_count: usize, violations: &[Violation]) -> Vec<RecordVerdict> {
    let mut out = vec![RecordVerdict::default(); row_count];
    for v in violations {
        if let Some(verdict) = out.get_mut(v.row) {
            verdict.reasons.push(v.reason);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_joins_codes_in_order_and_keeps_repeats() {
        let vs = vec![
            Violation::new(1, "YearStart", ViolationReason::YearOutOfRange),
            Violation::new(0, "LocationAbbr", ViolationReason::RequiredFieldNull),
            Violation::new(1, "YearEnd", ViolationReason::YearOutOfRange),
            Violation::new(7, "DataValue", ViolationReason::PercentOutOfRangeOrNull),
        ];
        let out = verdicts(3, &vs);

        assert_eq!(out[0].annotation(), "required_field_null");
        assert_eq!(out[1].annotation(), "year_out_of_range;year_out_of_range");
        assert!(out[2].is_valid());
        assert_eq!(out[2].annotation(), "");
    }

    #[test]
    fn reason_serializes_as_code() {
        let json = serde_json::to_string(&ViolationReason::PercentOutOfRangeOrNull).unwrap();
        assert_eq!(json, "\"percent_out_of_range_or_null\"");
    }
}
