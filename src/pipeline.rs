//! The quality gate: coercion → validation → deduplication → split → partition.
//!
//! [`QualityGate::run`] is pure: it takes a [`RawTable`] and returns a [`GateOutcome`] without
//! touching storage, so a fatal error always leaves nothing half-written.

use serde::{Deserialize, Serialize};

use crate::error::GateResult;
use crate::ingestion::{coerce, CoercionFailure, CoercionOptions};
use crate::processing::{deduplicate, partition_by, split, DedupKey, PartitionGroup};
use crate::report::RunSummary;
use crate::types::{DataSet, RawTable, Schema};
use crate::validation::{validate, verdicts, RuleSet, Violation};

/// Typed configuration for the gate. Defaults match the CDI dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateOptions {
    /// Text normalization and null detection.
    pub coercion: CoercionOptions,
    /// Record-level rule bounds and field names.
    pub rules: RuleSet,
    /// Composite key for duplicate removal.
    pub dedup: DedupKey,
    /// Field the clean set is partitioned by.
    pub partition_field: String,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            coercion: CoercionOptions::default(),
            rules: RuleSet::default(),
            dedup: DedupKey::default(),
            partition_field: "YearStart".to_string(),
        }
    }
}

/// Everything the gate decided about one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct GateOutcome {
    /// Records read from the input, before deduplication.
    pub input_rows: usize,
    /// Violations against the coerced batch; `row` is the pre-deduplication ordinal.
    pub violations: Vec<Violation>,
    /// Numeric cells that failed to parse and were nulled.
    pub coercion_failures: Vec<CoercionFailure>,
    /// Records dropped as exact duplicates.
    pub duplicates_removed: usize,
    /// Admissible records, original columns only.
    pub clean: DataSet,
    /// Rejected records with their annotation column.
    pub quarantine: DataSet,
    /// The clean set grouped by the partition field, ascending.
    pub partitions: Vec<PartitionGroup>,
    /// Required field names from the schema.
    pub required_fields: Vec<String>,
}

impl GateOutcome {
    /// Records after deduplication.
    pub fn total_rows(&self) -> usize {
        self.clean.row_count() + self.quarantine.row_count()
    }

    /// Build the run summary for this outcome.
    pub fn summary(&self, run_ts: impl Into<String>, source: impl Into<String>) -> RunSummary {
        RunSummary::new(
            run_ts,
            source,
            self.clean.row_count(),
            self.quarantine.row_count(),
            self.required_fields.clone(),
        )
    }
}

/// A schema plus options, ready to judge batches.
#[derive(Debug, Clone)]
pub struct QualityGate {
    schema: Schema,
    options: GateOptions,
}

impl QualityGate {
    /// Create a gate with the given schema and options.
    pub fn new(schema: Schema, options: GateOptions) -> Self {
        Self { schema, options }
    }

    /// Schema the gate validates against.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Options in effect.
    pub fn options(&self) -> &GateOptions {
        &self.options
    }

    /// Judge one batch.
    ///
    /// Fatal conditions: a required column absent from the input
    /// ([`crate::GateError::MissingColumns`]) or the partition field absent from the clean set
    /// ([`crate::GateError::MissingPartitionField`]).
    pub fn run(&self, raw: &RawTable) -> GateResult<GateOutcome> {
        let coerced = coerce(raw, &self.schema, &self.options.coercion);
        for failure in &coerced.failures {
            let required = self.schema.field(&failure.column).is_some_and(|f| f.required);
            if !required {
                tracing::warn!(
                    row = failure.row,
                    column = %failure.column,
                    raw = %failure.raw,
                    "non-numeric value in optional numeric field nulled without a violation"
                );
            }
        }

        let violations = validate(&coerced.dataset, &self.schema, &self.options.rules)?;
        let row_verdicts = verdicts(coerced.dataset.row_count(), &violations);

        let deduped = deduplicate(&coerced.dataset, &self.options.dedup);
        let kept_verdicts: Vec<_> = deduped
            .kept
            .iter()
            .map(|&i| row_verdicts[i].clone())
            .collect();

        let routed = split(&deduped.dataset, &kept_verdicts);
        let partitions = partition_by(&routed.clean, &self.options.partition_field)?;

        tracing::info!(
            input_rows = raw.row_count(),
            duplicates_removed = deduped.removed,
            valid_rows = routed.clean.row_count(),
            invalid_rows = routed.quarantine.row_count(),
            partitions = partitions.len(),
            "quality gate finished"
        );

        Ok(GateOutcome {
            input_rows: raw.row_count(),
            violations,
            coercion_failures: coerced.failures,
            duplicates_removed: deduped.removed,
            clean: routed.clean,
            quarantine: routed.quarantine,
            partitions,
            required_fields: self.schema.required_fields(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GateError;
    use crate::types::{DataType, Field, Value};

    fn schema() -> Schema {
        Schema::new(vec![
            Field::required("YearStart", DataType::Integer),
            Field::required("LocationAbbr", DataType::String),
            Field::required("DataValue", DataType::Float),
            Field::new("DataValueUnit", DataType::String),
            Field::new("LowConfidenceLimit", DataType::Float),
        ])
    }

    fn raw(rows: &[[&str; 5]]) -> RawTable {
        RawTable::new(
            ["YearStart", "LocationAbbr", "DataValue", "DataValueUnit", "LowConfidenceLimit"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn counts_add_up_and_sets_are_disjoint() {
        let gate = QualityGate::new(schema(), GateOptions::default());
        let out = gate
            .run(&raw(&[
                ["1995", "US", "50", "%", ""],
                ["2060", "CA", "50", "%", ""],
                ["1995", "us", "50", "%", ""],
                ["2001", "", "7", "cases", ""],
                ["2001", "TX", "101", "%", ""],
            ]))
            .unwrap();

        assert_eq!(out.input_rows, 5);
        assert_eq!(out.duplicates_removed, 1);
        assert_eq!(out.total_rows(), 4);
        assert_eq!(out.clean.row_count(), 1);
        assert_eq!(out.quarantine.row_count(), 3);
        for q in &out.quarantine.rows {
            let body = &q[..q.len() - 1];
            assert!(!out.clean.rows.iter().any(|c| c.as_slice() == body));
        }
    }

    #[test]
    fn optional_numeric_coercion_failure_is_reported_but_not_a_violation() {
        let gate = QualityGate::new(schema(), GateOptions::default());
        let out = gate.run(&raw(&[["2000", "US", "10", "%", "oops"]])).unwrap();
        assert!(out.violations.is_empty());
        assert_eq!(out.coercion_failures.len(), 1);
        assert_eq!(out.clean.rows[0][4], Value::Null);
    }

    #[test]
    fn required_numeric_coercion_failure_is_required_field_null() {
        let gate = QualityGate::new(schema(), GateOptions::default());
        let out = gate.run(&raw(&[["2000", "US", "n.a.", "cases", ""]])).unwrap();
        assert_eq!(out.quarantine.row_count(), 1);
        assert_eq!(
            out.quarantine.rows[0].last(),
            Some(&Value::Utf8("required_field_null".to_string()))
        );
    }

    #[test]
    fn missing_partition_field_is_fatal() {
        let options = GateOptions {
            partition_field: "YearEnd".to_string(),
            ..Default::default()
        };
        let gate = QualityGate::new(schema(), options);
        let err = gate.run(&raw(&[["2000", "US", "10", "%", ""]])).unwrap_err();
        assert!(matches!(err, GateError::MissingPartitionField { .. }));
    }

    #[test]
    fn summary_reflects_outcome() {
        let gate = QualityGate::new(schema(), GateOptions::default());
        let out = gate.run(&raw(&[["2000", "US", "10", "%", ""]])).unwrap();
        let summary = out.summary("20240101T000000Z", "raw/a.csv");
        assert_eq!(summary.total_rows, 1);
        assert_eq!(summary.valid_rows, 1);
        assert_eq!(summary.invalid_rows, 0);
        assert_eq!(summary.required_fields, vec!["YearStart", "LocationAbbr", "DataValue"]);
    }
}
