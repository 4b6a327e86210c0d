//! Run orchestration around the gate.
//!
//! [`execute`] is the thin layer that touches storage:
//!
//! 1. select the raw input (unless [`RunConfig::raw_blob`] pins one)
//! 2. load the schema document and the raw CSV
//! 3. run the [`QualityGate`] (pure; any fatal error stops here with nothing written)
//! 4. write one CSV per partition, the quarantine CSV if non-empty, and the summary JSON
//!
//! When an [`RunObserver`] is provided, this function reports:
//!
//! - `on_success` once all outputs are written, with row count stats
//! - `on_failure` on failure, with a computed severity
//! - `on_alert` on failure when the computed severity is >= `config.alert_at_or_above`
//!
//! ```no_run
//! use cdi_quality_gate::run::{execute, run_timestamp, RunConfig, TracingObserver};
//! use cdi_quality_gate::storage::LocalStore;
//!
//! # fn main() -> Result<(), cdi_quality_gate::GateError> {
//! let store = LocalStore::new("/data/lake");
//! let config = RunConfig::default();
//! let observer = TracingObserver;
//! let report = execute(&store, &config, &run_timestamp(chrono::Utc::now()), Some(&observer))?;
//! println!("valid={} invalid={}", report.summary.valid_rows, report.summary.invalid_rows);
//! # Ok(())
//! # }
//! ```

mod observability;

use std::collections::HashSet;
use std::error::Error as StdError;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GateError, GateResult};
use crate::ingestion::{read_csv_from_bytes, select_latest};
use crate::output::{csv_bytes, summary_json};
use crate::pipeline::{GateOptions, QualityGate};
use crate::report::RunSummary;
use crate::schema::parse_schema;
use crate::storage::ObjectStore;

pub use observability::{
    CompositeObserver, FileObserver, RunContext, RunObserver, RunSeverity, RunStats, TracingObserver,
};

/// Storage layout and gate options for a run. Defaults reproduce the CDI lake layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Dataset name used in output file names.
    pub dataset: String,
    /// Prefix listed when selecting the latest raw input.
    pub raw_prefix: String,
    /// Process this object instead of selecting the latest one.
    pub raw_blob: Option<String>,
    /// Glob that candidate raw object names must match.
    pub raw_pattern: Option<String>,
    /// Prefix for per-partition clean outputs.
    pub clean_prefix: String,
    /// Prefix for quarantine outputs.
    pub quarantine_prefix: String,
    /// Object name of the schema document.
    pub schema_path: String,
    /// Prefix for run summaries.
    pub validation_prefix: String,
    /// Failures at or above this severity trigger `on_alert`.
    pub alert_at_or_above: RunSeverity,
    /// Gate options.
    pub gate: GateOptions,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dataset: "cdi".to_string(),
            raw_prefix: "raw".to_string(),
            raw_blob: None,
            raw_pattern: None,
            clean_prefix: "clean/cdi".to_string(),
            quarantine_prefix: "quarantine/cdi".to_string(),
            schema_path: "meta/schema/cdi_schema.json".to_string(),
            validation_prefix: "meta/validation".to_string(),
            alert_at_or_above: RunSeverity::Critical,
            gate: GateOptions::default(),
        }
    }
}

impl RunConfig {
    /// Load a config from a JSON file. Missing keys fall back to defaults.
    pub fn from_json_path(path: impl AsRef<Path>) -> GateResult<Self> {
        let bytes = fs::read(path)?;
        Self::from_json_slice(&bytes)
    }

    /// Parse a config from JSON bytes. Missing keys fall back to defaults.
    pub fn from_json_slice(bytes: &[u8]) -> GateResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| GateError::Config {
            message: format!("invalid run config: {e}"),
        })
    }

    /// Object name of the clean CSV for partition `label`.
    pub fn partition_name(&self, label: &str) -> String {
        format!(
            "{}/year={label}/{}_clean_year_{label}.csv",
            self.clean_prefix.trim_end_matches('/'),
            self.dataset
        )
    }

    /// Object name of the quarantine CSV for `run_ts`.
    pub fn quarantine_name(&self, run_ts: &str) -> String {
        format!(
            "{}/{}_quarantine_{run_ts}.csv",
            self.quarantine_prefix.trim_end_matches('/'),
            self.dataset
        )
    }

    /// Object name of the summary JSON for `run_ts`.
    pub fn summary_name(&self, run_ts: &str) -> String {
        format!(
            "{}/validation_{run_ts}.json",
            self.validation_prefix.trim_end_matches('/')
        )
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Summary written for the run.
    pub summary: RunSummary,
    /// Records dropped as exact duplicates.
    pub duplicates_removed: usize,
    /// Number of clean partitions written.
    pub partitions: usize,
    /// Object names written, in write order.
    pub written: Vec<String>,
}

/// Format a run timestamp as `YYYYMMDDTHHMMSSZ`.
pub fn run_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Execute one run against `store`. See the module docs for the sequence.
pub fn execute(
    store: &dyn ObjectStore,
    config: &RunConfig,
    run_ts: &str,
    observer: Option<&dyn RunObserver>,
) -> GateResult<RunReport> {
    let mut ctx = RunContext {
        run_ts: run_ts.to_string(),
        source: None,
    };

    let result = execute_inner(store, config, &mut ctx);

    if let Some(obs) = observer {
        match &result {
            Ok(report) => obs.on_success(
                &ctx,
                RunStats {
                    total_rows: report.summary.total_rows,
                    valid_rows: report.summary.valid_rows,
                    invalid_rows: report.summary.invalid_rows,
                    duplicates_removed: report.duplicates_removed,
                    partitions: report.partitions,
                },
            ),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= config.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

fn execute_inner(
    store: &dyn ObjectStore,
    config: &RunConfig,
    ctx: &mut RunContext,
) -> GateResult<RunReport> {
    let source = match &config.raw_blob {
        Some(name) => name.clone(),
        None => select_latest(store, &config.raw_prefix, config.raw_pattern.as_deref())?,
    };
    tracing::info!(source = %source, "using raw input");
    ctx.source = Some(source.clone());

    let schema = parse_schema(&store.read(&config.schema_path)?)?;
    let raw = read_csv_from_bytes(&store.read(&source)?)?;

    let gate = QualityGate::new(schema, config.gate.clone());
    let outcome = gate.run(&raw)?;
    let summary = outcome.summary(ctx.run_ts.as_str(), source.as_str());

    // Encode everything before the first write so an encoding failure leaves the store untouched.
    let mut pending: Vec<(String, Vec<u8>)> = Vec::with_capacity(outcome.partitions.len() + 2);
    for group in &outcome.partitions {
        let label = group.key.label();
        check_path_segment(&label)?;
        pending.push((config.partition_name(&label), csv_bytes(&group.dataset)?));
    }
    if outcome.quarantine.is_empty() {
        tracing::info!("no invalid rows; no quarantine file created");
    } else {
        pending.push((config.quarantine_name(&ctx.run_ts), csv_bytes(&outcome.quarantine)?));
    }
    pending.push((config.summary_name(&ctx.run_ts), summary_json(&summary)?));
    check_distinct(&pending)?;

    let mut written = Vec::with_capacity(pending.len());
    for (name, bytes) in pending {
        store.write(&name, &bytes)?;
        tracing::debug!(object = %name, bytes = bytes.len(), "wrote output");
        written.push(name);
    }

    Ok(RunReport {
        summary,
        duplicates_removed: outcome.duplicates_removed,
        partitions: outcome.partitions.len(),
        written,
    })
}

/// A partition label becomes one path segment of the output name.
fn check_path_segment(label: &str) -> GateResult<()> {
    let reason = if label.is_empty() {
        Some("empty partition key")
    } else if label == "." || label == ".." {
        Some("partition key is a relative path component")
    } else if label.contains(['/', '\\']) {
        Some("partition key contains a path separator")
    } else if label.chars().any(char::is_control) {
        Some("partition key contains a control character")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(GateError::InvalidOutputName {
            name: label.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

fn check_distinct(pending: &[(String, Vec<u8>)]) -> GateResult<()> {
    let mut seen = HashSet::with_capacity(pending.len());
    for (name, _) in pending {
        if !seen.insert(name.as_str()) {
            return Err(GateError::InvalidOutputName {
                name: name.clone(),
                reason: "written twice in one run".to_string(),
            });
        }
    }
    Ok(())
}

fn severity_for_error(e: &GateError) -> RunSeverity {
    match e {
        GateError::Io(_) => RunSeverity::Critical,
        GateError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => RunSeverity::Critical,
            _ => RunSeverity::Error,
        },
        GateError::Json(err) => {
            if error_chain_contains_io(err) {
                RunSeverity::Critical
            } else {
                RunSeverity::Error
            }
        }
        GateError::ObjectNotFound { .. } => RunSeverity::Critical,
        GateError::SchemaFormat { .. }
        | GateError::MissingColumns { .. }
        | GateError::MissingPartitionField { .. }
        | GateError::NoRawInput { .. }
        | GateError::InvalidOutputName { .. }
        | GateError::Config { .. } => RunSeverity::Error,
    }
}

fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}
