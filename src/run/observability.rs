use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::GateError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunSeverity {
    /// Error-level event (run aborted on bad input).
    Error,
    /// Critical error (I/O or other infrastructure failures).
    Critical,
}

/// Context about a run attempt.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Run timestamp.
    pub run_ts: String,
    /// Raw input identifier, once selected.
    pub source: Option<String>,
}

/// Counts reported on a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Records after deduplication.
    pub total_rows: usize,
    /// Records written to a clean partition.
    pub valid_rows: usize,
    /// Records written to quarantine.
    pub invalid_rows: usize,
    /// Records dropped as exact duplicates.
    pub duplicates_removed: usize,
    /// Clean partition objects written.
    pub partitions: usize,
}

/// Observer interface for run outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait RunObserver: Send + Sync {
    /// Called when a run completes and all outputs are written.
    fn on_success(&self, _ctx: &RunContext, _stats: RunStats) {}

    /// Called when a run aborts.
    fn on_failure(&self, _ctx: &RunContext, _severity: RunSeverity, _error: &GateError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &RunContext, severity: RunSeverity, error: &GateError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn RunObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn RunObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl RunObserver for CompositeObserver {
    fn on_success(&self, ctx: &RunContext, stats: RunStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &RunContext, severity: RunSeverity, error: &GateError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &RunContext, severity: RunSeverity, error: &GateError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Forwards run events to `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn on_success(&self, ctx: &RunContext, stats: RunStats) {
        tracing::info!(
            run_ts = %ctx.run_ts,
            source = ctx.source.as_deref().unwrap_or("-"),
            total_rows = stats.total_rows,
            valid_rows = stats.valid_rows,
            invalid_rows = stats.invalid_rows,
            duplicates_removed = stats.duplicates_removed,
            partitions = stats.partitions,
            "run succeeded"
        );
    }

    fn on_failure(&self, ctx: &RunContext, severity: RunSeverity, error: &GateError) {
        tracing::error!(
            run_ts = %ctx.run_ts,
            source = ctx.source.as_deref().unwrap_or("-"),
            ?severity,
            %error,
            "run failed"
        );
    }

    fn on_alert(&self, ctx: &RunContext, severity: RunSeverity, error: &GateError) {
        tracing::error!(
            run_ts = %ctx.run_ts,
            source = ctx.source.as_deref().unwrap_or("-"),
            ?severity,
            %error,
            alert = true,
            "run failed"
        );
    }
}

/// Appends run events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl RunObserver for FileObserver {
    fn on_success(&self, ctx: &RunContext, stats: RunStats) {
        self.append_line(&format!(
            "{} ok run_ts={} source={} total={} valid={} invalid={} dups={} partitions={}",
            Utc::now().to_rfc3339(),
            ctx.run_ts,
            ctx.source.as_deref().unwrap_or("-"),
            stats.total_rows,
            stats.valid_rows,
            stats.invalid_rows,
            stats.duplicates_removed,
            stats.partitions
        ));
    }

    fn on_failure(&self, ctx: &RunContext, severity: RunSeverity, error: &GateError) {
        self.append_line(&format!(
            "{} fail severity={:?} run_ts={} source={} err={}",
            Utc::now().to_rfc3339(),
            severity,
            ctx.run_ts,
            ctx.source.as_deref().unwrap_or("-"),
            error
        ));
    }

    fn on_alert(&self, ctx: &RunContext, severity: RunSeverity, error: &GateError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} run_ts={} source={} err={}",
            Utc::now().to_rfc3339(),
            severity,
            ctx.run_ts,
            ctx.source.as_deref().unwrap_or("-"),
            error
        ));
    }
}
