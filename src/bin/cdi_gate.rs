//! Command-line entry point: run the quality gate once against a local lake directory.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use cdi_quality_gate::logging::{init_logging, LoggingConfig};
use cdi_quality_gate::output::summary_json;
use cdi_quality_gate::run::{
    execute, run_timestamp, CompositeObserver, FileObserver, RunConfig, RunObserver, TracingObserver,
};
use cdi_quality_gate::storage::LocalStore;

#[derive(Debug, Parser)]
#[command(name = "cdi-gate", version, about = "Validate, quarantine, dedup and partition a raw CDI batch")]
struct Cli {
    /// Lake root directory; object names resolve below it.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// JSON run config; missing keys use the built-in CDI defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Process this raw object instead of the latest one under the raw prefix.
    #[arg(long)]
    raw: Option<String>,

    /// Append run events to this file.
    #[arg(long)]
    event_log: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&LoggingConfig::default().with_json_format(cli.json_logs)) {
        eprintln!("failed to initialise logging: {e}");
    }

    let mut config = match &cli.config {
        Some(path) => match RunConfig::from_json_path(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "could not load run config");
                return ExitCode::from(2);
            }
        },
        None => RunConfig::default(),
    };
    if let Some(raw) = cli.raw {
        config.raw_blob = Some(raw);
    }

    let mut observers: Vec<Arc<dyn RunObserver>> = vec![Arc::new(TracingObserver)];
    if let Some(path) = &cli.event_log {
        observers.push(Arc::new(FileObserver::new(path)));
    }
    let observer = CompositeObserver::new(observers);

    let store = LocalStore::new(&cli.root);
    let run_ts = run_timestamp(chrono::Utc::now());

    match execute(&store, &config, &run_ts, Some(&observer)) {
        Ok(report) => match summary_json(&report.summary) {
            Ok(bytes) => {
                println!("{}", String::from_utf8_lossy(&bytes));
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(error = %e, "could not encode summary");
                ExitCode::FAILURE
            }
        },
        // Already reported through the observer.
        Err(_) => ExitCode::FAILURE,
    }
}
