//! `cdi-quality-gate` is the data-quality gate between a raw ingestion area and a curated storage
//! area. It validates a batch of CSV health-indicator records against a declarative
//! [`types::Schema`], quarantines records that break a rule, removes exact duplicates, and
//! partitions the clean records by year.
//!
//! ## Pipeline
//!
//! Data flows strictly forward; every stage returns a new value and never mutates its input:
//!
//! 1. [`schema`]: parse the schema document (`{"fields": [{"name", "type", "required"}]}`)
//! 2. [`ingestion`]: read raw CSV text and coerce it to typed [`types::Value`]s
//! 3. [`validation`]: check required columns (fatal) and per-record rules (row-level)
//! 4. [`processing`]: deduplicate, split into clean/quarantine, partition the clean set
//! 5. [`report`]: aggregate the run into a [`report::RunSummary`]
//!
//! [`pipeline::QualityGate`] composes steps 2–5 and performs no I/O. [`run::execute`] wraps it
//! with storage access through a [`storage::ObjectStore`].
//!
//! ## Rules
//!
//! | code | fires when |
//! |------|------------|
//! | `required_field_null` | a required field is empty, a null marker, or unparsable as its numeric type |
//! | `year_out_of_range` | `YearStart`/`YearEnd` is below 1990 or above 2050 |
//! | `percent_out_of_range_or_null` | `DataValueUnit` is `%` and `DataValue` is missing, negative, or above 100 |
//!
//! Bounds and field names are configurable through [`pipeline::GateOptions`].
//!
//! ## Example
//!
//! ```rust
//! use cdi_quality_gate::ingestion::read_csv_from_bytes;
//! use cdi_quality_gate::pipeline::{GateOptions, QualityGate};
//! use cdi_quality_gate::schema::parse_schema_str;
//!
//! # fn main() -> Result<(), cdi_quality_gate::GateError> {
//! let schema = parse_schema_str(
//!     r#"{"fields": [
//!         {"name": "YearStart", "type": "integer", "required": true},
//!         {"name": "LocationAbbr", "type": "string", "required": true},
//!         {"name": "DataValue", "type": "float", "required": true},
//!         {"name": "DataValueUnit", "type": "string"}
//!     ]}"#,
//! )?;
//! let raw = read_csv_from_bytes(
//!     b"YearStart,LocationAbbr,DataValue,DataValueUnit\n\
//!       1995, us ,50,%\n\
//!       2060,US,50,%\n\
//!       1995,US,50,%\n",
//! )?;
//!
//! let outcome = QualityGate::new(schema, GateOptions::default()).run(&raw)?;
//! assert_eq!(outcome.duplicates_removed, 1);
//! assert_eq!(outcome.clean.row_count(), 1);
//! assert_eq!(outcome.quarantine.row_count(), 1);
//! assert_eq!(outcome.partitions[0].key.label(), "1995");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: schema, raw table and typed dataset types
//! - [`error`]: the crate-wide [`GateError`]
//! - [`storage`]: object storage boundary (local directory or in-memory)
//! - [`output`]: CSV/JSON encoding of results
//! - [`logging`]: `tracing` subscriber setup

pub mod error;
pub mod ingestion;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod processing;
pub mod report;
pub mod run;
pub mod schema;
pub mod storage;
pub mod types;
pub mod validation;

pub use error::{GateError, GateResult};
