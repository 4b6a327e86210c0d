//! Getting raw records into typed form.
//!
//! - [`source`]: choose which raw object to process
//! - [`csv`]: read raw CSV into a [`crate::types::RawTable`]
//! - [`coerce`]: convert raw text into schema-typed [`crate::types::Value`]s

pub mod coerce;
pub mod csv;
pub mod source;

pub use coerce::{coerce, CoercedData, CoercionFailure, CoercionOptions};
pub use csv::{read_csv_from_bytes, read_csv_from_path, read_csv_from_reader};
pub use source::select_latest;
