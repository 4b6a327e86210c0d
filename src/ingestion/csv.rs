//! Raw CSV reading.

use std::collections::HashSet;
use std::path::Path;

use crate::error::{GateError, GateResult};
use crate::types::RawTable;

/// Read a CSV file into a [`RawTable`].
///
/// Rules:
///
/// - CSV must have headers, and header names must be unique.
/// - All cells stay textual; coercion happens later against the schema.
/// - Short rows are padded with empty cells; extra trailing cells are dropped.
pub fn read_csv_from_path(path: impl AsRef<Path>) -> GateResult<RawTable> {
    let mut rdr = reader_builder().from_path(path)?;
    read_csv_from_reader(&mut rdr)
}

/// Read CSV from an in-memory byte buffer.
pub fn read_csv_from_bytes(input: &[u8]) -> GateResult<RawTable> {
    let mut rdr = reader_builder().from_reader(input);
    read_csv_from_reader(&mut rdr)
}

/// Read CSV data from an existing CSV reader.
///
/// The reader should be built with `has_headers(true)`; building it with `flexible(true)` lets
/// ragged rows through to be padded instead of failing.
pub fn read_csv_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> GateResult<RawTable> {
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_owned()).collect();

    let mut seen = HashSet::with_capacity(headers.len());
    for h in &headers {
        if !seen.insert(h.as_str()) {
            return Err(GateError::Config {
                message: format!("duplicate column '{h}' in csv header. headers={headers:?}"),
            });
        }
    }

    let width = headers.len();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let mut row: Vec<String> = record.iter().take(width).map(str::to_owned).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(RawTable::new(headers, rows))
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).flexible(true);
    builder
}
