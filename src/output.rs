//! Output encoding: datasets to CSV, summaries to JSON.

use std::io::Write;

use crate::error::GateResult;
use crate::report::RunSummary;
use crate::types::DataSet;

/// Write `dataset` as CSV (header row first, nulls as empty cells).
pub fn write_csv<W: Write>(dataset: &DataSet, writer: W) -> GateResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&dataset.columns)?;
    for row in &dataset.rows {
        wtr.write_record(row.iter().map(|v| v.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Encode `dataset` as CSV bytes.
pub fn csv_bytes(dataset: &DataSet) -> GateResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(dataset, &mut buf)?;
    Ok(buf)
}

/// Encode a run summary as pretty-printed JSON.
pub fn summary_json(summary: &RunSummary) -> GateResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(summary)?)
}
