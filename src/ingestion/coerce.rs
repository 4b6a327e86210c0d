//! Type coercion: raw text cells into schema-typed [`Value`]s.

use serde::{Deserialize, Serialize};

use crate::types::{DataSet, DataType, RawTable, Schema, Value};

/// Options controlling text normalization and null detection during coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoercionOptions {
    /// Column whose text values are upper-cased after trimming (e.g. state abbreviations).
    pub location_field: Option<String>,
    /// Trimmed cell contents treated as missing, compared case-sensitively.
    ///
    /// The empty string is always treated as missing, whether listed or not.
    pub null_markers: Vec<String>,
}

impl Default for CoercionOptions {
    fn default() -> Self {
        Self {
            location_field: Some("LocationAbbr".to_string()),
            null_markers: ["", "NA", "N/A", "n/a", "NULL", "null", "NaN", "nan", "None", "<NA>", "#N/A"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

/// A numeric cell whose non-empty text could not be parsed.
///
/// The cell itself is stored as [`Value::Null`]; this record exists only for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionFailure {
    /// Row ordinal in the input batch.
    pub row: usize,
    /// Column name.
    pub column: String,
    /// Original cell text.
    pub raw: String,
}

/// Output of [`coerce`].
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedData {
    /// Typed records, same row order and columns as the raw table.
    pub dataset: DataSet,
    /// Numeric cells that failed to parse, in row-major order.
    pub failures: Vec<CoercionFailure>,
}

/// Coerce every cell of `raw` according to the type declared in `schema`.
///
/// - Columns declared `integer`/`float` are parsed as numbers; unparsable text becomes
///   [`Value::Null`] and is listed in [`CoercedData::failures`].
/// - All other columns (including columns the schema does not mention) are trimmed text; the
///   configured location column is also upper-cased.
/// - Null markers become [`Value::Null`] in every column.
///
/// Never fails: bad values are routed to validation, not raised.
pub fn coerce(raw: &RawTable, schema: &Schema, options: &CoercionOptions) -> CoercedData {
    let column_types: Vec<DataType> = raw
        .headers
        .iter()
        .map(|h| schema.field(h).map(|f| f.data_type).unwrap_or(DataType::String))
        .collect();
    let upper_idx = options
        .location_field
        .as_deref()
        .and_then(|name| raw.headers.iter().position(|h| h == name));

    let mut failures = Vec::new();
    let rows = raw
        .rows
        .iter()
        .enumerate()
        .map(|(row_idx, cells)| {
            cells
                .iter()
                .zip(column_types.iter())
                .enumerate()
                .map(|(col_idx, (cell, data_type))| {
                    let trimmed = cell.trim();
                    if is_null_marker(trimmed, options) {
                        return Value::Null;
                    }
                    match data_type {
                        DataType::String if Some(col_idx) == upper_idx => {
                            Value::Utf8(trimmed.to_uppercase())
                        }
                        DataType::String => Value::Utf8(trimmed.to_owned()),
                        DataType::Integer | DataType::Float => {
                            match parse_number(trimmed, *data_type) {
                                Some(v) => v,
                                None => {
                                    failures.push(CoercionFailure {
                                        row: row_idx,
                                        column: raw.headers[col_idx].clone(),
                                        raw: cell.clone(),
                                    });
                                    Value::Null
                                }
                            }
                        }
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    if !failures.is_empty() {
        tracing::debug!(count = failures.len(), "numeric cells failed coercion and were nulled");
    }

    CoercedData {
        dataset: DataSet::new(raw.headers.clone(), rows),
        failures,
    }
}

fn is_null_marker(trimmed: &str, options: &CoercionOptions) -> bool {
    trimmed.is_empty() || options.null_markers.iter().any(|m| m == trimmed)
}

/// Integers stay integral when they can; anything else numeric becomes a float. NaN is treated as
/// a failure so it cannot masquerade as a present value.
fn parse_number(trimmed: &str, data_type: DataType) -> Option<Value> {
    if data_type == DataType::Integer {
        if let Ok(v) = trimmed.parse::<i64>() {
            return Some(Value::Int64(v));
        }
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan())
        .map(Value::Float64)
}
