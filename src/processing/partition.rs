//! Partitioning the clean set by a time attribute.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{GateError, GateResult};
use crate::types::{DataSet, Value};

/// Distinct value of the partition field.
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionKey {
    /// Numeric key (the usual case: a year).
    Number(f64),
    /// Text key, for partition columns the schema left as `string` that do not parse as numbers.
    Text(String),
}

impl PartitionKey {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Utf8(s) => Some(match value.as_f64() {
                Some(n) => Self::number(n),
                None => PartitionKey::Text(s.clone()),
            }),
            other => other.as_f64().map(Self::number),
        }
    }

    fn number(n: f64) -> Self {
        PartitionKey::Number(if n == 0.0 { 0.0 } else { n })
    }

    /// Label used in output names. Integral numbers print without a fraction (`1995.0` →
    /// `1995`), other numbers keep it (`1995.5`), so distinct keys never share a label.
    pub fn label(&self) -> String {
        match self {
            PartitionKey::Number(n) => n.to_string(),
            PartitionKey::Text(s) => s.clone(),
        }
    }

    /// Numbers before text; numbers by total order, text lexicographically.
    fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (PartitionKey::Number(a), PartitionKey::Number(b)) => a.total_cmp(b),
            (PartitionKey::Number(_), PartitionKey::Text(_)) => Ordering::Less,
            (PartitionKey::Text(_), PartitionKey::Number(_)) => Ordering::Greater,
            (PartitionKey::Text(a), PartitionKey::Text(b)) => a.cmp(b),
        }
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Clean records sharing one partition-key value.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionGroup {
    /// Shared value of the partition field.
    pub key: PartitionKey,
    /// The records, in their clean-set order.
    pub dataset: DataSet,
}

/// Group `clean` by the distinct non-null values of `field`, ascending.
///
/// Records with a null key are left out of every group. Fails with
/// [`GateError::MissingPartitionField`] if `field` is not a column of `clean`.
pub fn partition_by(clean: &DataSet, field: &str) -> GateResult<Vec<PartitionGroup>> {
    let idx = clean
        .column_index(field)
        .ok_or_else(|| GateError::MissingPartitionField {
            field: field.to_string(),
        })?;

    let mut keyed: Vec<(PartitionKey, usize)> = clean
        .rows
        .iter()
        .enumerate()
        .filter_map(|(row_idx, row)| row.get(idx).and_then(PartitionKey::of).map(|k| (k, row_idx)))
        .collect();
    // Stable: rows keep their relative order inside a group.
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut groups: Vec<PartitionGroup> = Vec::new();
    let mut current: Option<(PartitionKey, Vec<usize>)> = None;
    for (key, row_idx) in keyed {
        match current.as_mut() {
            Some((k, rows)) if k.total_cmp(&key) == Ordering::Equal => rows.push(row_idx),
            _ => {
                if let Some((k, rows)) = current.take() {
                    groups.push(PartitionGroup {
                        key: k,
                        dataset: clean.select_rows(&rows),
                    });
                }
                current = Some((key, vec![row_idx]));
            }
        }
    }
    if let Some((k, rows)) = current {
        groups.push(PartitionGroup {
            key: k,
            dataset: clean.select_rows(&rows),
        });
    }

    tracing::debug!(field, partitions = groups.len(), "partitioned clean records");
    Ok(groups)
}
