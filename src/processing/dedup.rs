//! Exact-duplicate removal on a composite key.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{DataSet, Value};

/// Composite key used to detect duplicates: the key fields plus the primary value field.
///
/// Only fields present in the dataset take part. If none of `key_fields` is present,
/// deduplication is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupKey {
    /// Identifying fields of a record.
    pub key_fields: Vec<String>,
    /// Measured value compared alongside the key fields.
    pub value_field: String,
}

impl Default for DedupKey {
    fn default() -> Self {
        Self {
            key_fields: [
                "YearStart",
                "LocationAbbr",
                "Topic",
                "Question",
                "StratificationCategory1",
                "Stratification1",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            value_field: "DataValue".to_string(),
        }
    }
}

impl DedupKey {
    /// Column indices forming the key for `dataset`, or `None` when no key field is present.
    pub fn resolve(&self, dataset: &DataSet) -> Option<Vec<usize>> {
        let mut idxs: Vec<usize> = self
            .key_fields
            .iter()
            .filter_map(|name| dataset.column_index(name))
            .collect();
        if idxs.is_empty() {
            return None;
        }
        if let Some(value_idx) = dataset.column_index(&self.value_field) {
            if !idxs.contains(&value_idx) {
                idxs.push(value_idx);
            }
        }
        Some(idxs)
    }

    /// Names of the key columns that take part for `dataset`.
    pub fn present_fields(&self, dataset: &DataSet) -> Vec<String> {
        self.resolve(dataset)
            .unwrap_or_default()
            .into_iter()
            .map(|i| dataset.columns[i].clone())
            .collect()
    }
}

/// Result of [`deduplicate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Deduplicated {
    /// Surviving records, in original order.
    pub dataset: DataSet,
    /// Input ordinals of the surviving records.
    pub kept: Vec<usize>,
    /// Number of records dropped.
    pub removed: usize,
}

/// Hashable projection of a cell. Nulls compare equal to each other and numbers compare by
/// value, so `Int64(50)` and `Float64(50.0)` collide.
#[derive(Debug, PartialEq, Eq, Hash)]
enum KeyPart<'a> {
    Null,
    Number(u64),
    Text(&'a str),
}

impl<'a> KeyPart<'a> {
    fn of(value: &'a Value) -> Self {
        match value {
            Value::Null => KeyPart::Null,
            Value::Int64(v) => Self::number(*v as f64),
            Value::Float64(v) if v.is_nan() => KeyPart::Null,
            Value::Float64(v) => Self::number(*v),
            Value::Utf8(s) => KeyPart::Text(s.as_str()),
        }
    }

    fn number(v: f64) -> Self {
        // -0.0 and 0.0 are the same value.
        let v = if v == 0.0 { 0.0 } else { v };
        KeyPart::Number(v.to_bits())
    }
}

/// Input ordinals of the first occurrence of every distinct key, or `None` if deduplication is
/// skipped because no key field is present.
pub fn unique_indices(dataset: &DataSet, key: &DedupKey) -> Option<Vec<usize>> {
    let idxs = key.resolve(dataset)?;
    let mut seen: HashSet<Vec<KeyPart<'_>>> = HashSet::with_capacity(dataset.row_count());
    let kept = dataset
        .rows
        .iter()
        .enumerate()
        .filter(|&(_, row)| {
            let k: Vec<KeyPart<'_>> = idxs
                .iter()
                .map(|&i| row.get(i).map(KeyPart::of).unwrap_or(KeyPart::Null))
                .collect();
            seen.insert(k)
        })
        .map(|(i, _)| i)
        .collect();
    Some(kept)
}

/// Drop exact duplicates under `key`, keeping the first-seen record of each group.
pub fn deduplicate(dataset: &DataSet, key: &DedupKey) -> Deduplicated {
    match unique_indices(dataset, key) {
        Some(kept) => {
            let removed = dataset.row_count() - kept.len();
            tracing::info!(
                removed,
                key_fields = ?key.present_fields(dataset),
                "removed exact duplicate rows"
            );
            Deduplicated {
                dataset: dataset.select_rows(&kept),
                kept,
                removed,
            }
        }
        None => {
            tracing::debug!("no key fields present; skipping deduplication");
            Deduplicated {
                dataset: dataset.clone(),
                kept: (0..dataset.row_count()).collect(),
                removed: 0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> DedupKey {
        DedupKey {
            key_fields: vec!["Year".to_string(), "Loc".to_string()],
            value_field: "Value".to_string(),
        }
    }

    fn ds(rows: Vec<Vec<Value>>) -> DataSet {
        DataSet::new(
            vec!["Year".to_string(), "Loc".to_string(), "Value".to_string(), "Note".to_string()],
            rows,
        )
    }

    fn r(year: i64, loc: &str, value: Value, note: &str) -> Vec<Value> {
        vec![
            Value::Int64(year),
            Value::Utf8(loc.to_string()),
            value,
            Value::Utf8(note.to_string()),
        ]
    }

    #[test]
    fn keeps_first_seen_and_ignores_non_key_columns() {
        let input = ds(vec![
            r(1995, "US", Value::Float64(50.0), "first"),
            r(2001, "US", Value::Float64(50.0), "other year"),
            r(1995, "US", Value::Float64(50.0), "second"),
        ]);
        let out = deduplicate(&input, &key());
        assert_eq!(out.removed, 1);
        assert_eq!(out.kept, vec![0, 1]);
        assert_eq!(out.dataset.rows[0][3], Value::Utf8("first".to_string()));
    }

    #[test]
    fn null_values_are_equal_for_dedup() {
        let input = ds(vec![r(1995, "US", Value::Null, "a"), r(1995, "US", Value::Null, "b")]);
        assert_eq!(deduplicate(&input, &key()).removed, 1);
    }

    #[test]
    fn numbers_compare_by_value_across_representations() {
        let input = ds(vec![r(1995, "US", Value::Int64(50), "a"), r(1995, "US", Value::Float64(50.0), "b")]);
        assert_eq!(deduplicate(&input, &key()).removed, 1);
    }

    #[test]
    fn different_values_are_not_duplicates() {
        let input = ds(vec![
            r(1995, "US", Value::Float64(50.0), "a"),
            r(1995, "US", Value::Float64(50.5), "b"),
        ]);
        assert_eq!(deduplicate(&input, &key()).removed, 0);
    }

    #[test]
    fn skipped_when_no_key_field_present() {
        let input = DataSet::new(
            vec!["Value".to_string()],
            vec![vec![Value::Int64(1)], vec![Value::Int64(1)]],
        );
        assert_eq!(unique_indices(&input, &key()), None);
        let out = deduplicate(&input, &key());
        assert_eq!(out.removed, 0);
        assert_eq!(out.dataset, input);
    }

    #[test]
    fn value_field_is_optional_in_the_key() {
        let input = DataSet::new(
            vec!["Year".to_string()],
            vec![vec![Value::Int64(1)], vec![Value::Int64(1)], vec![Value::Int64(2)]],
        );
        assert_eq!(deduplicate(&input, &key()).kept, vec![0, 2]);
    }

    #[test]
    fn deduplication_is_idempotent() {
        let input = ds(vec![
            r(1995, "US", Value::Float64(1.0), "a"),
            r(1995, "US", Value::Float64(1.0), "b"),
            r(1996, "CA", Value::Null, "c"),
            r(1996, "CA", Value::Null, "d"),
        ]);
        let once = deduplicate(&input, &key());
        let twice = deduplicate(&once.dataset, &key());
        assert_eq!(once.removed, 2);
        assert_eq!(twice.removed, 0);
        assert_eq!(twice.dataset, once.dataset);
    }
}
