//! Core data model types.
//!
//! A [`Schema`] is a list of typed [`Field`]s loaded from a schema document. Raw CSV input is read
//! into a [`RawTable`] (all text), then coerced into a [`DataSet`] of typed [`Value`]s.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared type of a schema field.
///
/// Schema documents spell these `"string"`, `"integer"` and `"float"`; any other tag is rejected
/// when the schema is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Free text.
    String,
    /// Whole number.
    Integer,
    /// Floating point number.
    Float,
}

impl DataType {
    /// `true` for [`DataType::Integer`] and [`DataType::Float`].
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Declared type.
    pub data_type: DataType,
    /// Whether the field must be present as a column and non-null in every record.
    pub required: bool,
}

impl Field {
    /// Create an optional field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            required: false,
        }
    }

    /// Create a required field.
    pub fn required(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            required: true,
            ..Self::new(name, data_type)
        }
    }
}

/// Ordered list of fields, keyed by unique name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    ///
    /// Uniqueness of names is checked by [`crate::schema::parse_schema`]; callers building a
    /// schema by hand are trusted.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of all required fields, in schema order.
    pub fn required_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.clone())
            .collect()
    }

    /// Names of all integer/float fields, in schema order.
    pub fn numeric_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.data_type.is_numeric())
            .map(|f| f.name.clone())
            .collect()
    }
}

/// Raw CSV input: a header row and textual cells, before any coercion.
///
/// Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    /// Column names from the header row.
    pub headers: Vec<String>,
    /// Row-major textual cells.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Create a raw table from headers and rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// A single typed cell in a [`DataSet`].
///
/// Coercion failures are stored as [`Value::Null`], so downstream rules cannot tell them apart
/// from missing values.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing, empty, or unparsable value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// UTF-8 string (already trimmed).
    Utf8(String),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value.
    ///
    /// Text cells are parsed on the fly, so rules keyed on a column the schema left as `string`
    /// still see numbers. `None` means null or unparsable.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) if v.is_nan() => None,
            Value::Float64(v) => Some(*v),
            Value::Utf8(s) => s.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
        }
    }

    /// Text view of the value (`None` unless [`Value::Utf8`]).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// Renders the value as a CSV cell; null is the empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Utf8(s) => f.write_str(s),
        }
    }
}

/// In-memory tabular dataset of coerced records.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as `columns`. A record's position in
/// `rows` is its ordinal for the current stage; each stage returns a new dataset rather than
/// mutating its input.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Column names, in input order.
    pub columns: Vec<String>,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from columns and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// `true` when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the index of a column by name, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The predicate receives the row ordinal and its values. Columns are preserved.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(usize, &[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .enumerate()
            .filter(|(idx, row)| predicate(*idx, row.as_slice()))
            .map(|(_, row)| row.clone())
            .collect();
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Create a new dataset holding the rows at `indices`, in the given order.
    ///
    /// Out-of-range indices are skipped.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let rows = indices
            .iter()
            .filter_map(|&i| self.rows.get(i).cloned())
            .collect();
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }
}
