//! Schema document loading.
//!
//! The schema document is JSON of the form:
//!
//! ```json
//! {"fields": [{"name": "YearStart", "type": "integer", "required": true}, ...]}
//! ```
//!
//! `type` must be one of `string`, `integer`, `float`; `required` defaults to `false`. Unknown
//! type tags, missing `name`/`type`, and duplicate names are all rejected at load time with
//! [`GateError::SchemaFormat`].

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{GateError, GateResult};
use crate::types::{DataType, Field, Schema};

#[derive(Debug, Deserialize)]
struct SchemaDocument {
    fields: Vec<FieldDocument>,
}

#[derive(Debug, Deserialize)]
struct FieldDocument {
    name: String,
    #[serde(rename = "type")]
    data_type: DataType,
    #[serde(default)]
    required: bool,
}

/// Parse a schema document from raw bytes.
pub fn parse_schema(input: &[u8]) -> GateResult<Schema> {
    let doc: SchemaDocument =
        serde_json::from_slice(input).map_err(|e| GateError::SchemaFormat {
            message: e.to_string(),
        })?;

    let mut seen = HashSet::with_capacity(doc.fields.len());
    let mut fields = Vec::with_capacity(doc.fields.len());
    for (idx, f) in doc.fields.into_iter().enumerate() {
        if f.name.trim().is_empty() {
            return Err(GateError::SchemaFormat {
                message: format!("field #{idx} has an empty name"),
            });
        }
        if !seen.insert(f.name.clone()) {
            return Err(GateError::SchemaFormat {
                message: format!("duplicate field name '{}'", f.name),
            });
        }
        fields.push(Field {
            name: f.name,
            data_type: f.data_type,
            required: f.required,
        });
    }

    Ok(Schema::new(fields))
}

/// Parse a schema document from a string.
pub fn parse_schema_str(input: &str) -> GateResult<Schema> {
    parse_schema(input.as_bytes())
}

/// Load a schema document from a local file.
pub fn load_schema_from_path(path: impl AsRef<Path>) -> GateResult<Schema> {
    let bytes = fs::read(path)?;
    parse_schema(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fields_in_order_with_required_default() {
        let schema = parse_schema_str(
            r#"{"fields": [
                {"name": "YearStart", "type": "integer", "required": true},
                {"name": "DataValue", "type": "float"},
                {"name": "Topic", "type": "string", "required": false, "description": "ignored"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(
            schema.fields,
            vec![
                Field::required("YearStart", DataType::Integer),
                Field::new("DataValue", DataType::Float),
                Field::new("Topic", DataType::String),
            ]
        );
    }

    #[test]
    fn rejects_missing_type() {
        let err = parse_schema_str(r#"{"fields": [{"name": "YearStart"}]}"#).unwrap_err();
        assert!(matches!(err, GateError::SchemaFormat { .. }));
        assert!(err.to_string().contains("type"));
    }

    #[test]
    fn rejects_missing_name() {
        let err = parse_schema_str(r#"{"fields": [{"type": "string"}]}"#).unwrap_err();
        assert!(matches!(err, GateError::SchemaFormat { .. }));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn rejects_unknown_type_tag() {
        let err =
            parse_schema_str(r#"{"fields": [{"name": "When", "type": "date"}]}"#).unwrap_err();
        assert!(matches!(err, GateError::SchemaFormat { .. }));
        assert!(err.to_string().contains("date"));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = parse_schema_str(
            r#"{"fields": [{"name": "A", "type": "string"}, {"name": "A", "type": "float"}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate field name 'A'"));
    }

    #[test]
    fn rejects_document_without_fields() {
        let err = parse_schema_str(r#"{"columns": []}"#).unwrap_err();
        assert!(matches!(err, GateError::SchemaFormat { .. }));
    }
}
