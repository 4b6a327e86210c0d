//! Rule evaluation over a coerced [`DataSet`].

use crate::error::{GateError, GateResult};
use crate::types::{DataSet, Schema, Value};

use super::rules::RuleSet;
use super::violation::{Violation, ViolationReason};

/// Fail with [`GateError::MissingColumns`] naming every required field absent from `columns`.
pub fn check_required_columns(columns: &[String], schema: &Schema) -> GateResult<()> {
    let missing: Vec<String> = schema
        .required_fields()
        .into_iter()
        .filter(|name| !columns.iter().any(|c| c == name))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(GateError::MissingColumns { columns: missing })
    }
}

/// Evaluate every rule against every record and return all violations.
///
/// Rules, in order:
///
/// 1. every required field must exist as a column (fatal, see [`check_required_columns`])
/// 2. required fields must be non-null in each record
/// 3. year fields, when present, must lie within the configured bounds; missing years pass
/// 4. when both value and unit fields are present, records whose unit is the percent literal
///    must carry a value within the percent bounds; other units are exempt
///
/// Violations are listed record by record, and within a record in rule order.
pub fn validate(dataset: &DataSet, schema: &Schema, rules: &RuleSet) -> GateResult<Vec<Violation>> {
    check_required_columns(&dataset.columns, schema)?;

    let required: Vec<(String, usize)> = schema
        .required_fields()
        .into_iter()
        .filter_map(|name| dataset.column_index(&name).map(|idx| (name, idx)))
        .collect();
    let years: Vec<(&str, usize)> = rules
        .year_fields
        .iter()
        .filter_map(|name| dataset.column_index(name).map(|idx| (name.as_str(), idx)))
        .collect();
    let percent = dataset
        .column_index(&rules.percent_value_field)
        .zip(dataset.column_index(&rules.percent_unit_field));

    let mut violations = Vec::new();
    for (row_idx, row) in dataset.rows.iter().enumerate() {
        for (name, idx) in &required {
            if row.get(*idx).is_none_or(Value::is_null) {
                violations.push(Violation::new(row_idx, name.as_str(), ViolationReason::RequiredFieldNull));
            }
        }

        for (name, idx) in &years {
            let year = row.get(*idx).and_then(Value::as_f64);
            if year.is_some_and(|y| rules.year_out_of_range(y)) {
                violations.push(Violation::new(row_idx, *name, ViolationReason::YearOutOfRange));
            }
        }

        if let Some((value_idx, unit_idx)) = percent {
            let unit = row.get(unit_idx).and_then(Value::as_str);
            if unit == Some(rules.percent_unit.as_str()) {
                let value = row.get(value_idx).and_then(Value::as_f64);
                if rules.percent_invalid(value) {
                    violations.push(Violation::new(
                        row_idx,
                        rules.percent_value_field.as_str(),
                        ViolationReason::PercentOutOfRangeOrNull,
                    ));
                }
            }
        }
    }

    tracing::debug!(
        rows = dataset.row_count(),
        violations = violations.len(),
        "validated records"
    );
    Ok(violations)
}
