use cdi_quality_gate::ingestion::{read_csv_from_bytes, read_csv_from_path};
use cdi_quality_gate::pipeline::{GateOptions, QualityGate};
use cdi_quality_gate::processing::{DedupKey, ERROR_REASON_COLUMN};
use cdi_quality_gate::schema::{load_schema_from_path, parse_schema_str};
use cdi_quality_gate::types::{DataSet, Value};
use cdi_quality_gate::validation::RuleSet;
use cdi_quality_gate::GateError;

fn fixture_gate() -> QualityGate {
    let schema = load_schema_from_path("tests/fixtures/cdi_schema.json").unwrap();
    QualityGate::new(schema, GateOptions::default())
}

/// Options for the short `Year/Loc/Value/Unit` layout.
fn short_options() -> GateOptions {
    GateOptions {
        coercion: cdi_quality_gate::ingestion::CoercionOptions {
            location_field: Some("Loc".to_string()),
            ..Default::default()
        },
        rules: RuleSet {
            year_fields: vec!["Year".to_string()],
            percent_value_field: "Value".to_string(),
            percent_unit_field: "Unit".to_string(),
            ..Default::default()
        },
        dedup: DedupKey {
            key_fields: vec!["Year".to_string(), "Loc".to_string()],
            value_field: "Value".to_string(),
        },
        partition_field: "Year".to_string(),
    }
}

fn short_gate() -> QualityGate {
    let schema = parse_schema_str(
        r#"{"fields": [
            {"name": "Year", "type": "integer", "required": true},
            {"name": "Loc", "type": "string", "required": true},
            {"name": "Value", "type": "float", "required": true},
            {"name": "Unit", "type": "string"}
        ]}"#,
    )
    .unwrap();
    QualityGate::new(schema, short_options())
}

fn annotation(quarantine: &DataSet, row: usize) -> String {
    let idx = quarantine.column_index(ERROR_REASON_COLUMN).unwrap();
    quarantine.rows[row][idx].to_string()
}

#[test]
fn three_row_scenario_dedups_quarantines_and_partitions() {
    let raw = read_csv_from_bytes(b"Year,Loc,Value,Unit\n1995, us ,50,%\n2060,US,50,%\n1995,US,50,%\n")
        .unwrap();
    let out = short_gate().run(&raw).unwrap();

    assert_eq!(out.duplicates_removed, 1);
    assert_eq!(out.total_rows(), 2);

    assert_eq!(out.clean.row_count(), 1);
    assert_eq!(out.clean.rows[0][0], Value::Int64(1995));
    assert_eq!(out.clean.rows[0][1], Value::Utf8("US".to_string()));

    assert_eq!(out.partitions.len(), 1);
    assert_eq!(out.partitions[0].key.label(), "1995");
    assert_eq!(out.partitions[0].dataset.row_count(), 1);

    assert_eq!(out.quarantine.row_count(), 1);
    assert_eq!(out.quarantine.rows[0][0], Value::Int64(2060));
    assert_eq!(annotation(&out.quarantine, 0), "year_out_of_range");

    let summary = out.summary("20250101T000000Z", "raw/short.csv");
    assert_eq!((summary.total_rows, summary.valid_rows, summary.invalid_rows), (2, 1, 1));
}

#[test]
fn fixture_batch_routes_every_record() {
    let raw = read_csv_from_path("tests/fixtures/cdi_sample.csv").unwrap();
    let out = fixture_gate().run(&raw).unwrap();

    assert_eq!(out.input_rows, 10);
    assert_eq!(out.duplicates_removed, 1);
    assert_eq!(out.clean.row_count(), 4);
    assert_eq!(out.quarantine.row_count(), 5);
    assert_eq!(out.clean.row_count() + out.quarantine.row_count(), out.total_rows());

    let reasons: Vec<String> = (0..out.quarantine.row_count())
        .map(|i| annotation(&out.quarantine, i))
        .collect();
    assert_eq!(
        reasons,
        vec![
            "year_out_of_range;year_out_of_range",
            "required_field_null",
            "percent_out_of_range_or_null",
            "percent_out_of_range_or_null",
            "year_out_of_range",
        ]
    );

    let labels: Vec<String> = out.partitions.iter().map(|p| p.key.label()).collect();
    assert_eq!(labels, vec!["2019", "2020", "2021"]);
    let sizes: Vec<usize> = out.partitions.iter().map(|p| p.dataset.row_count()).collect();
    assert_eq!(sizes, vec![1, 1, 2]);

    // Clean output carries only the original columns.
    assert_eq!(out.clean.columns, raw.headers);
    assert_eq!(out.quarantine.columns.len(), raw.headers.len() + 1);
}

#[test]
fn clean_and_quarantine_are_disjoint_by_content() {
    let raw = read_csv_from_path("tests/fixtures/cdi_sample.csv").unwrap();
    let out = fixture_gate().run(&raw).unwrap();
    for q in &out.quarantine.rows {
        let body = &q[..q.len() - 1];
        assert!(out.clean.rows.iter().all(|c| c.as_slice() != body));
    }
}

#[test]
fn required_null_is_quarantined_whatever_else_is_wrong() {
    let raw = read_csv_from_bytes(b"Year,Loc,Value,Unit\n2099,,500,%\n2000,,1,cases\n").unwrap();
    let out = short_gate().run(&raw).unwrap();
    assert_eq!(out.clean.row_count(), 0);
    assert_eq!(annotation(&out.quarantine, 0), "required_field_null;year_out_of_range;percent_out_of_range_or_null");
    assert_eq!(annotation(&out.quarantine, 1), "required_field_null");
}

#[test]
fn year_boundaries() {
    let raw = read_csv_from_bytes(
        b"Year,Loc,Value,Unit\n1990,A,1,x\n2050,B,1,x\n1989,C,1,x\n2051,D,1,x\n",
    )
    .unwrap();
    let out = short_gate().run(&raw).unwrap();
    let clean_years: Vec<Value> = out.clean.rows.iter().map(|r| r[0].clone()).collect();
    assert_eq!(clean_years, vec![Value::Int64(1990), Value::Int64(2050)]);
    assert_eq!(out.quarantine.row_count(), 2);
    assert_eq!(annotation(&out.quarantine, 0), "year_out_of_range");
    assert_eq!(annotation(&out.quarantine, 1), "year_out_of_range");
}

#[test]
fn percent_boundaries_and_unit_exemption() {
    // Value is optional here so a null value reaches the percent rule on its own.
    let schema = parse_schema_str(
        r#"{"fields": [
            {"name": "Year", "type": "integer", "required": true},
            {"name": "Loc", "type": "string", "required": true},
            {"name": "Value", "type": "float"},
            {"name": "Unit", "type": "string"}
        ]}"#,
    )
    .unwrap();
    let gate = QualityGate::new(schema, short_options());
    let raw = read_csv_from_bytes(
        b"Year,Loc,Value,Unit\n\
          2000,A,0,%\n\
          2000,B,100,%\n\
          2000,C,-0.01,%\n\
          2000,D,100.01,%\n\
          2000,E,,%\n\
          2000,F,,per 100k\n",
    )
    .unwrap();
    let out = gate.run(&raw).unwrap();

    let clean_locs: Vec<String> = out.clean.rows.iter().map(|r| r[1].to_string()).collect();
    assert_eq!(clean_locs, vec!["A", "B", "F"]);
    let bad_locs: Vec<String> = out.quarantine.rows.iter().map(|r| r[1].to_string()).collect();
    assert_eq!(bad_locs, vec!["C", "D", "E"]);
    for i in 0..3 {
        assert_eq!(annotation(&out.quarantine, i), "percent_out_of_range_or_null");
    }
}

#[test]
fn missing_required_column_is_fatal_and_names_it() {
    let raw = read_csv_from_bytes(b"Year,Value,Unit\n2000,1,%\n").unwrap();
    let err = short_gate().run(&raw).unwrap_err();
    match &err {
        GateError::MissingColumns { columns } => assert_eq!(columns, &vec!["Loc".to_string()]),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("Loc"));
}

#[test]
fn duplicate_across_clean_and_quarantine_keeps_first() {
    // Same key and value; the first copy is invalid (bad YearEnd), so the valid copy is dropped too.
    let raw = read_csv_from_bytes(
        b"YearStart,YearEnd,LocationAbbr,Topic,Question,DataValue\n\
          2001,2070,CA,Asthma,Q,5\n\
          2001,2001,CA,Asthma,Q,5\n",
    )
    .unwrap();
    let schema = parse_schema_str(
        r#"{"fields": [
            {"name": "YearStart", "type": "integer", "required": true},
            {"name": "YearEnd", "type": "integer"},
            {"name": "DataValue", "type": "float"}
        ]}"#,
    )
    .unwrap();
    let out = QualityGate::new(schema, GateOptions::default()).run(&raw).unwrap();
    assert_eq!(out.duplicates_removed, 1);
    assert_eq!(out.clean.row_count(), 0);
    assert_eq!(out.quarantine.row_count(), 1);
    assert!(out.partitions.is_empty());
}
