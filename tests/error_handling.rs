//! End-to-end error propagation (spec.md §7): construction-time failures
//! fail fast, row-level failures leave the exporter usable, and a closed
//! exporter rejects further writes.

use sas7bdat_export::schema::{Format, Schema, Strictness, Variable, VariableKind};
use sas7bdat_export::value::Value;
use sas7bdat_export::{export_dataset, Error, Exporter};

fn numeric(name: &str) -> Variable {
    Variable::new(name, VariableKind::Numeric, 8, "", Format::unspecified(), Format::unspecified(), Strictness::Any)
        .unwrap()
}

fn character(name: &str, length: u16) -> Variable {
    Variable::new(
        name,
        VariableKind::Character,
        length,
        "",
        Format::unspecified(),
        Format::unspecified(),
        Strictness::Any,
    )
    .unwrap()
}

#[test]
fn empty_variable_list_is_rejected_at_construction() {
    let result = Schema::builder().name("T").build();
    assert!(matches!(result.unwrap_err(), Error::BadSchema { .. }));
}

#[test]
fn row_arity_mismatch_leaves_exporter_usable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.sas7bdat");
    let schema = Schema::builder().name("T").variable(numeric("A")).variable(numeric("B")).build().unwrap();

    let mut exporter = Exporter::new(&path, schema, 2).unwrap();
    let err = exporter.write_row(&[Value::from(1.0)]).unwrap_err();
    assert!(matches!(err, Error::Arity { expected: 2, actual: 1, .. }));

    exporter.write_row(&[Value::from(1.0), Value::from(2.0)]).unwrap();
    exporter.write_row(&[Value::from(3.0), Value::from(4.0)]).unwrap();
    assert!(exporter.is_complete());
    exporter.close().unwrap();
}

#[test]
fn character_value_exceeding_declared_length_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.sas7bdat");
    let schema = Schema::builder().name("T").variable(character("S", 2)).build().unwrap();

    let mut exporter = Exporter::new(&path, schema, 1).unwrap();
    let err = exporter.write_row(&[Value::from("abc")]).unwrap_err();
    assert!(matches!(err, Error::Truncation { actual: 3, limit: 2, .. }));
    exporter.write_row(&[Value::from("ab")]).unwrap();
    exporter.close().unwrap();
}

#[test]
fn wrong_value_kind_for_a_character_variable_is_a_type_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.sas7bdat");
    let schema = Schema::builder().name("T").variable(character("S", 4)).build().unwrap();

    let mut exporter = Exporter::new(&path, schema, 1).unwrap();
    let err = exporter.write_row(&[Value::from(1.0)]).unwrap_err();
    assert!(matches!(err, Error::Type { .. }));
}

#[test]
fn export_dataset_requires_matching_row_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.sas7bdat");
    let schema = Schema::builder().name("T").variable(numeric("A")).build().unwrap();
    export_dataset(&path, schema, &[vec![Value::from(1.0)], vec![Value::from(2.0)]]).unwrap();
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
}
