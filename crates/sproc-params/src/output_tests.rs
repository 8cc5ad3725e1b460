//! Tests for output value resolution

use crate::ParameterBinder;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sproc_core::{ProcError, Value};

#[test]
fn test_output_read_before_execution_fails_fast() {
    let mut binder = ParameterBinder::new();
    let total = binder.add_output::<i64>("total", None).unwrap();
    let collection = binder.finish();

    collection.set_value("total", Value::Int64(7)).unwrap();
    assert!(matches!(total.value(), Err(ProcError::NotExecuted(name)) if name == "total"));

    collection.mark_executed();
    assert_eq!(total.value().unwrap(), 7);
}

#[test]
fn test_nullable_output_over_null_is_absent() {
    let mut binder = ParameterBinder::new();
    let nullable = binder.add_output::<Option<i32>>("nullable", None).unwrap();
    let collection = binder.finish();
    collection.set_value("nullable", Value::Null).unwrap();
    collection.mark_executed();

    assert_eq!(nullable.value().unwrap(), None);
}

#[test]
fn test_non_nullable_output_over_null_fails() {
    let mut binder = ParameterBinder::new();
    let strict = binder.add_output::<i32>("nullable", None).unwrap();
    let collection = binder.finish();
    collection.mark_executed();

    let err = strict.value().unwrap_err();
    assert!(matches!(err, ProcError::NullCoercion { parameter } if parameter == "nullable"));
}

#[test]
fn test_text_output_over_null_needs_option() {
    let mut binder = ParameterBinder::new();
    let strict = binder.add_output::<String>("label", Some(255)).unwrap();
    let lenient = binder.add_output::<Option<String>>("label2", Some(255)).unwrap();
    let collection = binder.finish();
    collection.mark_executed();

    assert!(matches!(strict.value(), Err(ProcError::NullCoercion { .. })));
    assert_eq!(lenient.value().unwrap(), None);
}

#[test]
fn test_nullable_output_unwraps_converts_rewraps() {
    let mut binder = ParameterBinder::new();
    let widened = binder.add_output::<Option<i64>>("count", None).unwrap();
    let collection = binder.finish();
    collection.set_value("@count", Value::Int32(42)).unwrap();
    collection.mark_executed();

    assert_eq!(widened.value().unwrap(), Some(42));
}

#[test]
fn test_output_conversion_failure() {
    let mut binder = ParameterBinder::new();
    let date = binder.add_output::<NaiveDate>("created", None).unwrap();
    let collection = binder.finish();
    collection.set_value("created", Value::Bool(true)).unwrap();
    collection.mark_executed();

    assert!(matches!(date.value(), Err(ProcError::Conversion(_))));
}

#[test]
fn test_return_value_and_input_output() {
    let mut binder = ParameterBinder::new();
    binder.add_input_typed("boolean_to_return", true).unwrap();
    let status = binder.add_return_value::<bool>().unwrap();
    let counter = binder.add_input_output::<i32>("counter", 2, None).unwrap();
    let collection = binder.finish();

    assert_eq!(counter.raw(), Value::Int32(2));

    collection.set_value("RETURN_VALUE", Value::Int32(1)).unwrap();
    collection.set_value("counter", Value::Int32(7)).unwrap();
    collection.mark_executed();

    assert!(status.value().unwrap());
    assert_eq!(counter.value().unwrap(), 7);
    assert_eq!(counter.to_string(), "7");
}

#[test]
fn test_handles_share_the_parameter_slot() {
    let mut binder = ParameterBinder::new();
    let first = binder.add_output::<i32>("n", None).unwrap();
    let second = first.clone();
    let collection = binder.finish();
    collection.set_value("n", Value::Int32(3)).unwrap();
    collection.mark_executed();

    assert_eq!(first.value().unwrap(), 3);
    assert_eq!(second.value().unwrap(), 3);
    assert_eq!(collection.get("n").unwrap().value(), Value::Int32(3));
}
