//! Tests for the parameter binder

use crate::{Direction, ParameterBinder};
use pretty_assertions::assert_eq;
use sproc_core::{BindError, BinderConfig, ProcError, ScalarKind, SemanticType, StorageType, Value};

fn bind_error(err: ProcError) -> BindError {
    match err {
        ProcError::Bind(e) => e,
        other => panic!("expected bind error, got {other:?}"),
    }
}

#[test]
fn test_input_infers_type_from_value() {
    let mut binder = ParameterBinder::new();
    binder.add_input("lim", Value::Int64(2), None).unwrap();

    let param = &binder.parameters()[0];
    assert_eq!(param.name(), "lim");
    assert_eq!(param.qualified_name(), "@lim");
    assert_eq!(param.direction(), Direction::Input);
    assert_eq!(param.storage_type(), StorageType::Int64);
    assert!(!param.is_nullable());
    assert_eq!(param.value(), Value::Int64(2));
}

#[test]
fn test_null_input_requires_explicit_type() {
    let mut binder = ParameterBinder::new();
    let err = binder.add_input("n", Value::Null, None).unwrap_err();
    assert_eq!(bind_error(err), BindError::UntypedNull("n".to_string()));
    assert!(binder.parameters().is_empty());
}

#[test]
fn test_typed_null_input() {
    let mut binder = ParameterBinder::new();
    binder
        .add_input("n", Value::Null, Some(SemanticType::new(ScalarKind::Int32).nullable()))
        .unwrap();

    let param = &binder.parameters()[0];
    assert_eq!(param.storage_type(), StorageType::Int32);
    assert!(param.is_nullable());
    assert!(param.value().is_null());
}

#[test]
fn test_typed_input_from_option() {
    let mut binder = ParameterBinder::new();
    binder
        .add_input_typed("n", None::<i32>)
        .unwrap()
        .add_input_typed("flag", true)
        .unwrap();

    let params = binder.parameters();
    assert_eq!(params[0].storage_type(), StorageType::Int32);
    assert!(params[0].is_nullable());
    assert_eq!(params[1].storage_type(), StorageType::Boolean);
    assert_eq!(params[1].value(), Value::Bool(true));
}

#[test]
fn test_input_type_mismatch() {
    let mut binder = ParameterBinder::new();
    let err = binder
        .add_input(
            "id",
            Value::String("x".into()),
            Some(SemanticType::new(ScalarKind::Int32)),
        )
        .unwrap_err();
    assert!(matches!(bind_error(err), BindError::TypeMismatch { .. }));
}

#[test]
fn test_unsupported_type_fails_at_bind_time() {
    let mut binder = ParameterBinder::new();

    let err = binder
        .add_input("doc", Value::Json(serde_json::json!({"a": 1})), None)
        .unwrap_err();
    assert!(matches!(bind_error(err), BindError::UnsupportedType { .. }));

    let err = binder.add_output::<u32>("count", None).unwrap_err();
    assert!(matches!(bind_error(err), BindError::UnsupportedType { .. }));

    assert!(binder.parameters().is_empty());
}

#[test]
fn test_duplicate_names_are_case_insensitive() {
    let mut binder = ParameterBinder::new();
    binder.add_input("Id", Value::Int32(1), None).unwrap();
    let err = binder.add_input("@id", Value::Int32(2), None).unwrap_err();
    assert_eq!(bind_error(err), BindError::DuplicateName("id".to_string()));
}

#[test]
fn test_empty_name_rejected() {
    let mut binder = ParameterBinder::new();
    let err = binder.add_input("@", Value::Int32(1), None).unwrap_err();
    assert_eq!(bind_error(err), BindError::EmptyName);
}

#[test]
fn test_single_return_value() {
    let mut binder = ParameterBinder::new();
    binder.add_return_value::<i32>().unwrap();
    let err = binder.add_return_value::<i32>().unwrap_err();
    assert_eq!(bind_error(err), BindError::DuplicateReturnValue);

    let collection = binder.finish();
    let ret = collection.return_value().unwrap();
    assert_eq!(ret.name(), "RETURN_VALUE");
    assert_eq!(ret.direction(), Direction::ReturnValue);
    assert_eq!(ret.storage_type(), StorageType::Int32);
}

#[test]
fn test_fixed_size_only_for_text() {
    let mut binder = ParameterBinder::new();
    binder.add_output::<String>("fixed_size", Some(255)).unwrap();
    binder.add_output::<String>("unsized", None).unwrap();
    binder.add_output::<i64>("total", Some(255)).unwrap();

    let params = binder.parameters();
    assert_eq!(params[0].size(), Some(255));
    assert_eq!(params[1].size(), Some(4000));
    assert_eq!(params[2].size(), None);
}

#[test]
fn test_config_shapes_names_and_sizes() {
    let config = BinderConfig {
        parameter_prefix: ":".to_string(),
        return_value_name: "status".to_string(),
        default_text_size: None,
    };
    let mut binder = ParameterBinder::with_config(config);
    binder.add_output::<Option<String>>(":label", None).unwrap();
    binder.add_return_value::<i32>().unwrap();

    let collection = binder.finish();
    let label = collection.get("label").unwrap();
    assert_eq!(label.qualified_name(), ":label");
    assert_eq!(label.size(), None);
    assert!(label.is_nullable());
    assert_eq!(collection.get(":STATUS").unwrap().direction(), Direction::ReturnValue);
}

#[test]
fn test_collection_partitions_inputs_and_outputs() {
    let mut binder = ParameterBinder::new();
    binder.add_input("limit", Value::Int64(300), None).unwrap();
    binder.add_output::<i64>("limitOut", None).unwrap();
    binder.add_input_output::<i32>("counter", 1, None).unwrap();
    binder.add_return_value::<i32>().unwrap();

    let collection = binder.finish();
    let inputs: Vec<&str> = collection.inputs().map(|p| p.name()).collect();
    let outputs: Vec<&str> = collection.outputs().map(|p| p.name()).collect();
    assert_eq!(inputs, vec!["limit", "counter"]);
    assert_eq!(outputs, vec!["limitOut", "counter", "RETURN_VALUE"]);
    assert_eq!(collection.len(), 4);
}

#[test]
fn test_set_value_rejects_inputs_and_unknown_names() {
    let mut binder = ParameterBinder::new();
    binder.add_input("limit", Value::Int64(300), None).unwrap();
    let collection = binder.finish();

    let err = collection.set_value("limit", Value::Int64(1)).unwrap_err();
    assert_eq!(bind_error(err), BindError::NotAnOutput("limit".to_string()));

    let err = collection.set_value("nope", Value::Int64(1)).unwrap_err();
    assert_eq!(bind_error(err), BindError::UnknownParameter("nope".to_string()));
}
