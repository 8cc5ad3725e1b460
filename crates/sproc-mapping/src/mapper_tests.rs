//! Tests for column binding and row mapping

use crate::test_fixtures::{Flag, KeyValue, Model, model_schema};
use crate::{BindingCache, ColumnBindings, FromRow, RowMapper};
use chrono::NaiveDateTime;
use pretty_assertions::assert_eq;
use sproc_core::{Cursor, CursorSchema, MemoryCursor, ProcError, ResultCursor, Value};
use std::sync::Arc;

fn positioned(schema: CursorSchema, row: Vec<Value>) -> MemoryCursor {
    let mut cursor = MemoryCursor::new(schema, vec![row]);
    assert!(cursor.advance().unwrap());
    cursor
}

#[test]
fn test_field_table_uses_explicit_column_names() {
    let names: Vec<&str> = Model::fields().iter().map(|f| f.name).collect();
    assert_eq!(names, ["id", "name", "date", "NameWithUnderscore"]);
    assert!(Model::fields()[1].semantic_type.nullable);
    assert!(Model::fields()[3].enum_repr.is_some());
}

#[test]
fn test_bindings_match_ignoring_case() {
    let bindings = ColumnBindings::build::<Model>(&model_schema());
    let pairs: Vec<(usize, &str)> = bindings.iter().map(|b| (b.ordinal, b.field_name)).collect();
    assert_eq!(
        pairs,
        [(0, "id"), (1, "name"), (2, "date"), (3, "NameWithUnderscore")]
    );
}

#[test]
fn test_unmatched_columns_and_fields_are_skipped() {
    let schema = CursorSchema::new(["Extra", "ID"]);
    let bindings = ColumnBindings::build::<Model>(&schema);
    assert_eq!(bindings.len(), 1);

    let cursor = positioned(schema, vec![Value::String("ignored".into()), Value::Int32(9)]);
    let model = RowMapper::<Model>::bind_with(&BindingCache::new(), cursor.schema())
        .map_row(&cursor)
        .unwrap();
    assert_eq!(
        model,
        Model {
            id: 9,
            ..Model::default()
        }
    );
}

#[test]
fn test_colliding_columns_bind_the_first() {
    let schema = CursorSchema::new(["KEY", "key", "value"]);
    let cursor = positioned(
        schema,
        vec![Value::Int32(1), Value::Int32(2), Value::String("v".into())],
    );
    let mapper = RowMapper::<KeyValue>::bind_with(&BindingCache::new(), cursor.schema());
    assert_eq!(mapper.map_row(&cursor).unwrap().key, 1);
}

#[test]
fn test_null_cells_leave_defaults() {
    let cursor = positioned(
        model_schema(),
        vec![Value::Int64(3), Value::Null, Value::Null, Value::Null],
    );
    let model = RowMapper::<Model>::bind(cursor.schema())
        .map_row(&cursor)
        .unwrap();

    assert_eq!(model.id, 3);
    assert_eq!(model.name, None);
    assert_eq!(model.date, NaiveDateTime::default());
    assert_eq!(model.flag, Flag::Off);
}

#[test]
fn test_enum_fields_narrow_wider_integers() {
    let cursor = positioned(
        model_schema(),
        vec![Value::Int64(1), Value::Null, Value::Null, Value::Int64(1)],
    );
    let model = RowMapper::<Model>::bind(cursor.schema())
        .map_row(&cursor)
        .unwrap();
    assert_eq!(model.flag, Flag::On);
}

#[test]
fn test_enum_out_of_range_is_a_conversion_error() {
    let cursor = positioned(
        model_schema(),
        vec![Value::Int64(1), Value::Null, Value::Null, Value::Int64(7)],
    );
    let err = RowMapper::<Model>::bind(cursor.schema())
        .map_row(&cursor)
        .unwrap_err();
    assert!(matches!(err, ProcError::Conversion(_)));
}

#[test]
fn test_cache_returns_the_same_bindings() {
    let cache = BindingCache::new();
    let schema = model_schema();

    let first = RowMapper::<Model>::bind_with(&cache, &schema);
    let second = RowMapper::<Model>::bind_with(&cache, &schema);
    assert!(Arc::ptr_eq(first.bindings(), second.bindings()));
    assert_eq!(cache.len(), 1);

    RowMapper::<KeyValue>::bind_with(&cache, &schema);
    RowMapper::<Model>::bind_with(&cache, &CursorSchema::new(["id"]));
    assert_eq!(cache.len(), 3);
}

#[test]
fn test_concurrent_builds_agree() {
    let cache = BindingCache::new();
    let schema = model_schema();

    let built: Vec<Arc<ColumnBindings>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| cache.get_or_build::<Model>(&schema)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(cache.len(), 1);
    let stored = cache.get_or_build::<Model>(&schema);
    for bindings in &built {
        assert!(Arc::ptr_eq(bindings, &stored));
    }
}

#[derive(Debug, Default, PartialEq)]
struct Mirrored {
    code: i32,
    copy: i32,
}

crate::impl_from_row!(Mirrored {
    code: i32,
    copy as "CODE": i32,
});

#[test]
fn test_fields_sharing_a_column_are_each_set() {
    let cursor = positioned(CursorSchema::new(["code"]), vec![Value::Int32(5)]);
    let mirrored = RowMapper::<Mirrored>::bind_with(&BindingCache::new(), cursor.schema())
        .map_row(&cursor)
        .unwrap();
    assert_eq!(mirrored, Mirrored { code: 5, copy: 5 });
}
