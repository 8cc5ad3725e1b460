//! Tests for the suspending cursor projections

use crate::test_fixtures::{
    KeyValue, Model, ScriptedCursor, StalledCursor, key_value_cursor, model_cursor,
};
use crate::{AsyncCursorReader, ReadState};
use futures::TryStreamExt;
use pretty_assertions::assert_eq;
use sproc_core::{CancellationToken, CursorSchema, MemoryCursor, ProcError, Value};
use std::time::Duration;

#[tokio::test]
async fn test_to_list_and_first() {
    let mut cursor = model_cursor(3);
    let models = AsyncCursorReader::without_cancellation(&mut cursor)
        .to_list::<Model>()
        .await
        .unwrap();
    assert_eq!(models.len(), 3);

    let mut cursor = model_cursor(3);
    let mut reader = AsyncCursorReader::without_cancellation(&mut cursor);
    assert_eq!(reader.first::<Model>().await.unwrap().id, 1);
    assert_eq!(reader.state(), ReadState::Completed);
    assert_eq!(reader.cursor().remaining(), 0);
}

#[tokio::test]
async fn test_single_and_defaults() {
    let mut cursor = model_cursor(2);
    let err = AsyncCursorReader::without_cancellation(&mut cursor)
        .single::<Model>()
        .await
        .unwrap_err();
    assert!(matches!(err, ProcError::MultipleElements));

    let mut cursor = model_cursor(0);
    let model = AsyncCursorReader::without_cancellation(&mut cursor)
        .single_or_default::<Model>()
        .await
        .unwrap();
    assert_eq!(model, Model::default());

    let mut cursor = model_cursor(0);
    let err = AsyncCursorReader::without_cancellation(&mut cursor)
        .first::<Model>()
        .await
        .unwrap_err();
    assert!(matches!(err, ProcError::EmptySequence));
}

#[tokio::test]
async fn test_dictionary_and_lookup() {
    let pairs = [(1, "A"), (1, "B"), (2, "C")];

    let mut cursor = key_value_cursor(&pairs);
    let dictionary = AsyncCursorReader::without_cancellation(&mut cursor)
        .to_dictionary(|kv: &KeyValue| kv.key)
        .await
        .unwrap();
    assert_eq!(dictionary[&1].value, "B");
    assert_eq!(dictionary[&2].value, "C");

    let mut cursor = key_value_cursor(&pairs);
    let lookup = AsyncCursorReader::without_cancellation(&mut cursor)
        .to_lookup(|kv: &KeyValue| kv.key)
        .await
        .unwrap();
    assert_eq!(lookup[&1].len(), 2);
    assert_eq!(lookup[&2][0].value, "C");
}

#[tokio::test]
async fn test_scalar_set_and_column() {
    let schema = CursorSchema::new(["n"]);
    let rows = vec![vec![Value::Int32(5)], vec![Value::Null], vec![Value::Int32(5)]];

    let mut cursor = MemoryCursor::new(schema.clone(), rows.clone());
    let first = AsyncCursorReader::without_cancellation(&mut cursor)
        .scalar::<i32>()
        .await
        .unwrap();
    assert_eq!(first, 5);

    let mut cursor = MemoryCursor::new(schema.clone(), rows.clone());
    let set = AsyncCursorReader::without_cancellation(&mut cursor)
        .to_set::<i32>()
        .await
        .unwrap();
    assert_eq!(set.into_iter().collect::<Vec<_>>(), [5, 0]);

    let mut cursor = MemoryCursor::new(schema, rows);
    let column = AsyncCursorReader::without_cancellation(&mut cursor)
        .column_by_name::<Option<i32>>("N")
        .await
        .unwrap();
    assert_eq!(column, [Some(5), None, Some(5)]);
}

#[tokio::test]
async fn test_cancellation_after_first_row() {
    let token = CancellationToken::new();
    let mut cursor = ScriptedCursor::new(model_cursor(3)).cancel_after(1, token.clone());
    let mut reader = AsyncCursorReader::new(&mut cursor, token);

    let err = reader.first::<Model>().await.unwrap_err();
    assert!(matches!(err, ProcError::Cancelled));
    assert_eq!(reader.state(), ReadState::Cancelled);
}

#[tokio::test]
async fn test_pre_cancelled_token_never_fetches() {
    let token = CancellationToken::new();
    token.cancel();
    let mut cursor = model_cursor(3);

    let err = AsyncCursorReader::new(&mut cursor, token)
        .scalar::<i64>()
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(cursor.fetch_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_interrupts_a_stalled_fetch() {
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let mut cursor = StalledCursor::new();
    let err = AsyncCursorReader::new(&mut cursor, token)
        .to_list::<Model>()
        .await
        .unwrap_err();
    assert!(matches!(err, ProcError::Cancelled));
}

#[tokio::test]
async fn test_transport_failure_during_drain() {
    let mut cursor = ScriptedCursor::new(model_cursor(3)).fail_after(2);
    let mut reader = AsyncCursorReader::without_cancellation(&mut cursor);

    let err = reader.first::<Model>().await.unwrap_err();
    assert!(matches!(err, ProcError::Transport(_)));
    assert_eq!(reader.state(), ReadState::Failed);
}

#[tokio::test]
async fn test_map_all_streams_rows() {
    let mut cursor = model_cursor(3);
    let mut reader = AsyncCursorReader::without_cancellation(&mut cursor);

    let ids: Vec<i64> = reader
        .map_all::<Model>()
        .map_ok(|m| m.id)
        .try_collect()
        .await
        .unwrap();
    assert_eq!(ids, [1, 2, 3]);
    assert_eq!(reader.state(), ReadState::Completed);
}

#[tokio::test]
async fn test_unconvertible_row_still_drains() {
    let mut cursor = ScriptedCursor::new(model_cursor(5)).bad_row(2);
    let mut reader = AsyncCursorReader::without_cancellation(&mut cursor);

    let err = reader.to_list::<Model>().await.unwrap_err();
    assert!(matches!(err, ProcError::Conversion(_)));
    assert_eq!(reader.state(), ReadState::Completed);
    assert_eq!(reader.cursor().inner().remaining(), 0);
}

#[tokio::test]
async fn test_failed_cursor_is_not_fetched_again() {
    let mut cursor = ScriptedCursor::new(model_cursor(3)).fail_after(1);
    let mut reader = AsyncCursorReader::without_cancellation(&mut cursor);

    assert!(reader.first::<Model>().await.is_err());
    let attempts = reader.cursor().attempts();

    let err = reader.drain().await.unwrap_err();
    assert!(matches!(err, ProcError::Transport(_)));
    assert_eq!(reader.cursor().attempts(), attempts);
    assert_eq!(reader.state(), ReadState::Failed);
}
