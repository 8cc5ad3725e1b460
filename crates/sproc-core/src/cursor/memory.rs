//! Cursor over rows that are already in memory

use crate::{AsyncCursor, Cursor, CursorSchema, ProcError, Result, ResultCursor, Value};
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio_util::sync::CancellationToken;

/// Forward-only cursor over buffered rows.
///
/// Useful when a result has already been materialized, and as a stand-in
/// transport in tests. Rows shorter than the schema read as out of range.
#[derive(Debug, Clone, Default)]
pub struct MemoryCursor {
    schema: CursorSchema,
    pending: VecDeque<Vec<Value>>,
    current: Option<Vec<Value>>,
    fetches: usize,
}

impl MemoryCursor {
    pub fn new(schema: CursorSchema, rows: Vec<Vec<Value>>) -> Self {
        Self {
            schema,
            pending: rows.into(),
            current: None,
            fetches: 0,
        }
    }

    /// Number of advance calls that reached the cursor
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    /// Rows not yet fetched
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    fn step(&mut self) -> bool {
        self.fetches += 1;
        self.current = self.pending.pop_front();
        self.current.is_some()
    }
}

impl ResultCursor for MemoryCursor {
    fn schema(&self) -> &CursorSchema {
        &self.schema
    }

    fn value(&self, ordinal: usize) -> Result<&Value> {
        let row = self.current.as_ref().ok_or(ProcError::NoCurrentRow)?;
        row.get(ordinal).ok_or(ProcError::OrdinalOutOfRange {
            ordinal,
            count: row.len(),
        })
    }
}

impl Cursor for MemoryCursor {
    fn advance(&mut self) -> Result<bool> {
        Ok(self.step())
    }
}

#[async_trait]
impl AsyncCursor for MemoryCursor {
    async fn advance_async(&mut self, cancel: &CancellationToken) -> Result<bool> {
        if cancel.is_cancelled() {
            return Err(ProcError::Cancelled);
        }
        Ok(self.step())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn two_rows() -> MemoryCursor {
        MemoryCursor::new(
            CursorSchema::new(["id", "name"]),
            vec![
                vec![Value::Int64(1), Value::String("a".into())],
                vec![Value::Int64(2), Value::Null],
            ],
        )
    }

    #[test]
    fn test_reads_rows_in_order() {
        let mut cursor = two_rows();
        assert!(matches!(cursor.value(0), Err(ProcError::NoCurrentRow)));

        assert!(cursor.advance().unwrap());
        assert_eq!(cursor.value(0).unwrap(), &Value::Int64(1));
        assert_eq!(cursor.value_by_name("NAME").unwrap(), &Value::String("a".into()));

        assert!(cursor.advance().unwrap());
        assert!(cursor.is_null(1).unwrap());

        assert!(!cursor.advance().unwrap());
        assert!(!cursor.advance().unwrap());
        assert_eq!(cursor.fetch_count(), 4);
    }

    #[test]
    fn test_ordinal_out_of_range() {
        let mut cursor = two_rows();
        cursor.advance().unwrap();
        assert!(matches!(
            cursor.value(5),
            Err(ProcError::OrdinalOutOfRange { ordinal: 5, count: 2 })
        ));
        assert!(matches!(
            cursor.value_by_name("missing"),
            Err(ProcError::ColumnNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_async_advance_observes_cancellation() {
        let mut cursor = two_rows();
        let token = CancellationToken::new();
        assert!(cursor.advance_async(&token).await.unwrap());

        token.cancel();
        let err = cursor.advance_async(&token).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(cursor.fetch_count(), 1);
    }
}
