//! Shared models and cursors for the mapping tests

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sproc_core::{
    AsyncCursor, CancellationToken, Cursor, CursorSchema, MemoryCursor, ProcError, Result,
    ResultCursor, Value,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flag {
    #[default]
    Off = 0,
    On = 1,
}

impl TryFrom<i32> for Flag {
    type Error = ();

    fn try_from(raw: i32) -> std::result::Result<Self, ()> {
        match raw {
            0 => Ok(Flag::Off),
            1 => Ok(Flag::On),
            _ => Err(()),
        }
    }
}

impl From<Flag> for i32 {
    fn from(flag: Flag) -> i32 {
        flag as i32
    }
}

sproc_core::impl_enum_column!(Flag, i32);

#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct Model {
    pub(crate) id: i64,
    pub(crate) name: Option<String>,
    pub(crate) date: NaiveDateTime,
    pub(crate) flag: Flag,
}

crate::impl_from_row!(Model {
    id: i64,
    name: Option<String>,
    date: NaiveDateTime,
    flag as "NameWithUnderscore": Flag,
});

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct KeyValue {
    pub(crate) key: i32,
    pub(crate) value: String,
}

crate::impl_from_row!(KeyValue {
    key: i32,
    value: String,
});

pub(crate) fn model_schema() -> CursorSchema {
    CursorSchema::new(["Id", "Name", "Date", "NameWithUnderscore"])
}

pub(crate) fn model_row(id: i64, name: Option<&str>) -> Vec<Value> {
    vec![
        Value::Int64(id),
        name.map_or(Value::Null, |n| Value::String(n.to_string())),
        Value::Null,
        Value::Int64(id % 2),
    ]
}

pub(crate) fn model_cursor(rows: usize) -> MemoryCursor {
    let rows = (1..=rows as i64)
        .map(|id| model_row(id, Some(&format!("name {id}"))))
        .collect();
    MemoryCursor::new(model_schema(), rows)
}

pub(crate) fn key_value_cursor(pairs: &[(i32, &str)]) -> MemoryCursor {
    let rows = pairs
        .iter()
        .map(|(k, v)| vec![Value::Int32(*k), Value::String(v.to_string())])
        .collect();
    MemoryCursor::new(CursorSchema::new(["key", "value"]), rows)
}

/// Memory cursor that can cancel a token or fail after delivering a number
/// of rows, report one row's cells as unconvertible, and counts fetches and
/// releases
pub(crate) struct ScriptedCursor {
    inner: MemoryCursor,
    delivered: usize,
    attempts: usize,
    cancel_after: Option<(usize, CancellationToken)>,
    fail_after: Option<usize>,
    bad_row: Option<usize>,
    releases: Arc<AtomicUsize>,
}

impl ScriptedCursor {
    pub(crate) fn new(inner: MemoryCursor) -> Self {
        Self {
            inner,
            delivered: 0,
            attempts: 0,
            cancel_after: None,
            fail_after: None,
            bad_row: None,
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn cancel_after(mut self, rows: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((rows, token));
        self
    }

    pub(crate) fn fail_after(mut self, rows: usize) -> Self {
        self.fail_after = Some(rows);
        self
    }

    /// Row `row` (1-based) fails every cell read with a conversion error
    pub(crate) fn bad_row(mut self, row: usize) -> Self {
        self.bad_row = Some(row);
        self
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts
    }

    pub(crate) fn releases(&self) -> Arc<AtomicUsize> {
        self.releases.clone()
    }

    pub(crate) fn inner(&self) -> &MemoryCursor {
        &self.inner
    }

    fn step(&mut self) -> Result<bool> {
        self.attempts += 1;
        if self.fail_after == Some(self.delivered) {
            return Err(ProcError::Transport("connection reset".into()));
        }
        let more = self.inner.advance()?;
        if more {
            self.delivered += 1;
            if let Some((rows, token)) = &self.cancel_after {
                if *rows == self.delivered {
                    token.cancel();
                }
            }
        }
        Ok(more)
    }
}

impl ResultCursor for ScriptedCursor {
    fn schema(&self) -> &CursorSchema {
        self.inner.schema()
    }

    fn value(&self, ordinal: usize) -> Result<&Value> {
        if self.bad_row == Some(self.delivered) {
            return Err(ProcError::Conversion("bad cell".into()));
        }
        self.inner.value(ordinal)
    }

    fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

impl Cursor for ScriptedCursor {
    fn advance(&mut self) -> Result<bool> {
        self.step()
    }
}

#[async_trait]
impl AsyncCursor for ScriptedCursor {
    async fn advance_async(&mut self, _cancel: &CancellationToken) -> Result<bool> {
        tokio::task::yield_now().await;
        self.step()
    }
}

/// Cursor whose fetch never completes
pub(crate) struct StalledCursor {
    schema: CursorSchema,
}

impl StalledCursor {
    pub(crate) fn new() -> Self {
        Self {
            schema: model_schema(),
        }
    }
}

impl ResultCursor for StalledCursor {
    fn schema(&self) -> &CursorSchema {
        &self.schema
    }

    fn value(&self, _ordinal: usize) -> Result<&Value> {
        Err(ProcError::NoCurrentRow)
    }
}

#[async_trait]
impl AsyncCursor for StalledCursor {
    async fn advance_async(&mut self, _cancel: &CancellationToken) -> Result<bool> {
        std::future::pending::<()>().await;
        Ok(false)
    }
}
