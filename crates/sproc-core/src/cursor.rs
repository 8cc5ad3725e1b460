//! Forward-only cursor traits consumed by the mapping engine
//!
//! A cursor is handed over by whatever issued the call. This crate never
//! rewinds it: rows are visited once, in arrival order, and the only
//! supported motion is "advance to the next row".

mod memory;
mod scoped;

pub use memory::*;
pub use scoped::*;

use crate::{ProcError, Result, Value};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Column layout of a cursor's current result set
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CursorSchema {
    columns: Vec<String>,
}

impl CursorSchema {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_name(&self, ordinal: usize) -> Option<&str> {
        self.columns.get(ordinal).map(String::as_str)
    }

    /// Resolve a column name to its ordinal, ignoring ASCII case.
    ///
    /// When several columns fold to the same name, the lowest ordinal wins.
    pub fn ordinal(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }
}

/// Per-row access shared by the blocking and suspending cursors
pub trait ResultCursor {
    /// Schema of the current result set.
    ///
    /// Transports that learn the layout from the first metadata packet may
    /// return an empty schema until the first advance.
    fn schema(&self) -> &CursorSchema;

    /// Raw value of a cell in the current row
    fn value(&self, ordinal: usize) -> Result<&Value>;

    fn is_null(&self, ordinal: usize) -> Result<bool> {
        Ok(self.value(ordinal)?.is_null())
    }

    fn value_by_name(&self, name: &str) -> Result<&Value> {
        let ordinal = self
            .schema()
            .ordinal(name)
            .ok_or_else(|| ProcError::ColumnNotFound(name.to_string()))?;
        self.value(ordinal)
    }

    /// Release the underlying command/result resources.
    ///
    /// Called exactly once by [`ScopedCursor`]; the default does nothing.
    fn release(&mut self) {}
}

/// A cursor whose fetch blocks the calling thread
pub trait Cursor: ResultCursor {
    /// Move to the next row. Returns `false` once the result set is exhausted.
    fn advance(&mut self) -> Result<bool>;
}

/// A cursor whose fetch suspends the calling task
#[async_trait]
pub trait AsyncCursor: ResultCursor + Send {
    /// Move to the next row, giving up with [`ProcError::Cancelled`] if the
    /// token fires while waiting on the transport.
    async fn advance_async(&mut self, cancel: &CancellationToken) -> Result<bool>;
}
