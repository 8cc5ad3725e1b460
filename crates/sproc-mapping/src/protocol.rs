//! Read protocol shared by the blocking and suspending readers

use crate::{FromRow, RowMapper};
use sproc_core::{ColumnValue, ProcError, Result, ResultCursor};

/// Where a reader is in the life of its cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    /// No fetch attempted yet
    NotStarted,
    /// Positioned on a row
    RowsAvailable,
    /// The cursor reported its end
    Exhausted,
    /// An operation finished and the cursor is fully consumed
    Completed,
    /// Cancellation was observed; no further fetch reaches the cursor
    Cancelled,
    /// The transport failed
    Failed,
}

impl ReadState {
    pub(crate) fn after_fetch(outcome: &Result<bool>) -> Self {
        match outcome {
            Ok(true) => ReadState::RowsAvailable,
            Ok(false) => ReadState::Exhausted,
            Err(ProcError::Cancelled) => ReadState::Cancelled,
            Err(_) => ReadState::Failed,
        }
    }

    /// Whether the cursor has nothing more to give
    pub fn is_finished(self) -> bool {
        matches!(self, ReadState::Exhausted | ReadState::Completed)
    }
}

/// Shape of a single-row terminal operation
#[derive(Debug, Clone, Copy)]
pub(crate) struct Terminal {
    pub(crate) or_default: bool,
    pub(crate) single: bool,
}

impl Terminal {
    pub(crate) const FIRST: Terminal = Terminal {
        or_default: false,
        single: false,
    };
    pub(crate) const FIRST_OR_DEFAULT: Terminal = Terminal {
        or_default: true,
        single: false,
    };
    pub(crate) const SINGLE: Terminal = Terminal {
        or_default: false,
        single: true,
    };
    pub(crate) const SINGLE_OR_DEFAULT: Terminal = Terminal {
        or_default: true,
        single: true,
    };
}

/// Outcome of the first phase of an operation.
///
/// `Ready` holds what the operation will return once the cursor has been
/// drained; the drain can still replace it with `Cancelled` or a transport
/// error. `Aborted` means a fetch itself failed and there is nothing left to
/// drain.
pub(crate) enum Candidate<T> {
    Ready(Result<T>),
    Aborted(ProcError),
}

/// Read a cell as `T`; NULL yields `T::default()`
pub(crate) fn read_cell<T, C>(cursor: &C, ordinal: usize) -> Result<T>
where
    T: ColumnValue + Default,
    C: ResultCursor + ?Sized,
{
    let cell = cursor.value(ordinal)?;
    if cell.is_null() {
        return Ok(T::default());
    }
    T::from_value(cell.clone())
}

/// Resolve a column name once, on the first row that reaches it
pub(crate) fn read_named_cell<T, C>(
    cursor: &C,
    name: &str,
    resolved: &mut Option<usize>,
) -> Result<T>
where
    T: ColumnValue + Default,
    C: ResultCursor + ?Sized,
{
    let ordinal = match *resolved {
        Some(ordinal) => ordinal,
        None => {
            let ordinal = cursor
                .schema()
                .ordinal(name)
                .ok_or_else(|| ProcError::ColumnNotFound(name.to_string()))?;
            *resolved = Some(ordinal);
            ordinal
        }
    };
    read_cell(cursor, ordinal)
}

pub(crate) fn map_one<T: FromRow, C: ResultCursor + ?Sized>(cursor: &C) -> Result<T> {
    RowMapper::<T>::bind(cursor.schema()).map_row(cursor)
}

/// Mapper bound on the first row it sees
pub(crate) fn lazy_mapper<T, C>() -> impl FnMut(&C) -> Result<T>
where
    T: FromRow,
    C: ResultCursor + ?Sized,
{
    let mut mapper: Option<RowMapper<T>> = None;
    move |cursor| {
        mapper
            .get_or_insert_with(|| RowMapper::bind(cursor.schema()))
            .map_row(cursor)
    }
}
