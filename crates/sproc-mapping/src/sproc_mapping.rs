//! Mapping stored procedure result rows onto typed values.
//!
//! [`RowMapper`] binds a type's fields to a cursor schema once and reuses
//! the binding through a process-wide cache. [`CursorReader`] and
//! [`AsyncCursorReader`] project a cursor into single values or collections
//! and always drain what is left of the cursor before reporting, so the
//! server side can finish (or be cancelled) cleanly.

mod async_reader;
mod binding;
mod mapper;
mod metadata;
mod protocol;
mod reader;

#[cfg(test)]
mod async_reader_tests;
#[cfg(test)]
mod mapper_tests;
#[cfg(test)]
mod reader_tests;
#[cfg(test)]
mod test_fixtures;

pub use async_reader::AsyncCursorReader;
pub use binding::{BindingCache, ColumnBinding, ColumnBindings};
pub use mapper::RowMapper;
pub use metadata::{FieldDef, FromRow};
pub use protocol::ReadState;
pub use reader::{CursorReader, MappedRows};

#[doc(hidden)]
pub mod __private {
    pub use sproc_core::{ColumnValue, ProcError, Result, Value};
}
