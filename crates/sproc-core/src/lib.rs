//! SPROC Core - Core abstractions for typed stored-procedure calls
//!
//! This crate provides the types every other SPROC crate depends on:
//!
//! - `Value` - a cell or parameter value of any SQL type
//! - `SemanticType` / `StorageType` - abstract and storage type tags
//! - `ColumnValue` - conversion between `Value` and Rust types
//! - `Cursor` / `AsyncCursor` - forward-only result cursors
//! - `ScopedCursor` - exactly-once release of an invocation's cursor
//! - `ProcError` / `BindError` - the error taxonomy

mod column;
mod config;
mod cursor;
mod error;
mod types;

pub use column::*;
pub use config::*;
pub use cursor::*;
pub use error::*;
pub use types::*;

pub use tokio_util::sync::CancellationToken;
