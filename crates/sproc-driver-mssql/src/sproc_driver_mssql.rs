//! SQL Server adapter for SPROC
//!
//! Bridges tiberius to the SPROC cursor and parameter model: a query
//! stream becomes an [`AsyncCursor`](sproc_core::AsyncCursor), cells become
//! [`Value`](sproc_core::Value)s and bound parameters are encoded with
//! their declared storage type.
//!
//! The unit tests here cover conversion, encoding and result set tracking
//! without a server. Reading a [`TiberiusCursor`] end to end needs a live
//! SQL Server and is left to integration environments that provide one.

mod convert;
mod cursor;
mod error;
mod param;

#[cfg(test)]
mod convert_tests;
#[cfg(test)]
mod cursor_tests;
#[cfg(test)]
mod param_tests;

pub use convert::{column_data_to_value, row_to_values};
pub use cursor::TiberiusCursor;
pub use error::MssqlError;
pub use param::{MssqlParam, input_params, sql_type_name};
