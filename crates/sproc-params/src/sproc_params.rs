//! Parameter binding for SPROC
//!
//! Declares the parameters of one routine invocation before it runs, and
//! resolves output and return values after it has completed.

mod binder;
mod conversion;
mod output;

#[cfg(test)]
mod binder_tests;
#[cfg(test)]
mod output_tests;

pub use binder::{Direction, Parameter, ParameterBinder, ParameterCollection};
pub use conversion::storage_type_for;
pub use output::OutputValue;
