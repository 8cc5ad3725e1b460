//! Output value resolution

use crate::binder::{Parameter, ParameterSlot};
use sproc_core::{ColumnValue, ProcError, Result, Value};
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::Ordering;

/// Read handle for an output, input/output or return-value parameter.
///
/// The handle shares the parameter's value slot and has no storage of its
/// own. It only resolves once the owning collection has been marked
/// executed.
pub struct OutputValue<T> {
    name: String,
    slot: Arc<ParameterSlot>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> OutputValue<T> {
    pub(crate) fn new(parameter: &Parameter) -> Self {
        Self {
            name: parameter.name().to_string(),
            slot: parameter.slot.clone(),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw slot contents, without conversion
    pub fn raw(&self) -> Value {
        self.slot.value.read().clone()
    }
}

impl<T: ColumnValue> OutputValue<T> {
    /// Resolve the value the routine wrote.
    ///
    /// A SQL NULL resolves to `None` when `T` is an `Option`, and fails with
    /// [`ProcError::NullCoercion`] otherwise: an output is never silently
    /// defaulted.
    pub fn value(&self) -> Result<T> {
        if !self.slot.executed.load(Ordering::Acquire) {
            return Err(ProcError::NotExecuted(self.name.clone()));
        }
        let value = self.slot.value.read().clone();
        if value.is_null() {
            return T::null_value().ok_or_else(|| ProcError::NullCoercion {
                parameter: self.name.clone(),
            });
        }
        T::from_value(value)
    }
}

impl<T> Clone for OutputValue<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            slot: self.slot.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for OutputValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputValue")
            .field("name", &self.name)
            .field("value", &*self.slot.value.read())
            .finish()
    }
}

impl<T> std::fmt::Display for OutputValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slot.value.read())
    }
}
