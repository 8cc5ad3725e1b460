//! Row mapper

use crate::{BindingCache, ColumnBindings, FromRow};
use sproc_core::{CursorSchema, Result, ResultCursor};
use std::marker::PhantomData;
use std::sync::Arc;

/// Maps rows of one result set to `T`, using bindings resolved once
pub struct RowMapper<T> {
    bindings: Arc<ColumnBindings>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromRow> RowMapper<T> {
    /// Resolve (or fetch from the process-wide cache) the bindings of `T`
    /// against `schema`
    pub fn bind(schema: &CursorSchema) -> Self {
        Self::bind_with(BindingCache::global(), schema)
    }

    pub fn bind_with(cache: &BindingCache, schema: &CursorSchema) -> Self {
        Self {
            bindings: cache.get_or_build::<T>(schema),
            _marker: PhantomData,
        }
    }

    pub fn bindings(&self) -> &Arc<ColumnBindings> {
        &self.bindings
    }

    /// Build a `T` from the cursor's current row.
    ///
    /// NULL cells leave their field at its default, whatever the field's
    /// type. Enum fields receive the cell narrowed to the enum's underlying
    /// integer kind.
    pub fn map_row<C: ResultCursor + ?Sized>(&self, row: &C) -> Result<T> {
        let mut target = T::default();
        for binding in self.bindings.iter() {
            let cell = row.value(binding.ordinal)?;
            if cell.is_null() {
                continue;
            }
            let value = match binding.enum_repr {
                Some(repr) => cell.narrow_integer(repr)?,
                None => cell.clone(),
            };
            target.set_field(binding.field_index, value)?;
        }
        Ok(target)
    }
}

impl<T> Clone for RowMapper<T> {
    fn clone(&self) -> Self {
        Self {
            bindings: self.bindings.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for RowMapper<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowMapper")
            .field("bindings", &self.bindings)
            .finish()
    }
}
