//! Column bindings and the process-wide binding cache

use crate::FromRow;
use parking_lot::RwLock;
use sproc_core::{CursorSchema, ScalarKind};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// Binds one cursor column to one target field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    pub ordinal: usize,
    pub field_index: usize,
    pub field_name: &'static str,
    pub enum_repr: Option<ScalarKind>,
}

/// Every binding for one (type, schema) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBindings {
    type_name: &'static str,
    bindings: Vec<ColumnBinding>,
}

impl ColumnBindings {
    /// Align `T`'s fields with the schema's columns.
    ///
    /// Columns match fields ignoring ASCII case. Columns with no field are
    /// skipped and fields with no column are left out, so they keep their
    /// default. If several columns fold to the same field name, the lowest
    /// ordinal wins.
    pub fn build<T: FromRow>(schema: &CursorSchema) -> Self {
        let type_name = std::any::type_name::<T>();
        let mut bindings = Vec::new();

        for (field_index, field) in T::fields().iter().enumerate() {
            let mut matches = schema
                .columns()
                .iter()
                .enumerate()
                .filter(|(_, column)| column.eq_ignore_ascii_case(field.name))
                .map(|(ordinal, _)| ordinal);

            let Some(ordinal) = matches.next() else {
                continue;
            };
            let shadowed: Vec<usize> = matches.collect();
            if !shadowed.is_empty() {
                // TODO: decide with callers whether ambiguous columns should be rejected
                tracing::warn!(
                    target_type = type_name,
                    field = field.name,
                    ordinal,
                    ?shadowed,
                    "several columns match field ignoring case; using the first"
                );
            }

            bindings.push(ColumnBinding {
                ordinal,
                field_index,
                field_name: field.name,
                enum_repr: field.enum_repr,
            });
        }

        Self {
            type_name,
            bindings,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BindingKey {
    type_id: TypeId,
    schema: CursorSchema,
}

static GLOBAL_CACHE: LazyLock<BindingCache> = LazyLock::new(BindingCache::new);

/// Cache of column bindings keyed by (type, schema).
///
/// Entries are never replaced once stored. When two threads build the same
/// key at once, the first insert wins and both callers get that entry.
#[derive(Debug, Default)]
pub struct BindingCache {
    entries: RwLock<HashMap<BindingKey, Arc<ColumnBindings>>>,
}

impl BindingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by every mapper in the process
    pub fn global() -> &'static BindingCache {
        &GLOBAL_CACHE
    }

    pub fn get_or_build<T: FromRow>(&self, schema: &CursorSchema) -> Arc<ColumnBindings> {
        let key = BindingKey {
            type_id: TypeId::of::<T>(),
            schema: schema.clone(),
        };

        if let Some(found) = self.entries.read().get(&key) {
            tracing::trace!(target_type = found.type_name(), "binding cache hit");
            return found.clone();
        }

        let built = Arc::new(ColumnBindings::build::<T>(schema));
        tracing::debug!(
            target_type = built.type_name(),
            columns = schema.column_count(),
            bound = built.len(),
            "binding cache miss, built column bindings"
        );

        self.entries.write().entry(key).or_insert(built).clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
