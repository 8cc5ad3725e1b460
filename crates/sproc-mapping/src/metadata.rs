//! Target type metadata
//!
//! A mapped type describes its fields once, as a static table, instead of
//! being inspected row by row. [`impl_from_row!`](crate::impl_from_row)
//! generates the table and the field setter from the struct's field list.

use sproc_core::{ColumnValue, Result, ScalarKind, SemanticType, Value};

/// One field of a mapped type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDef {
    /// Column name the field binds to (matched ignoring ASCII case)
    pub name: &'static str,
    pub semantic_type: SemanticType,
    /// Underlying integer kind for enum-typed fields
    pub enum_repr: Option<ScalarKind>,
}

impl FieldDef {
    pub const fn of<T: ColumnValue>(name: &'static str) -> Self {
        Self {
            name,
            semantic_type: T::SEMANTIC_TYPE,
            enum_repr: T::ENUM_REPR,
        }
    }
}

/// A type that can be built from one cursor row
pub trait FromRow: Default + 'static {
    /// Ordered field table
    fn fields() -> &'static [FieldDef];

    /// Assign a non-null cell to the field at `index` in [`fields`](Self::fields)
    fn set_field(&mut self, index: usize, value: Value) -> Result<()>;
}

/// Implement [`FromRow`] for a struct by listing its mapped fields.
///
/// Each field binds to the column of the same name unless an explicit
/// column name is given with `as`. Fields not listed keep their default.
///
/// ```ignore
/// #[derive(Debug, Default)]
/// struct Model {
///     id: i64,
///     name: Option<String>,
///     date: NaiveDateTime,
///     name_with_underscore: Flag,
/// }
///
/// sproc_mapping::impl_from_row!(Model {
///     id: i64,
///     name: Option<String>,
///     date: NaiveDateTime,
///     name_with_underscore as "NameWithUnderscore": Flag,
/// });
/// ```
#[macro_export]
macro_rules! impl_from_row {
    ($ty:ty { $($field:ident $(as $column:literal)? : $fty:ty),+ $(,)? }) => {
        impl $crate::FromRow for $ty {
            fn fields() -> &'static [$crate::FieldDef] {
                const FIELDS: &[$crate::FieldDef] = &[
                    $($crate::FieldDef::of::<$fty>($crate::__column_name!($field $(, $column)?)),)+
                ];
                FIELDS
            }

            fn set_field(
                &mut self,
                index: usize,
                value: $crate::__private::Value,
            ) -> $crate::__private::Result<()> {
                type Setter = fn(&mut $ty, $crate::__private::Value) -> $crate::__private::Result<()>;
                const SETTERS: &[Setter] = &[
                    $(|target: &mut $ty, value: $crate::__private::Value| -> $crate::__private::Result<()> {
                        target.$field = <$fty as $crate::__private::ColumnValue>::from_value(value)?;
                        ::core::result::Result::Ok(())
                    },)+
                ];
                match SETTERS.get(index) {
                    ::core::option::Option::Some(set) => set(self, value),
                    ::core::option::Option::None => ::core::result::Result::Err(
                        $crate::__private::ProcError::Conversion(::std::format!(
                            "{} has no field #{}",
                            ::core::stringify!($ty),
                            index
                        )),
                    ),
                }
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __column_name {
    ($field:ident) => {
        ::core::stringify!($field)
    };
    ($field:ident, $column:literal) => {
        $column
    };
}
