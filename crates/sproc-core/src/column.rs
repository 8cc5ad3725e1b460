//! Conversions between `Value` and concrete Rust types
//!
//! `ColumnValue` is the link between the semantic type tags and the Rust
//! types callers actually hold. Row mapping, output parameters, scalar reads
//! and typed inputs all go through it.

use crate::{ProcError, Result, ScalarKind, SemanticType, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

/// A Rust type that can be read from a cell or bound as a parameter
pub trait ColumnValue: Sized {
    /// Semantic type this Rust type maps to
    const SEMANTIC_TYPE: SemanticType;

    /// Underlying integer kind when the type is an enum stored as a number
    const ENUM_REPR: Option<ScalarKind> = None;

    /// Convert a non-null value
    fn from_value(value: Value) -> Result<Self>;

    /// Convert into a value suitable for binding
    fn into_value(self) -> Value;

    /// The absent representation, if this type has one.
    ///
    /// Only nullable-wrapped types (`Option<T>`) return `Some`.
    fn null_value() -> Option<Self> {
        None
    }
}

pub(crate) fn conversion_error(value: &Value, target: &str) -> ProcError {
    ProcError::Conversion(format!("cannot convert {} value to {}", value.describe(), target))
}

impl<T: ColumnValue> ColumnValue for Option<T> {
    const SEMANTIC_TYPE: SemanticType = T::SEMANTIC_TYPE.nullable();
    const ENUM_REPR: Option<ScalarKind> = T::ENUM_REPR;

    fn from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_value(value).map(Some)
    }

    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }

    fn null_value() -> Option<Self> {
        Some(None)
    }
}

macro_rules! impl_integer_column {
    ($ty:ty, $kind:ident, $variant:ident) => {
        impl ColumnValue for $ty {
            const SEMANTIC_TYPE: SemanticType = SemanticType::new(ScalarKind::$kind);

            fn from_value(value: Value) -> Result<Self> {
                let wide = value
                    .as_i64()
                    .ok_or_else(|| conversion_error(&value, stringify!($ty)))?;
                <$ty>::try_from(wide).map_err(|_| {
                    ProcError::Conversion(format!("{wide} does not fit in {}", stringify!($ty)))
                })
            }

            fn into_value(self) -> Value {
                Value::$variant(self.into())
            }
        }
    };
}

impl_integer_column!(i8, Int8, Int8);
impl_integer_column!(u8, UInt8, UInt8);
impl_integer_column!(i16, Int16, Int16);
impl_integer_column!(i32, Int32, Int32);
impl_integer_column!(i64, Int64, Int64);
impl_integer_column!(u16, UInt16, Int32);
impl_integer_column!(u32, UInt32, Int64);

impl ColumnValue for u64 {
    const SEMANTIC_TYPE: SemanticType = SemanticType::new(ScalarKind::UInt64);

    fn from_value(value: Value) -> Result<Self> {
        if let Value::Decimal(s) | Value::String(s) = &value {
            if let Ok(v) = s.parse::<u64>() {
                return Ok(v);
            }
        }
        let wide = value
            .as_i64()
            .ok_or_else(|| conversion_error(&value, "u64"))?;
        u64::try_from(wide).map_err(|_| ProcError::Conversion(format!("{wide} does not fit in u64")))
    }

    fn into_value(self) -> Value {
        match i64::try_from(self) {
            Ok(v) => Value::Int64(v),
            Err(_) => Value::Decimal(self.to_string()),
        }
    }
}

impl ColumnValue for bool {
    const SEMANTIC_TYPE: SemanticType = SemanticType::new(ScalarKind::Bool);

    fn from_value(value: Value) -> Result<Self> {
        value.as_bool().ok_or_else(|| conversion_error(&value, "bool"))
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl ColumnValue for f32 {
    const SEMANTIC_TYPE: SemanticType = SemanticType::new(ScalarKind::Float32);

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float32(v) => Ok(v),
            other => other
                .as_f64()
                .map(|v| v as f32)
                .ok_or_else(|| conversion_error(&other, "f32")),
        }
    }

    fn into_value(self) -> Value {
        Value::Float32(self)
    }
}

impl ColumnValue for f64 {
    const SEMANTIC_TYPE: SemanticType = SemanticType::new(ScalarKind::Float64);

    fn from_value(value: Value) -> Result<Self> {
        value.as_f64().ok_or_else(|| conversion_error(&value, "f64"))
    }

    fn into_value(self) -> Value {
        Value::Float64(self)
    }
}

impl ColumnValue for String {
    const SEMANTIC_TYPE: SemanticType = SemanticType::new(ScalarKind::Text);

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(s) | Value::Decimal(s) => Ok(s),
            Value::Uuid(u) => Ok(u.to_string()),
            Value::Json(j) => Ok(j.to_string()),
            other => Err(conversion_error(&other, "String")),
        }
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl ColumnValue for Vec<u8> {
    const SEMANTIC_TYPE: SemanticType = SemanticType::new(ScalarKind::Bytes);

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(b) => Ok(b),
            other => Err(conversion_error(&other, "Vec<u8>")),
        }
    }

    fn into_value(self) -> Value {
        Value::Bytes(self)
    }
}

impl ColumnValue for Uuid {
    const SEMANTIC_TYPE: SemanticType = SemanticType::new(ScalarKind::Uuid);

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Uuid(u) => Ok(u),
            Value::String(ref s) => Uuid::parse_str(s).map_err(|e| ProcError::Conversion(e.to_string())),
            other => Err(conversion_error(&other, "Uuid")),
        }
    }

    fn into_value(self) -> Value {
        Value::Uuid(self)
    }
}

impl ColumnValue for NaiveDate {
    const SEMANTIC_TYPE: SemanticType = SemanticType::new(ScalarKind::Date);

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(d) => Ok(d),
            Value::DateTime(dt) => Ok(dt.date()),
            Value::DateTimeUtc(dt) => Ok(dt.date_naive()),
            other => Err(conversion_error(&other, "NaiveDate")),
        }
    }

    fn into_value(self) -> Value {
        Value::Date(self)
    }
}

impl ColumnValue for NaiveTime {
    const SEMANTIC_TYPE: SemanticType = SemanticType::new(ScalarKind::Time);

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Time(t) => Ok(t),
            Value::DateTime(dt) => Ok(dt.time()),
            other => Err(conversion_error(&other, "NaiveTime")),
        }
    }

    fn into_value(self) -> Value {
        Value::Time(self)
    }
}

impl ColumnValue for NaiveDateTime {
    const SEMANTIC_TYPE: SemanticType = SemanticType::new(ScalarKind::DateTime);

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            Value::DateTimeUtc(dt) => Ok(dt.naive_utc()),
            Value::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
            other => Err(conversion_error(&other, "NaiveDateTime")),
        }
    }

    fn into_value(self) -> Value {
        Value::DateTime(self)
    }
}

impl ColumnValue for DateTime<Utc> {
    const SEMANTIC_TYPE: SemanticType = SemanticType::new(ScalarKind::DateTimeOffset);

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::DateTimeUtc(dt) => Ok(dt),
            Value::DateTime(dt) => Ok(dt.and_utc()),
            other => Err(conversion_error(&other, "DateTime<Utc>")),
        }
    }

    fn into_value(self) -> Value {
        Value::DateTimeUtc(self)
    }
}

impl ColumnValue for serde_json::Value {
    const SEMANTIC_TYPE: SemanticType = SemanticType::new(ScalarKind::Json);

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Json(j) => Ok(j),
            Value::String(s) => serde_json::from_str(&s).map_err(|e| ProcError::Conversion(e.to_string())),
            other => Err(conversion_error(&other, "serde_json::Value")),
        }
    }

    fn into_value(self) -> Value {
        Value::Json(self)
    }
}

/// Implement [`ColumnValue`] for a fieldless enum stored as an integer.
///
/// The enum needs `TryFrom<$repr>` and `$repr: From<$enum>`.
///
/// ```ignore
/// #[derive(Debug, Default, Clone, Copy, PartialEq)]
/// enum Status { #[default] Draft = 0, Published = 1 }
///
/// impl TryFrom<i32> for Status { /* ... */ }
/// impl From<Status> for i32 { fn from(s: Status) -> i32 { s as i32 } }
///
/// sproc_core::impl_enum_column!(Status, i32);
/// ```
#[macro_export]
macro_rules! impl_enum_column {
    ($enum:ty, $repr:ty) => {
        impl $crate::ColumnValue for $enum {
            const SEMANTIC_TYPE: $crate::SemanticType =
                <$repr as $crate::ColumnValue>::SEMANTIC_TYPE;
            const ENUM_REPR: ::core::option::Option<$crate::ScalarKind> =
                ::core::option::Option::Some(<$repr as $crate::ColumnValue>::SEMANTIC_TYPE.kind);

            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                let raw = <$repr as $crate::ColumnValue>::from_value(value)?;
                <$enum as ::core::convert::TryFrom<$repr>>::try_from(raw).map_err(|_| {
                    $crate::ProcError::Conversion(::std::format!(
                        "{} is not a valid {}",
                        raw,
                        ::core::stringify!($enum)
                    ))
                })
            }

            fn into_value(self) -> $crate::Value {
                <$repr as $crate::ColumnValue>::into_value(<$repr>::from(self))
            }
        }
    };
}
