//! Core value and type tags for SPROC

use crate::{ProcError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A cell or parameter value that can represent any SQL type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean
    Bool(bool),
    /// 8-bit signed integer
    Int8(i8),
    /// 8-bit unsigned integer (SQL Server TINYINT)
    UInt8(u8),
    /// 16-bit signed integer
    Int16(i16),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 32-bit floating point
    Float32(f32),
    /// 64-bit floating point
    Float64(f64),
    /// Decimal/Numeric (stored as string for precision)
    Decimal(String),
    /// UTF-8 string
    String(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// UUID
    Uuid(Uuid),
    /// Date (year, month, day)
    Date(NaiveDate),
    /// Time (hour, minute, second, nanosecond)
    Time(NaiveTime),
    /// DateTime without timezone
    DateTime(NaiveDateTime),
    /// DateTime with timezone (UTC)
    DateTimeUtc(DateTime<Utc>),
    /// JSON value
    Json(serde_json::Value),
    /// Array of values
    Array(Vec<Value>),
}

impl Value {
    /// Check if the value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The semantic kind carried by this value, `None` for NULL
    pub fn kind(&self) -> Option<ScalarKind> {
        let kind = match self {
            Value::Null => return None,
            Value::Bool(_) => ScalarKind::Bool,
            Value::Int8(_) => ScalarKind::Int8,
            Value::UInt8(_) => ScalarKind::UInt8,
            Value::Int16(_) => ScalarKind::Int16,
            Value::Int32(_) => ScalarKind::Int32,
            Value::Int64(_) => ScalarKind::Int64,
            Value::Float32(_) => ScalarKind::Float32,
            Value::Float64(_) => ScalarKind::Float64,
            Value::Decimal(_) => ScalarKind::Decimal,
            Value::String(_) => ScalarKind::Text,
            Value::Bytes(_) => ScalarKind::Bytes,
            Value::Uuid(_) => ScalarKind::Uuid,
            Value::Date(_) => ScalarKind::Date,
            Value::Time(_) => ScalarKind::Time,
            Value::DateTime(_) => ScalarKind::DateTime,
            Value::DateTimeUtc(_) => ScalarKind::DateTimeOffset,
            Value::Json(_) => ScalarKind::Json,
            Value::Array(_) => ScalarKind::Array,
        };
        Some(kind)
    }

    /// Try to get as a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Bool(v) => Some(*v as i64),
            Value::Int8(v) => Some(*v as i64),
            Value::UInt8(v) => Some(*v as i64),
            Value::Int16(v) => Some(*v as i64),
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            Value::Decimal(s) | Value::String(s) => s.parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Try to get as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float32(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            Value::Decimal(s) | Value::String(s) => s.parse::<f64>().ok(),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            Value::Int8(_) | Value::UInt8(_) | Value::Int16(_) | Value::Int32(_) | Value::Int64(_) => {
                match self.as_i64() {
                    Some(0) => Some(false),
                    Some(1) => Some(true),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Narrow an integer cell to the given integer kind.
    ///
    /// Used for enum-typed fields, whose cells arrive in whatever width the
    /// server chose and must fit the enum's underlying representation.
    pub fn narrow_integer(&self, kind: ScalarKind) -> Result<Value> {
        let wide = self
            .as_i64()
            .ok_or_else(|| ProcError::Conversion(format!("{} is not an integer", self.describe())))?;
        let out_of_range =
            || ProcError::Conversion(format!("{wide} does not fit in {}", kind.name()));
        let narrowed = match kind {
            ScalarKind::Int8 => Value::Int8(i8::try_from(wide).map_err(|_| out_of_range())?),
            ScalarKind::UInt8 => Value::UInt8(u8::try_from(wide).map_err(|_| out_of_range())?),
            ScalarKind::Int16 => Value::Int16(i16::try_from(wide).map_err(|_| out_of_range())?),
            ScalarKind::Int32 => Value::Int32(i32::try_from(wide).map_err(|_| out_of_range())?),
            ScalarKind::Int64 => Value::Int64(wide),
            ScalarKind::UInt16 => {
                u16::try_from(wide).map_err(|_| out_of_range())?;
                Value::Int32(wide as i32)
            }
            ScalarKind::UInt32 | ScalarKind::UInt64 => {
                if wide < 0 {
                    return Err(out_of_range());
                }
                Value::Int64(wide)
            }
            other => {
                return Err(ProcError::Conversion(format!(
                    "{} is not an integer representation",
                    other.name()
                )));
            }
        };
        Ok(narrowed)
    }

    /// Short description used in error messages
    pub fn describe(&self) -> &'static str {
        self.kind().map(ScalarKind::name).unwrap_or("NULL")
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int8(v) => write!(f, "{}", v),
            Value::UInt8(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Uuid(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "{}", v),
            Value::Time(v) => write!(f, "{}", v),
            Value::DateTime(v) => write!(f, "{}", v),
            Value::DateTimeUtc(v) => write!(f, "{}", v),
            Value::Json(v) => write!(f, "{}", v),
            Value::Array(v) => write!(f, "[{} items]", v.len()),
        }
    }
}

/// Abstract value category, independent of any storage spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    Bool,
    Int8,
    UInt8,
    Int16,
    Int32,
    Int64,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Decimal,
    Text,
    Bytes,
    Uuid,
    Date,
    Time,
    DateTime,
    DateTimeOffset,
    Json,
    Array,
}

impl ScalarKind {
    pub const fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int8 => "int8",
            ScalarKind::UInt8 => "uint8",
            ScalarKind::Int16 => "int16",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::UInt16 => "uint16",
            ScalarKind::UInt32 => "uint32",
            ScalarKind::UInt64 => "uint64",
            ScalarKind::Float32 => "float32",
            ScalarKind::Float64 => "float64",
            ScalarKind::Decimal => "decimal",
            ScalarKind::Text => "text",
            ScalarKind::Bytes => "bytes",
            ScalarKind::Uuid => "uuid",
            ScalarKind::Date => "date",
            ScalarKind::Time => "time",
            ScalarKind::DateTime => "datetime",
            ScalarKind::DateTimeOffset => "datetimeoffset",
            ScalarKind::Json => "json",
            ScalarKind::Array => "array",
        }
    }
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A scalar kind plus whether SQL NULL is a legal value for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemanticType {
    pub kind: ScalarKind,
    pub nullable: bool,
}

impl SemanticType {
    pub const fn new(kind: ScalarKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    /// The nullable-wrapped form of this type
    pub const fn nullable(self) -> Self {
        Self {
            kind: self.kind,
            nullable: true,
        }
    }
}

impl From<ScalarKind> for SemanticType {
    fn from(kind: ScalarKind) -> Self {
        SemanticType::new(kind)
    }
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.nullable {
            write!(f, "{}?", self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

/// Storage type tag a parameter is declared with on the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageType {
    Boolean,
    Byte,
    SByte,
    Int16,
    Int32,
    Int64,
    Single,
    Double,
    Decimal,
    String,
    Binary,
    Guid,
    Date,
    Time,
    DateTime2,
    DateTimeOffset,
}

impl StorageType {
    /// Whether a fixed size bounds the character width of this type
    pub fn is_character(self) -> bool {
        matches!(self, StorageType::String)
    }
}
