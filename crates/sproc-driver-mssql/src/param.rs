//! Parameter encoding for tiberius

use crate::MssqlError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sproc_core::{StorageType, Value};
use sproc_params::{Parameter, ParameterCollection};
use std::borrow::Cow;
use tiberius::numeric::Numeric;
use tiberius::{ColumnData, ToSql};
use uuid::Uuid;

/// Largest character length NVARCHAR accepts before MAX
const NVARCHAR_LIMIT: u32 = 4000;
/// Largest byte length VARBINARY accepts before MAX
const VARBINARY_LIMIT: u32 = 8000;

/// A parameter value in the shape tiberius sends it.
///
/// Every variant carries its SQL type even when the value is NULL, so a
/// NULL input reaches the server typed as its declared storage type
/// instead of as an untyped NULL.
#[derive(Debug, Clone, PartialEq)]
pub enum MssqlParam {
    Bit(Option<bool>),
    TinyInt(Option<u8>),
    SmallInt(Option<i16>),
    Int(Option<i32>),
    BigInt(Option<i64>),
    Real(Option<f32>),
    Float(Option<f64>),
    /// Unscaled value and scale
    Decimal(Option<(i128, u8)>),
    NVarChar(Option<String>),
    VarBinary(Option<Vec<u8>>),
    UniqueIdentifier(Option<Uuid>),
    Date(Option<NaiveDate>),
    Time(Option<NaiveTime>),
    DateTime2(Option<NaiveDateTime>),
    DateTimeOffset(Option<DateTime<Utc>>),
}

impl MssqlParam {
    /// NULL typed as `storage`
    pub fn null(storage: StorageType) -> Self {
        match storage {
            StorageType::Boolean => MssqlParam::Bit(None),
            StorageType::Byte => MssqlParam::TinyInt(None),
            StorageType::SByte | StorageType::Int16 => MssqlParam::SmallInt(None),
            StorageType::Int32 => MssqlParam::Int(None),
            StorageType::Int64 => MssqlParam::BigInt(None),
            StorageType::Single => MssqlParam::Real(None),
            StorageType::Double => MssqlParam::Float(None),
            StorageType::Decimal => MssqlParam::Decimal(None),
            StorageType::String => MssqlParam::NVarChar(None),
            StorageType::Binary => MssqlParam::VarBinary(None),
            StorageType::Guid => MssqlParam::UniqueIdentifier(None),
            StorageType::Date => MssqlParam::Date(None),
            StorageType::Time => MssqlParam::Time(None),
            StorageType::DateTime2 => MssqlParam::DateTime2(None),
            StorageType::DateTimeOffset => MssqlParam::DateTimeOffset(None),
        }
    }

    /// Encode `value` as `storage`
    pub fn encode(storage: StorageType, value: &Value) -> Result<Self, String> {
        if value.is_null() {
            return Ok(Self::null(storage));
        }
        let mismatch = || format!("{} value is not accepted", value.describe());

        let param = match storage {
            StorageType::Boolean => MssqlParam::Bit(Some(value.as_bool().ok_or_else(mismatch)?)),
            StorageType::Byte => MssqlParam::TinyInt(Some(narrow(value)?)),
            StorageType::SByte | StorageType::Int16 => MssqlParam::SmallInt(Some(narrow(value)?)),
            StorageType::Int32 => MssqlParam::Int(Some(narrow(value)?)),
            StorageType::Int64 => MssqlParam::BigInt(Some(narrow(value)?)),
            StorageType::Single => {
                MssqlParam::Real(Some(value.as_f64().ok_or_else(mismatch)? as f32))
            }
            StorageType::Double => MssqlParam::Float(Some(value.as_f64().ok_or_else(mismatch)?)),
            StorageType::Decimal => {
                let parts = match value {
                    Value::Decimal(s) | Value::String(s) => parse_decimal(s),
                    Value::Float32(_) | Value::Float64(_) => {
                        value.as_f64().and_then(|f| parse_decimal(&f.to_string()))
                    }
                    other => other.as_i64().map(|i| (i128::from(i), 0)),
                };
                MssqlParam::Decimal(Some(parts.ok_or_else(mismatch)?))
            }
            StorageType::String => {
                MssqlParam::NVarChar(Some(value.as_str().ok_or_else(mismatch)?.to_owned()))
            }
            StorageType::Binary => match value {
                Value::Bytes(b) => MssqlParam::VarBinary(Some(b.clone())),
                _ => return Err(mismatch()),
            },
            StorageType::Guid => match value {
                Value::Uuid(u) => MssqlParam::UniqueIdentifier(Some(*u)),
                Value::String(s) => MssqlParam::UniqueIdentifier(Some(
                    Uuid::parse_str(s).map_err(|e| e.to_string())?,
                )),
                _ => return Err(mismatch()),
            },
            StorageType::Date => match value {
                Value::Date(d) => MssqlParam::Date(Some(*d)),
                _ => return Err(mismatch()),
            },
            StorageType::Time => match value {
                Value::Time(t) => MssqlParam::Time(Some(*t)),
                _ => return Err(mismatch()),
            },
            StorageType::DateTime2 => match value {
                Value::DateTime(dt) => MssqlParam::DateTime2(Some(*dt)),
                Value::DateTimeUtc(dt) => MssqlParam::DateTime2(Some(dt.naive_utc())),
                _ => return Err(mismatch()),
            },
            StorageType::DateTimeOffset => match value {
                Value::DateTimeUtc(dt) => MssqlParam::DateTimeOffset(Some(*dt)),
                Value::DateTime(dt) => MssqlParam::DateTimeOffset(Some(dt.and_utc())),
                _ => return Err(mismatch()),
            },
        };
        Ok(param)
    }

    pub fn from_parameter(parameter: &Parameter) -> Result<Self, MssqlError> {
        let storage = parameter.storage_type();
        Self::encode(storage, &parameter.value()).map_err(|reason| {
            MssqlError::InvalidParameter {
                parameter: parameter.name().to_string(),
                storage,
                reason,
            }
        })
    }
}

impl ToSql for MssqlParam {
    fn to_sql(&self) -> ColumnData<'_> {
        match self {
            MssqlParam::Bit(v) => ColumnData::Bit(*v),
            MssqlParam::TinyInt(v) => ColumnData::U8(*v),
            MssqlParam::SmallInt(v) => ColumnData::I16(*v),
            MssqlParam::Int(v) => ColumnData::I32(*v),
            MssqlParam::BigInt(v) => ColumnData::I64(*v),
            MssqlParam::Real(v) => ColumnData::F32(*v),
            MssqlParam::Float(v) => ColumnData::F64(*v),
            MssqlParam::Decimal(v) => ColumnData::Numeric(
                v.map(|(value, scale)| Numeric::new_with_scale(value, scale)),
            ),
            MssqlParam::NVarChar(v) => ColumnData::String(v.as_deref().map(Cow::Borrowed)),
            MssqlParam::VarBinary(v) => ColumnData::Binary(v.as_deref().map(Cow::Borrowed)),
            MssqlParam::UniqueIdentifier(v) => ColumnData::Guid(*v),
            MssqlParam::Date(Some(d)) => d.to_sql(),
            MssqlParam::Date(None) => ColumnData::Date(None),
            MssqlParam::Time(Some(t)) => t.to_sql(),
            MssqlParam::Time(None) => ColumnData::Time(None),
            MssqlParam::DateTime2(Some(dt)) => dt.to_sql(),
            MssqlParam::DateTime2(None) => ColumnData::DateTime2(None),
            MssqlParam::DateTimeOffset(Some(dt)) => dt.to_sql(),
            MssqlParam::DateTimeOffset(None) => ColumnData::DateTimeOffset(None),
        }
    }
}

/// Encode every parameter whose value is sent to the routine, in binding order
pub fn input_params(collection: &ParameterCollection) -> Result<Vec<MssqlParam>, MssqlError> {
    collection.inputs().map(MssqlParam::from_parameter).collect()
}

/// T-SQL type declaration for a storage type, e.g. `NVARCHAR(255)`.
///
/// Without a size, or past the type's inline limit, character and binary
/// types are declared `MAX`.
pub fn sql_type_name(storage: StorageType, size: Option<u32>) -> String {
    let sized = |name: &str, limit: u32| match size {
        Some(n) if n > 0 && n <= limit => format!("{name}({n})"),
        _ => format!("{name}(MAX)"),
    };
    match storage {
        StorageType::Boolean => "BIT".into(),
        StorageType::Byte => "TINYINT".into(),
        StorageType::SByte | StorageType::Int16 => "SMALLINT".into(),
        StorageType::Int32 => "INT".into(),
        StorageType::Int64 => "BIGINT".into(),
        StorageType::Single => "REAL".into(),
        StorageType::Double => "FLOAT".into(),
        StorageType::Decimal => "DECIMAL(38, 18)".into(),
        StorageType::String => sized("NVARCHAR", NVARCHAR_LIMIT),
        StorageType::Binary => sized("VARBINARY", VARBINARY_LIMIT),
        StorageType::Guid => "UNIQUEIDENTIFIER".into(),
        StorageType::Date => "DATE".into(),
        StorageType::Time => "TIME(7)".into(),
        StorageType::DateTime2 => "DATETIME2(7)".into(),
        StorageType::DateTimeOffset => "DATETIMEOFFSET(7)".into(),
    }
}

fn narrow<T: TryFrom<i64>>(value: &Value) -> Result<T, String> {
    let wide = value
        .as_i64()
        .ok_or_else(|| format!("{} value is not an integer", value.describe()))?;
    T::try_from(wide).map_err(|_| format!("{wide} is out of range"))
}

/// Split decimal text into an unscaled integer and a scale
pub(crate) fn parse_decimal(text: &str) -> Option<(i128, u8)> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    let scale = u8::try_from(fraction.len()).ok().filter(|s| *s <= 37)?;

    let mut magnitude: i128 = 0;
    for c in whole.chars().chain(fraction.chars()) {
        let digit = c.to_digit(10)?;
        magnitude = magnitude.checked_mul(10)?.checked_add(i128::from(digit))?;
    }
    Some((if negative { -magnitude } else { magnitude }, scale))
}
