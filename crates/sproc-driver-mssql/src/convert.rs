//! Cell conversion from tiberius column data

use crate::MssqlError;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use sproc_core::Value;
use tiberius::{ColumnData, Row};

type Result<T> = std::result::Result<T, MssqlError>;

/// Convert a tiberius row into cells by consuming it
pub fn row_to_values(row: Row) -> Result<Vec<Value>> {
    row.into_iter().map(column_data_to_value).collect()
}

/// Convert one tiberius cell to a [`Value`]
pub fn column_data_to_value(col_data: ColumnData<'static>) -> Result<Value> {
    let value = match col_data {
        ColumnData::Bit(v) => v.map_or(Value::Null, Value::Bool),
        ColumnData::U8(v) => v.map_or(Value::Null, Value::UInt8),
        ColumnData::I16(v) => v.map_or(Value::Null, Value::Int16),
        ColumnData::I32(v) => v.map_or(Value::Null, Value::Int32),
        ColumnData::I64(v) => v.map_or(Value::Null, Value::Int64),
        ColumnData::F32(v) => v.map_or(Value::Null, Value::Float32),
        ColumnData::F64(v) => v.map_or(Value::Null, Value::Float64),
        ColumnData::String(v) => v.map_or(Value::Null, |s| Value::String(s.into_owned())),
        ColumnData::Guid(v) => v.map_or(Value::Null, Value::Uuid),
        ColumnData::Binary(v) => v.map_or(Value::Null, |b| Value::Bytes(b.into_owned())),
        ColumnData::Numeric(v) => v.map_or(Value::Null, |n| Value::Decimal(n.to_string())),
        ColumnData::Xml(v) => v.map_or(Value::Null, |x| {
            Value::String(x.into_owned().into_string())
        }),
        ColumnData::DateTime(None)
        | ColumnData::SmallDateTime(None)
        | ColumnData::DateTime2(None)
        | ColumnData::DateTimeOffset(None)
        | ColumnData::Date(None)
        | ColumnData::Time(None) => Value::Null,
        ColumnData::DateTime(Some(v)) => {
            let fragments = u64::from(v.seconds_fragments());
            let time = time_of_day(fragments / 300, (fragments % 300) * 1_000_000_000 / 300)?;
            Value::DateTime(NaiveDateTime::new(
                date_from_days(1900, i64::from(v.days()))?,
                time,
            ))
        }
        ColumnData::SmallDateTime(Some(v)) => {
            let time = time_of_day(u64::from(v.seconds_fragments()) * 60, 0)?;
            Value::DateTime(NaiveDateTime::new(
                date_from_days(1900, i64::from(v.days()))?,
                time,
            ))
        }
        ColumnData::DateTime2(Some(v)) => Value::DateTime(datetime2(&v)?),
        ColumnData::DateTimeOffset(Some(v)) => {
            // the stored date and time are already UTC; the offset is display only
            let naive = datetime2(&v.datetime2())?;
            Value::DateTimeUtc(naive.and_utc())
        }
        ColumnData::Date(Some(v)) => Value::Date(date_from_days(1, i64::from(v.days()))?),
        ColumnData::Time(Some(v)) => Value::Time(scaled_time(v.increments(), v.scale())?),
    };
    Ok(value)
}

fn date_from_days(base_year: i32, days: i64) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(base_year, 1, 1)
        .and_then(|base| base.checked_add_signed(Duration::days(days)))
        .ok_or_else(|| {
            MssqlError::TypeConversion(format!("{days} days after {base_year}-01-01 is out of range"))
        })
}

fn time_of_day(seconds: u64, nanos: u64) -> Result<NaiveTime> {
    let out_of_range =
        || MssqlError::TypeConversion(format!("{seconds}s {nanos}ns is not a time of day"));
    let seconds = u32::try_from(seconds).map_err(|_| out_of_range())?;
    let nanos = u32::try_from(nanos).map_err(|_| out_of_range())?;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos).ok_or_else(out_of_range)
}

/// Time stored as `increments` units of 10^-scale seconds
fn scaled_time(increments: u64, scale: u8) -> Result<NaiveTime> {
    let scale = u32::from(scale.min(9));
    let per_second = 10u64.pow(scale);
    let nanos_per_increment = 10u64.pow(9 - scale);
    time_of_day(
        increments / per_second,
        (increments % per_second) * nanos_per_increment,
    )
}

fn datetime2(v: &tiberius::time::DateTime2) -> Result<NaiveDateTime> {
    let date = date_from_days(1, i64::from(v.date().days()))?;
    let time = scaled_time(v.time().increments(), v.time().scale())?;
    Ok(NaiveDateTime::new(date, time))
}
