//! Tests for tiberius cell conversion

use crate::convert::column_data_to_value;
use chrono::{NaiveDate, NaiveTime};
use pretty_assertions::assert_eq;
use rstest::rstest;
use sproc_core::Value;
use std::borrow::Cow;
use tiberius::ColumnData;
use tiberius::time::{Date, DateTime, DateTime2, DateTimeOffset, SmallDateTime, Time};

fn days_since(base: NaiveDate, date: NaiveDate) -> i64 {
    (date - base).num_days()
}

fn day_one() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap()
}

fn day_1900() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()
}

#[rstest]
#[case(ColumnData::Bit(None))]
#[case(ColumnData::I32(None))]
#[case(ColumnData::String(None))]
#[case(ColumnData::Numeric(None))]
#[case(ColumnData::Date(None))]
#[case(ColumnData::DateTimeOffset(None))]
fn test_typed_nulls_become_null(#[case] data: ColumnData<'static>) {
    assert_eq!(column_data_to_value(data).unwrap(), Value::Null);
}

#[test]
fn test_scalar_cells() {
    assert_eq!(
        column_data_to_value(ColumnData::Bit(Some(true))).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        column_data_to_value(ColumnData::U8(Some(200))).unwrap(),
        Value::UInt8(200)
    );
    assert_eq!(
        column_data_to_value(ColumnData::I64(Some(-5))).unwrap(),
        Value::Int64(-5)
    );
    assert_eq!(
        column_data_to_value(ColumnData::String(Some(Cow::Borrowed("abc")))).unwrap(),
        Value::String("abc".into())
    );
    assert_eq!(
        column_data_to_value(ColumnData::Binary(Some(Cow::Owned(vec![1, 2])))).unwrap(),
        Value::Bytes(vec![1, 2])
    );
}

#[test]
fn test_date_and_scaled_time() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let days = days_since(day_one(), date) as u32;
    assert_eq!(
        column_data_to_value(ColumnData::Date(Some(Date::new(days)))).unwrap(),
        Value::Date(date)
    );

    // 13:30:15.5 at scale 1
    let increments = (13 * 3600 + 30 * 60 + 15) * 10 + 5;
    assert_eq!(
        column_data_to_value(ColumnData::Time(Some(Time::new(increments, 1)))).unwrap(),
        Value::Time(NaiveTime::from_hms_milli_opt(13, 30, 15, 500).unwrap())
    );
}

#[test]
fn test_datetime2_and_offset() {
    let date = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let days = days_since(day_one(), date) as u32;
    let increments = 3600 * 10_000_000u64;
    let dt2 = DateTime2::new(Date::new(days), Time::new(increments, 7));
    let expected = date.and_hms_opt(1, 0, 0).unwrap();

    assert_eq!(
        column_data_to_value(ColumnData::DateTime2(Some(dt2))).unwrap(),
        Value::DateTime(expected)
    );
    assert_eq!(
        column_data_to_value(ColumnData::DateTimeOffset(Some(DateTimeOffset::new(dt2, 120))))
            .unwrap(),
        Value::DateTimeUtc(expected.and_utc())
    );
}

#[test]
fn test_legacy_datetime_types() {
    let date = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
    let days = days_since(day_1900(), date);

    // 300 fragments per second
    let datetime = DateTime::new(days as i32, 300 * 60);
    assert_eq!(
        column_data_to_value(ColumnData::DateTime(Some(datetime))).unwrap(),
        Value::DateTime(date.and_hms_opt(0, 1, 0).unwrap())
    );

    let small = SmallDateTime::new(days as u16, 90);
    assert_eq!(
        column_data_to_value(ColumnData::SmallDateTime(Some(small))).unwrap(),
        Value::DateTime(date.and_hms_opt(1, 30, 0).unwrap())
    );
}
