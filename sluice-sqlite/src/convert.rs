use anyhow::anyhow;
use rusqlite::types::{ToSql, ToSqlOutput, Value as SqliteValue, ValueRef};
use sluice_core::Value;
use time::{format_description::BorrowedFormatItem, macros::format_description};

const DATE: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");
const TIME: &[BorrowedFormatItem<'_>] =
    format_description!("[hour]:[minute]:[second].[subsecond]");
const TIMESTAMP: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]");
const TIMESTAMP_WITH_TIMEZONE: &[BorrowedFormatItem<'_>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]"
);

/// Parameter value as bound to a sqlite statement.
///
/// Sqlite has no temporal, decimal or uuid storage class, those values are stored as text and
/// read back through the coercions of [`sluice_core::AsValue`].
pub(crate) struct Bind<'a>(pub(crate) &'a Value);

fn failure(error: impl Into<anyhow::Error>) -> rusqlite::Error {
    rusqlite::Error::ToSqlConversionFailure(error.into().into())
}

impl ToSql for Bind<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        if self.0.is_null() {
            return Ok(ToSqlOutput::Owned(SqliteValue::Null));
        }
        let integer = |v: i64| Ok(ToSqlOutput::Owned(SqliteValue::Integer(v)));
        let text = |v: String| Ok(ToSqlOutput::Owned(SqliteValue::Text(v)));
        match self.0 {
            Value::Boolean(Some(v)) => integer(*v as i64),
            Value::Int8(Some(v)) => integer(*v as i64),
            Value::Int16(Some(v)) => integer(*v as i64),
            Value::Int32(Some(v)) => integer(*v as i64),
            Value::Int64(Some(v)) => integer(*v),
            Value::UInt8(Some(v)) => integer(*v as i64),
            Value::UInt16(Some(v)) => integer(*v as i64),
            Value::UInt32(Some(v)) => integer(*v as i64),
            Value::UInt64(Some(v)) => integer(i64::try_from(*v).map_err(failure)?),
            Value::Float32(Some(v)) => Ok(ToSqlOutput::Owned(SqliteValue::Real(*v as f64))),
            Value::Float64(Some(v)) => Ok(ToSqlOutput::Owned(SqliteValue::Real(*v))),
            Value::Decimal(Some(v)) => text(v.to_string()),
            Value::Char(Some(v)) => text(v.to_string()),
            Value::Varchar(Some(v)) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            Value::Blob(Some(v)) => Ok(ToSqlOutput::Borrowed(ValueRef::Blob(v))),
            Value::Date(Some(v)) => text(v.format(DATE).map_err(failure)?),
            Value::Time(Some(v)) => text(v.format(TIME).map_err(failure)?),
            Value::Timestamp(Some(v)) => text(v.format(TIMESTAMP).map_err(failure)?),
            Value::TimestampWithTimezone(Some(v)) => {
                text(v.format(TIMESTAMP_WITH_TIMEZONE).map_err(failure)?)
            }
            Value::Uuid(Some(v)) => text(v.hyphenated().to_string()),
            v => Err(failure(anyhow!(
                "Sqlite cannot bind a value of type {}",
                v.type_name()
            ))),
        }
    }
}

pub(crate) fn extract_value(value: ValueRef<'_>) -> anyhow::Result<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Int64(Some(v)),
        ValueRef::Real(v) => Value::Float64(Some(v)),
        ValueRef::Text(v) => Value::Varchar(Some(String::from_utf8(v.to_vec())?)),
        ValueRef::Blob(v) => Value::Blob(Some(v.into())),
    })
}
