use crate::{Error, ErrorKind, Result, Value};
use std::fmt::{self, Display};

/// Abstract database type tag attached to every bound parameter.
///
/// `Object` means "not yet resolved": it is replaced by a concrete tag right before binding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbType {
    #[default]
    Object,
    /// Database null marker.
    Null,
    Boolean,
    SByte,
    Int16,
    Int32,
    Int64,
    Byte,
    UInt16,
    UInt32,
    UInt64,
    Single,
    Double,
    Decimal,
    StringFixedLength,
    String,
    AnsiString,
    Binary,
    Date,
    Time,
    DateTime,
    DateTimeOffset,
    Guid,
}

impl DbType {
    /// Default runtime type table.
    pub fn for_value(value: &Value) -> Option<DbType> {
        Some(match value {
            Value::Null => DbType::Null,
            Value::Boolean(..) => DbType::Boolean,
            Value::Int8(..) => DbType::SByte,
            Value::Int16(..) => DbType::Int16,
            Value::Int32(..) => DbType::Int32,
            Value::Int64(..) => DbType::Int64,
            Value::UInt8(..) => DbType::Byte,
            Value::UInt16(..) => DbType::UInt16,
            Value::UInt32(..) => DbType::UInt32,
            Value::UInt64(..) => DbType::UInt64,
            Value::Float32(..) => DbType::Single,
            Value::Float64(..) => DbType::Double,
            Value::Decimal(..) => DbType::Decimal,
            Value::Char(..) => DbType::StringFixedLength,
            Value::Varchar(..) => DbType::String,
            Value::Blob(..) => DbType::Binary,
            Value::Date(..) => DbType::Date,
            Value::Time(..) => DbType::Time,
            Value::Timestamp(..) => DbType::DateTime,
            Value::TimestampWithTimezone(..) => DbType::DateTimeOffset,
            Value::Uuid(..) => DbType::Guid,
            Value::List(..) => return None,
        })
    }

    pub fn is_resolved(&self) -> bool {
        *self != DbType::Object
    }
}

impl Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Resolves the type tag of the parameter `name` before it gets bound.
///
/// A concrete declared tag wins, a null value resolves to [`DbType::Null`], anything else goes
/// through `table`.
pub fn resolve_db_type(
    name: &str,
    value: &Value,
    declared: DbType,
    table: impl FnOnce(&Value) -> Option<DbType>,
) -> Result<DbType> {
    if declared.is_resolved() {
        return Ok(declared);
    }
    if value.is_null() {
        return Ok(DbType::Null);
    }
    table(value)
        .filter(DbType::is_resolved)
        .ok_or_else(|| Error::new(ErrorKind::UnsupportedParameterType(name.to_string())))
}
