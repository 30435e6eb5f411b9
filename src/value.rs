//! Conversions between Rust field types and bound `sea_query::Value`s.
//!
//! Each supported Rust type carries the [`SqlType`] it is declared with, so a
//! schema field's SQL type is fixed by the type of its accessor rather than by a
//! separate annotation that could disagree with it.
//!
//! | `SqlType` | Rust type |
//! |---|---|
//! | `Int` | `i32` |
//! | `Varchar` | `String` |
//! | `BigDecimal` | `rust_decimal::Decimal` |
//! | `Boolean` | `bool` |
//! | `Time` | `chrono::NaiveTime` |
//! | `Timestamp` | `chrono::NaiveDateTime` |
//!
//! `Option<T>` is the nullable form of each.

use crate::schema::SqlType;
use chrono::{NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use sea_query::{Value, ValueType};

/// Error type for value extraction failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueExtractionError {
    /// The value is null (None variant)
    NullValue,
    /// The value type doesn't match the expected type
    TypeMismatch { expected: String, actual: String },
    /// Value conversion failed (e.g., overflow, invalid format)
    ConversionError(String),
}

impl std::fmt::Display for ValueExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueExtractionError::NullValue => write!(f, "Value is null"),
            ValueExtractionError::TypeMismatch { expected, actual } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, actual)
            }
            ValueExtractionError::ConversionError(msg) => {
                write!(f, "Conversion error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ValueExtractionError {}

/// A Rust type that can be stored in a column of a fixed [`SqlType`].
///
/// ```rust
/// use repomap::{SqlType, SqlValue};
/// use sea_query::Value;
///
/// assert_eq!(<i32 as SqlValue>::SQL_TYPE, SqlType::Int);
/// assert_eq!(i32::from_value(Value::Int(Some(42))), Ok(42));
/// assert_eq!(<Option<i32>>::from_value(Value::Int(None)), Ok(None));
/// ```
pub trait SqlValue: Sized {
    /// The column type values of this Rust type are stored as
    const SQL_TYPE: SqlType;

    /// Convert into a bindable value.
    fn into_value(self) -> Value;

    /// Extract from a value read out of a result row.
    ///
    /// Returns:
    /// - `Err(ValueExtractionError::NullValue)` if the value is null
    /// - `Err(ValueExtractionError::TypeMismatch)` if the value holds another type
    fn from_value(value: Value) -> Result<Self, ValueExtractionError>;
}

/// Whether a value is the NULL of its variant.
pub fn is_null(value: &Value) -> bool {
    matches!(
        value,
        Value::Bool(None)
            | Value::TinyInt(None)
            | Value::SmallInt(None)
            | Value::Int(None)
            | Value::BigInt(None)
            | Value::TinyUnsigned(None)
            | Value::SmallUnsigned(None)
            | Value::Unsigned(None)
            | Value::BigUnsigned(None)
            | Value::Float(None)
            | Value::Double(None)
            | Value::String(None)
            | Value::Bytes(None)
            | Value::Decimal(None)
            | Value::ChronoTime(None)
            | Value::ChronoDateTime(None)
    )
}

macro_rules! impl_sql_value {
    ($type:ty, $sql_type:ident, $expected:expr) => {
        impl SqlValue for $type {
            const SQL_TYPE: SqlType = SqlType::$sql_type;

            fn into_value(self) -> Value {
                Value::from(self)
            }

            fn from_value(value: Value) -> Result<Self, ValueExtractionError> {
                if is_null(&value) {
                    return Err(ValueExtractionError::NullValue);
                }
                <$type as ValueType>::try_from(value.clone()).map_err(|_| {
                    ValueExtractionError::TypeMismatch {
                        expected: $expected.to_string(),
                        actual: format!("{:?}", value),
                    }
                })
            }
        }
    };
}

impl_sql_value!(String, Varchar, "String");
impl_sql_value!(bool, Boolean, "Bool");
impl_sql_value!(Decimal, BigDecimal, "Decimal");
impl_sql_value!(NaiveTime, Time, "ChronoTime");
impl_sql_value!(NaiveDateTime, Timestamp, "ChronoDateTime");

// Integers may come back widened (e.g. `count(*)` style expressions); narrow with a range check.
impl SqlValue for i32 {
    const SQL_TYPE: SqlType = SqlType::Int;

    fn into_value(self) -> Value {
        Value::Int(Some(self))
    }

    fn from_value(value: Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Int(Some(v)) => Ok(v),
            Value::SmallInt(Some(v)) => Ok(i32::from(v)),
            Value::BigInt(Some(v)) => <i32 as TryFrom<i64>>::try_from(v).map_err(|_| {
                ValueExtractionError::ConversionError(format!(
                    "BigInt value {v} does not fit into i32"
                ))
            }),
            ref v if is_null(v) => Err(ValueExtractionError::NullValue),
            _ => Err(ValueExtractionError::TypeMismatch {
                expected: "Int".to_string(),
                actual: format!("{:?}", value),
            }),
        }
    }
}

impl<T: SqlValue> SqlValue for Option<T> {
    const SQL_TYPE: SqlType = T::SQL_TYPE;

    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => T::SQL_TYPE.null(),
        }
    }

    fn from_value(value: Value) -> Result<Self, ValueExtractionError> {
        if is_null(&value) {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}
