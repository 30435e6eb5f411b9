//! Result rows addressed by `alias.column`.

use crate::error::MappingError;
use crate::schema::SqlType;
use crate::value::SqlValue;
use chrono::{NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use sea_query::Value;

/// One row of a select result, with named-column typed getters.
///
/// Column names are the qualified `alias.column` names of the statement's
/// projection, so the same column name can appear for several joined tables.
///
/// ```rust
/// use repomap::ResultRow;
///
/// let row = ResultRow::new().with("p.id", 1).with("p.name", "Ann");
/// assert_eq!(row.get_int("p.id").unwrap(), Some(1));
/// assert_eq!(row.get_varchar("p.name").unwrap(), Some("Ann".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRow {
    columns: Vec<(String, Value)>,
}

impl ResultRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((column.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    fn typed<V: SqlValue>(&self, column: &str) -> Result<Option<V>, MappingError> {
        let value = self.value(column).ok_or_else(|| MappingError::MissingColumn {
            column: column.to_string(),
        })?;
        <Option<V>>::from_value(value.clone()).map_err(|source| MappingError::TypeMismatch {
            column: column.to_string(),
            expected: V::SQL_TYPE,
            source,
        })
    }

    pub fn get_int(&self, column: &str) -> Result<Option<i32>, MappingError> {
        self.typed(column)
    }

    pub fn get_varchar(&self, column: &str) -> Result<Option<String>, MappingError> {
        self.typed(column)
    }

    pub fn get_big_decimal(&self, column: &str) -> Result<Option<Decimal>, MappingError> {
        self.typed(column)
    }

    pub fn get_boolean(&self, column: &str) -> Result<Option<bool>, MappingError> {
        self.typed(column)
    }

    pub fn get_time(&self, column: &str) -> Result<Option<NaiveTime>, MappingError> {
        self.typed(column)
    }

    pub fn get_timestamp(&self, column: &str) -> Result<Option<NaiveDateTime>, MappingError> {
        self.typed(column)
    }

    /// Read `column` with the getter selected by `sql_type`.
    pub fn read(&self, column: &str, sql_type: SqlType) -> Result<Value, MappingError> {
        let value = match sql_type {
            SqlType::Int => self.get_int(column)?.into_value(),
            SqlType::Varchar => self.get_varchar(column)?.into_value(),
            SqlType::BigDecimal => self.get_big_decimal(column)?.into_value(),
            SqlType::Boolean => self.get_boolean(column)?.into_value(),
            SqlType::Time => self.get_time(column)?.into_value(),
            SqlType::Timestamp => self.get_timestamp(column)?.into_value(),
        };
        Ok(value)
    }
}
