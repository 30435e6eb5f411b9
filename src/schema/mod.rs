//! Entity schema metadata.
//!
//! An [`EntityDescriptor`] is the static, untyped description of one domain type:
//! its table, alias, scalar [`ValueField`]s and [`OwnedRelation`]s, all in
//! declaration order. The query compiler works on descriptors alone.
//!
//! A [`Schema<T>`] pairs a descriptor with the accessor table for `T` (one read
//! and one optional write slot per field and relation, aligned by index). It is
//! produced by [`SchemaBuilder`], validated once, and cached for the process
//! lifetime behind [`Entity::schema`].

mod builder;
mod relation;

pub use builder::{Schema, SchemaBuilder};

use crate::error::ValidationError;
use sea_query::Value;
use std::fmt;

/// Relations are joined exactly one level deep.
pub const MAX_RELATION_DEPTH: usize = 1;

/// Column type of a [`ValueField`]; selects the typed read used when mapping rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Int,
    Varchar,
    BigDecimal,
    Boolean,
    Time,
    Timestamp,
}

impl SqlType {
    /// The typed NULL bound for a column of this type.
    pub fn null(self) -> Value {
        match self {
            SqlType::Int => Value::Int(None),
            SqlType::Varchar => Value::String(None),
            SqlType::BigDecimal => Value::Decimal(None),
            SqlType::Boolean => Value::Bool(None),
            SqlType::Time => Value::ChronoTime(None),
            SqlType::Timestamp => Value::ChronoDateTime(None),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SqlType::Int => "INT",
            SqlType::Varchar => "VARCHAR",
            SqlType::BigDecimal => "BIG_DECIMAL",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Time => "TIME",
            SqlType::Timestamp => "TIMESTAMP",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scalar column mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueField {
    column: String,
    sql_type: SqlType,
    primary: bool,
}

impl ValueField {
    pub(crate) fn new(column: String, sql_type: SqlType, primary: bool) -> Self {
        Self {
            column,
            sql_type,
            primary,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn sql_type(&self) -> SqlType {
        self.sql_type
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }
}

/// A single-level reference to another described entity, joined via
/// `<owner alias>.<foreign_key_column> = <target alias>.<referenced_primary_key_column>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedRelation {
    foreign_key_column: String,
    referenced_primary_key_column: String,
    target: &'static EntityDescriptor,
}

impl OwnedRelation {
    pub fn foreign_key_column(&self) -> &str {
        &self.foreign_key_column
    }

    pub fn referenced_primary_key_column(&self) -> &str {
        &self.referenced_primary_key_column
    }

    pub fn target(&self) -> &'static EntityDescriptor {
        self.target
    }
}

/// Derived schema metadata for one domain type. Immutable once built.
///
/// Invariant: exactly one field is primary, and every relation target is itself
/// a valid descriptor without relations of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    entity: String,
    table: String,
    alias: String,
    fields: Vec<ValueField>,
    relations: Vec<OwnedRelation>,
    primary_index: usize,
}

impl EntityDescriptor {
    /// Rust type name the descriptor was declared for
    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn fields(&self) -> &[ValueField] {
        &self.fields
    }

    pub fn relations(&self) -> &[OwnedRelation] {
        &self.relations
    }

    pub fn primary(&self) -> &ValueField {
        &self.fields[self.primary_index]
    }

    pub(crate) fn primary_index(&self) -> usize {
        self.primary_index
    }

    /// Fields written by an UPDATE's SET clause, in declaration order.
    pub fn non_primary_fields(&self) -> impl Iterator<Item = &ValueField> {
        self.fields.iter().filter(|field| !field.primary)
    }

    pub fn field_index(&self, column: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.column == column)
    }

    /// `<alias>.<column>`, the name a column is addressed by in result rows.
    pub fn qualified(&self, column: &str) -> String {
        format!("{}.{}", self.alias, column)
    }
}

/// A domain type with a declared, validated schema.
///
/// Implement it with [`entity!`](crate::entity), which caches the schema for the
/// process lifetime:
///
/// ```rust
/// use repomap::{entity, Schema};
///
/// #[derive(Debug, Default, Clone, PartialEq)]
/// struct Address {
///     id: i32,
///     city: String,
/// }
///
/// entity!(Address, Schema::<Address>::builder("address", "a")
///     .primary("id", |a| a.id, |a, v| a.id = v)
///     .field("city", |a| a.city.clone(), |a, v| a.city = v)
///     .build());
///
/// use repomap::Entity;
/// assert_eq!(Address::schema().unwrap().descriptor().table(), "address");
/// ```
pub trait Entity: Default + 'static {
    /// The validated schema, or the first violation found when declaring it.
    ///
    /// Cycle detection tracks the schemas being built on the current thread.
    /// Two threads first touching two mutually related types at the same time
    /// wait on each other's initialization instead of returning `RelationCycle`.
    fn schema() -> Result<&'static Schema<Self>, ValidationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_type_nulls_are_null() {
        for ty in [
            SqlType::Int,
            SqlType::Varchar,
            SqlType::BigDecimal,
            SqlType::Boolean,
            SqlType::Time,
            SqlType::Timestamp,
        ] {
            assert!(crate::value::is_null(&ty.null()), "{ty} null");
        }
    }

    #[test]
    fn test_sql_type_display() {
        assert_eq!(SqlType::BigDecimal.to_string(), "BIG_DECIMAL");
    }
}
