//! Query compiler.
//!
//! Turns [`EntityDescriptor`]s, [`Condition`](crate::Condition)s and order-by
//! fragments into parameterized [`Statement`]s. Nothing here touches a connection.
//!
//! - [`SelectQuery`] builds the joined select and its count variant
//! - [`write`] builds insert, batch insert, update and delete statements
//!
//! Placeholders are written as `?`; executors rewrite them to their dialect.

mod select;
pub mod write;

pub use select::SelectQuery;

use crate::schema::{EntityDescriptor, SqlType};
use sea_query::Value;
use std::fmt;

/// One column of a select's result, named as rows address it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedColumn {
    pub name: String,
    pub sql_type: SqlType,
}

/// A compiled statement: SQL text, bound values in placeholder order, and the
/// projection of its result columns (empty for everything but selects).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub values: Vec<Value>,
    pub projection: Vec<ProjectedColumn>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            values,
            projection: Vec::new(),
        }
    }

    /// A statement without parameters, for DDL and maintenance SQL.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    pub fn with_projection(mut self, projection: Vec<ProjectedColumn>) -> Self {
        self.projection = projection;
        self
    }

    pub fn placeholder_count(&self) -> usize {
        self.sql.matches('?').count()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Page window appended as `LIMIT <limit> OFFSET <offset>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Page {
    pub fn new(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }
}

/// Owner columns, then each relation target's columns, all as `alias.column`.
pub fn select_columns(descriptor: &EntityDescriptor) -> Vec<ProjectedColumn> {
    let mut columns: Vec<ProjectedColumn> = descriptor
        .fields()
        .iter()
        .map(|field| ProjectedColumn {
            name: descriptor.qualified(field.column()),
            sql_type: field.sql_type(),
        })
        .collect();
    for relation in descriptor.relations() {
        columns.extend(select_columns(relation.target()));
    }
    columns
}

/// One `LEFT JOIN` fragment per relation, in declaration order, joined by spaces.
pub fn join_clause(descriptor: &EntityDescriptor) -> String {
    descriptor
        .relations()
        .iter()
        .map(|relation| {
            let target = relation.target();
            format!(
                "LEFT JOIN {} AS {} ON {}.{} = {}.{}",
                target.table(),
                target.alias(),
                descriptor.alias(),
                relation.foreign_key_column(),
                target.alias(),
                relation.referenced_primary_key_column()
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}
