//! Insert, update and delete statements.
//!
//! Column lists follow declaration order: value fields first, then each
//! relation's foreign-key column. Values are supplied by the caller in the same
//! order (see `Schema::insert_values` and `Schema::update_values`).

use super::Statement;
use crate::schema::EntityDescriptor;
use sea_query::Value;

/// Columns written by INSERT: every field, then relation foreign keys.
pub fn insert_columns(descriptor: &EntityDescriptor) -> Vec<&str> {
    descriptor
        .fields()
        .iter()
        .map(|field| field.column())
        .chain(
            descriptor
                .relations()
                .iter()
                .map(|relation| relation.foreign_key_column()),
        )
        .collect()
}

/// Columns assigned by UPDATE's SET clause: non-primary fields, then relation foreign keys.
pub fn update_columns(descriptor: &EntityDescriptor) -> Vec<&str> {
    descriptor
        .non_primary_fields()
        .map(|field| field.column())
        .chain(
            descriptor
                .relations()
                .iter()
                .map(|relation| relation.foreign_key_column()),
        )
        .collect()
}

fn row_group(width: usize) -> String {
    format!("({})", vec!["?"; width].join(", "))
}

/// `INSERT INTO <table> (<columns>) VALUES (?, ...)`
pub fn insert(descriptor: &EntityDescriptor, values: Vec<Value>) -> Statement {
    insert_batch(descriptor, vec![values])
}

/// Multi-row insert; the values of row `i` occupy block `i` of the parameter list.
///
/// # Example
///
/// ```rust
/// use repomap::query::write;
/// use repomap::{entity, Entity, Schema};
/// use sea_query::Value;
///
/// #[derive(Debug, Default)]
/// struct Tag { id: i32, label: String }
///
/// entity!(Tag, Schema::<Tag>::builder("tag", "t")
///     .primary("id", |t| t.id, |t, v| t.id = v)
///     .field("label", |t| t.label.clone(), |t, v| t.label = v)
///     .build());
///
/// let descriptor = Tag::schema().unwrap().descriptor();
/// let statement = write::insert_batch(
///     descriptor,
///     vec![
///         vec![Value::from(1), Value::from("a")],
///         vec![Value::from(2), Value::from("b")],
///     ],
/// );
/// assert_eq!(statement.sql, "INSERT INTO tag (id, label) VALUES (?, ?), (?, ?)");
/// assert_eq!(statement.values.len(), 4);
/// ```
pub fn insert_batch(descriptor: &EntityDescriptor, rows: Vec<Vec<Value>>) -> Statement {
    let columns = insert_columns(descriptor);
    let group = row_group(columns.len());
    let groups = vec![group.as_str(); rows.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES {}",
        descriptor.table(),
        columns.join(", "),
        groups
    );
    Statement::new(sql, rows.into_iter().flatten().collect())
}

/// `UPDATE <table> SET <column> = ?, ... WHERE <primary> = ?`
///
/// Returns `None` when there is no column to assign.
pub fn update(descriptor: &EntityDescriptor, values: Vec<Value>) -> Option<Statement> {
    let columns = update_columns(descriptor);
    if columns.is_empty() {
        return None;
    }
    let assignments = columns
        .iter()
        .map(|column| format!("{column} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        descriptor.table(),
        assignments,
        descriptor.primary().column()
    );
    Some(Statement::new(sql, values))
}

/// `DELETE FROM <table> WHERE <primary> = ?`
pub fn delete(descriptor: &EntityDescriptor, primary_key: Value) -> Statement {
    let sql = format!(
        "DELETE FROM {} WHERE {} = ?",
        descriptor.table(),
        descriptor.primary().column()
    );
    Statement::new(sql, vec![primary_key])
}
