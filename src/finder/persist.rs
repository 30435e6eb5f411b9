//! Write operations with relation cascades.
//!
//! Statements of one operation are issued one after another without a
//! transaction. When one fails, the statements before it stay applied and the
//! rest are never issued. The owner's bound values are resolved before the
//! first statement, so a missing key fails with nothing written.

use super::log_statement;
use crate::error::FinderError;
use crate::executor::Executor;
use crate::query::{write, Statement};
use crate::schema::Entity;

fn execute(executor: &dyn Executor, statement: &Statement) -> Result<u64, FinderError> {
    log_statement(statement);
    Ok(executor.execute(statement)?)
}

/// Insert each relation target, then `value`.
pub(crate) fn save<T: Entity>(executor: &dyn Executor, value: &T) -> Result<(), FinderError> {
    let schema = T::schema()?;
    let row = schema.insert_values(value)?;
    for relation in schema.relation_access() {
        relation.cascade_save(value, executor)?;
    }
    let statement = write::insert(schema.descriptor(), row);
    execute(executor, &statement)?;
    Ok(())
}

/// Insert the distinct relation targets of `values` per relation, then all of
/// `values` in one multi-row insert.
pub(crate) fn save_all<T: Entity>(executor: &dyn Executor, values: &[&T]) -> Result<(), FinderError> {
    let schema = T::schema()?;
    if values.is_empty() {
        return Ok(());
    }
    let rows = values
        .iter()
        .map(|value| schema.insert_values(*value))
        .collect::<Result<Vec<_>, _>>()?;
    for relation in schema.relation_access() {
        relation.cascade_save_all(values, executor)?;
    }
    let statement = write::insert_batch(schema.descriptor(), rows);
    execute(executor, &statement)?;
    Ok(())
}

/// Update each relation target, then `value`.
pub(crate) fn update<T: Entity>(executor: &dyn Executor, value: &T) -> Result<(), FinderError> {
    let schema = T::schema()?;
    let values = schema.update_values(value)?;
    for relation in schema.relation_access() {
        relation.cascade_update(value, executor)?;
    }
    match write::update(schema.descriptor(), values) {
        Some(statement) => {
            execute(executor, &statement)?;
        }
        None => log::debug!(
            "Nothing to update for {}: no columns besides the primary key",
            schema.descriptor().table()
        ),
    }
    Ok(())
}

/// Delete `value`, then each relation target.
pub(crate) fn delete<T: Entity>(executor: &dyn Executor, value: &T) -> Result<(), FinderError> {
    let schema = T::schema()?;
    let key = schema.require_primary_value(value)?;
    schema.foreign_key_values(value)?;
    let statement = write::delete(schema.descriptor(), key);
    execute(executor, &statement)?;
    for relation in schema.relation_access() {
        relation.cascade_delete(value, executor)?;
    }
    Ok(())
}
