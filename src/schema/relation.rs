//! Typed access to one owned relation behind an owner-only trait object.
//!
//! `Schema<T>` holds its relations as `Box<dyn RelationAccess<T>>`, so each relation
//! keeps the concrete target type `R` it was declared with. Cascades and row
//! mapping for the target go through `R`'s own schema.

use super::{Entity, Schema};
use crate::error::{ConsistencyError, FinderError, MappingError};
use crate::executor::Executor;
use crate::finder::persist;
use crate::mapper;
use crate::row::ResultRow;
use crate::value::is_null;
use sea_query::Value;
use std::any::type_name;

pub(crate) trait RelationAccess<T>: Send + Sync {
    /// Value bound for the owner's foreign-key column.
    fn foreign_key_value(&self, owner: &T) -> Result<Value, FinderError>;

    fn cascade_save(&self, owner: &T, executor: &dyn Executor) -> Result<(), FinderError>;

    /// Save the distinct targets of all `owners` with one batch insert.
    fn cascade_save_all(&self, owners: &[&T], executor: &dyn Executor) -> Result<(), FinderError>;

    fn cascade_update(&self, owner: &T, executor: &dyn Executor) -> Result<(), FinderError>;

    fn cascade_delete(&self, owner: &T, executor: &dyn Executor) -> Result<(), FinderError>;

    /// Map the joined target columns of `row` into the owner's relation slot.
    fn hydrate(&self, owner: &mut T, row: &ResultRow, depth: usize) -> Result<(), MappingError>;
}

pub(crate) struct Relation<T, R: Entity> {
    pub(crate) owner_table: String,
    pub(crate) target: &'static Schema<R>,
    pub(crate) referenced_index: usize,
    pub(crate) get: fn(&T) -> Option<&R>,
    pub(crate) set: Option<fn(&mut T, Option<R>)>,
}

impl<T, R: Entity> RelationAccess<T> for Relation<T, R> {
    fn foreign_key_value(&self, owner: &T) -> Result<Value, FinderError> {
        let referenced = &self.target.descriptor().fields()[self.referenced_index];
        let Some(target) = (self.get)(owner) else {
            return Ok(referenced.sql_type().null());
        };
        let key = (self.target.field_access()[self.referenced_index].read)(target);
        if is_null(&key) {
            return Err(ConsistencyError::MissingRelationKey {
                owner: self.owner_table.clone(),
                target: self.target.descriptor().table().to_string(),
            }
            .into());
        }
        Ok(key)
    }

    fn cascade_save(&self, owner: &T, executor: &dyn Executor) -> Result<(), FinderError> {
        match (self.get)(owner) {
            Some(target) => persist::save(executor, target),
            None => Ok(()),
        }
    }

    fn cascade_save_all(&self, owners: &[&T], executor: &dyn Executor) -> Result<(), FinderError> {
        let mut seen: Vec<Value> = Vec::new();
        let mut targets: Vec<&R> = Vec::new();
        for target in owners.iter().filter_map(|owner| (self.get)(owner)) {
            let key = self.target.primary_value(target);
            // Targets without a key cannot be deduplicated; keep each one.
            if !is_null(&key) {
                if seen.contains(&key) {
                    continue;
                }
                seen.push(key);
            }
            targets.push(target);
        }
        persist::save_all(executor, &targets)
    }

    fn cascade_update(&self, owner: &T, executor: &dyn Executor) -> Result<(), FinderError> {
        match (self.get)(owner) {
            Some(target) => persist::update(executor, target),
            None => Ok(()),
        }
    }

    fn cascade_delete(&self, owner: &T, executor: &dyn Executor) -> Result<(), FinderError> {
        match (self.get)(owner) {
            Some(target) => persist::delete(executor, target),
            None => Ok(()),
        }
    }

    fn hydrate(&self, owner: &mut T, row: &ResultRow, depth: usize) -> Result<(), MappingError> {
        let descriptor = self.target.descriptor();
        let Some(set) = self.set else {
            return Err(MappingError::NoRelationSlot {
                entity: type_name::<T>().to_string(),
                table: descriptor.table().to_string(),
            });
        };
        // LEFT JOIN without a match leaves every target column NULL.
        let primary = descriptor.primary();
        let key = row.read(&descriptor.qualified(primary.column()), primary.sql_type())?;
        if is_null(&key) {
            set(owner, None);
            return Ok(());
        }
        let target = mapper::map_at_depth(self.target, row, depth)?;
        set(owner, Some(target));
        Ok(())
    }
}
