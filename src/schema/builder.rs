//! Declaration-time construction of [`Schema<T>`].

use super::relation::{Relation, RelationAccess};
use super::{Entity, EntityDescriptor, OwnedRelation, ValueField};
use crate::error::{ConsistencyError, FinderError, ValidationError};
use crate::value::{is_null, SqlValue, ValueExtractionError};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_query::Value;
use std::any::{type_name, TypeId};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern compiles"));

thread_local! {
    // Types whose schema is being built on this thread, innermost last.
    static BUILDING: RefCell<Vec<TypeId>> = const { RefCell::new(Vec::new()) };
}

struct BuildGuard(TypeId);

impl BuildGuard {
    fn enter(id: TypeId) -> Self {
        BUILDING.with(|stack| stack.borrow_mut().push(id));
        Self(id)
    }

    fn is_building(id: TypeId) -> bool {
        BUILDING.with(|stack| stack.borrow().contains(&id))
    }
}

impl Drop for BuildGuard {
    fn drop(&mut self) {
        BUILDING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(pos) = stack.iter().rposition(|id| *id == self.0) {
                stack.remove(pos);
            }
        });
    }
}

type ReadSlot<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;
type WriteSlot<T> = Box<dyn Fn(&mut T, Value) -> Result<(), ValueExtractionError> + Send + Sync>;

/// Read and write slot of one declared field.
pub(crate) struct FieldAccess<T> {
    pub(crate) read: ReadSlot<T>,
    pub(crate) write: Option<WriteSlot<T>>,
}

/// Validated schema of `T`: descriptor plus accessor table aligned with it.
pub struct Schema<T> {
    descriptor: EntityDescriptor,
    fields: Vec<FieldAccess<T>>,
    relations: Vec<Box<dyn RelationAccess<T>>>,
}

impl<T: 'static> Schema<T> {
    /// Start declaring the schema of `T`.
    pub fn builder(table: impl Into<String>, alias: impl Into<String>) -> SchemaBuilder<T> {
        SchemaBuilder {
            table: table.into(),
            alias: alias.into(),
            fields: Vec::new(),
            field_access: Vec::new(),
            relations: Vec::new(),
            relation_access: Vec::new(),
            error: None,
            _guard: BuildGuard::enter(TypeId::of::<T>()),
        }
    }
}

impl<T> Schema<T> {
    pub fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }

    pub(crate) fn field_access(&self) -> &[FieldAccess<T>] {
        &self.fields
    }

    pub(crate) fn relation_access(&self) -> &[Box<dyn RelationAccess<T>>] {
        &self.relations
    }

    /// Current primary key value of `value`.
    pub fn primary_value(&self, value: &T) -> Value {
        (self.fields[self.descriptor.primary_index()].read)(value)
    }

    /// Primary key value, failing when it is NULL.
    pub(crate) fn require_primary_value(&self, value: &T) -> Result<Value, FinderError> {
        let key = self.primary_value(value);
        if is_null(&key) {
            return Err(ConsistencyError::MissingPrimaryKeyValue {
                table: self.descriptor.table().to_string(),
            }
            .into());
        }
        Ok(key)
    }

    /// Values in INSERT column order: every field, then every relation's foreign key.
    pub(crate) fn insert_values(&self, value: &T) -> Result<Vec<Value>, FinderError> {
        let mut values: Vec<Value> = self.fields.iter().map(|field| (field.read)(value)).collect();
        values.extend(self.foreign_key_values(value)?);
        Ok(values)
    }

    /// Foreign key of every relation, failing on a target without its referenced key.
    pub(crate) fn foreign_key_values(&self, value: &T) -> Result<Vec<Value>, FinderError> {
        self.relations
            .iter()
            .map(|relation| relation.foreign_key_value(value))
            .collect()
    }

    /// Values in UPDATE order: non-primary fields, relation foreign keys, primary key last.
    pub(crate) fn update_values(&self, value: &T) -> Result<Vec<Value>, FinderError> {
        let primary = self.descriptor.primary_index();
        let mut values: Vec<Value> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != primary)
            .map(|(_, field)| (field.read)(value))
            .collect();
        values.extend(self.foreign_key_values(value)?);
        values.push(self.require_primary_value(value)?);
        Ok(values)
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Registers fields and relations of `T` in declaration order.
///
/// Errors are collected as they occur and reported by [`build`](Self::build);
/// after the first error further declarations are ignored.
pub struct SchemaBuilder<T: 'static> {
    table: String,
    alias: String,
    fields: Vec<ValueField>,
    field_access: Vec<FieldAccess<T>>,
    relations: Vec<OwnedRelation>,
    relation_access: Vec<Box<dyn RelationAccess<T>>>,
    error: Option<ValidationError>,
    _guard: BuildGuard,
}

impl<T: 'static> SchemaBuilder<T> {
    /// Declare the primary key field.
    pub fn primary<F>(self, column: impl Into<String>, get: fn(&T) -> F, set: fn(&mut T, F)) -> Self
    where
        F: SqlValue + 'static,
    {
        self.push_field(column.into(), true, get, Some(set))
    }

    /// Declare a scalar field.
    pub fn field<F>(self, column: impl Into<String>, get: fn(&T) -> F, set: fn(&mut T, F)) -> Self
    where
        F: SqlValue + 'static,
    {
        self.push_field(column.into(), false, get, Some(set))
    }

    /// Declare a persisted field without a write slot.
    ///
    /// The column is inserted and updated, but reading the entity back fails with
    /// [`MappingError::NoWriteSlot`](crate::MappingError::NoWriteSlot).
    pub fn write_only<F>(self, column: impl Into<String>, get: fn(&T) -> F) -> Self
    where
        F: SqlValue + 'static,
    {
        self.push_field(column.into(), false, get, None)
    }

    /// Declare an owned relation to `R`, stored in an `Option<R>` slot.
    ///
    /// `foreign_key` is the owner's column, `referenced_key` the target's column it points at.
    pub fn relation<R: Entity>(
        self,
        foreign_key: impl Into<String>,
        referenced_key: impl Into<String>,
        get: fn(&T) -> Option<&R>,
        set: fn(&mut T, Option<R>),
    ) -> Self {
        self.push_relation(foreign_key.into(), referenced_key.into(), get, Some(set))
    }

    /// Declare an owned relation without a write slot.
    ///
    /// Relation targets are cascaded and joined, but reading the entity back fails with
    /// [`MappingError::NoRelationSlot`](crate::MappingError::NoRelationSlot).
    pub fn write_only_relation<R: Entity>(
        self,
        foreign_key: impl Into<String>,
        referenced_key: impl Into<String>,
        get: fn(&T) -> Option<&R>,
    ) -> Self {
        self.push_relation(foreign_key.into(), referenced_key.into(), get, None)
    }

    fn push_field<F>(mut self, column: String, primary: bool, get: fn(&T) -> F, set: Option<fn(&mut T, F)>) -> Self
    where
        F: SqlValue + 'static,
    {
        if self.error.is_some() {
            return self;
        }
        self.fields.push(ValueField::new(column, F::SQL_TYPE, primary));
        let write: Option<WriteSlot<T>> = set.map(|set| {
            Box::new(move |target: &mut T, value: Value| {
                set(target, F::from_value(value)?);
                Ok(())
            }) as WriteSlot<T>
        });
        self.field_access.push(FieldAccess {
            read: Box::new(move |source: &T| get(source).into_value()),
            write,
        });
        self
    }

    fn push_relation<R: Entity>(
        mut self,
        foreign_key: String,
        referenced_key: String,
        get: fn(&T) -> Option<&R>,
        set: Option<fn(&mut T, Option<R>)>,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }
        let entity = type_name::<T>().to_string();
        let target_name = type_name::<R>().to_string();

        // Calling R::schema() here would re-enter its lazy initialisation.
        if BuildGuard::is_building(TypeId::of::<R>()) {
            self.error = Some(ValidationError::RelationCycle {
                entity,
                target: target_name,
            });
            return self;
        }

        let target = match R::schema() {
            Ok(target) => target,
            Err(err) => {
                self.error = Some(err);
                return self;
            }
        };
        let descriptor = target.descriptor();
        if !descriptor.relations().is_empty() {
            self.error = Some(ValidationError::NestedRelation {
                entity,
                target: target_name,
            });
            return self;
        }
        let Some(referenced_index) = descriptor.field_index(&referenced_key) else {
            self.error = Some(ValidationError::UnknownReferencedColumn {
                entity,
                target: target_name,
                column: referenced_key,
            });
            return self;
        };

        self.relations.push(OwnedRelation {
            foreign_key_column: foreign_key,
            referenced_primary_key_column: referenced_key,
            target: descriptor,
        });
        self.relation_access.push(Box::new(Relation {
            owner_table: self.table.clone(),
            target,
            referenced_index,
            get,
            set,
        }));
        self
    }

    /// Validate the declaration and produce the schema.
    pub fn build(self) -> Result<Schema<T>, ValidationError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let entity = type_name::<T>().to_string();

        if self.table.is_empty() || self.alias.is_empty() {
            return Err(ValidationError::MissingEntityMetadata { entity });
        }

        let identifiers = [self.table.as_str(), self.alias.as_str()]
            .into_iter()
            .chain(self.fields.iter().map(|field| field.column()))
            .chain(self.relations.iter().map(|relation| relation.foreign_key_column()));
        for identifier in identifiers {
            if !IDENTIFIER.is_match(identifier) {
                return Err(ValidationError::InvalidIdentifier {
                    entity,
                    identifier: identifier.to_string(),
                });
            }
        }

        let primaries: Vec<usize> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, field)| field.is_primary())
            .map(|(index, _)| index)
            .collect();
        let primary_index = match primaries.as_slice() {
            [] => return Err(ValidationError::MissingPrimaryKey { entity }),
            [index] => *index,
            _ => {
                return Err(ValidationError::DuplicatePrimaryKey {
                    entity,
                    columns: primaries
                        .iter()
                        .map(|index| self.fields[*index].column().to_string())
                        .collect(),
                })
            }
        };

        let mut aliases = HashSet::new();
        aliases.insert(self.alias.as_str());
        for relation in &self.relations {
            let alias = relation.target().alias();
            if !aliases.insert(alias) {
                return Err(ValidationError::DuplicateAlias {
                    entity,
                    alias: alias.to_string(),
                });
            }
        }

        Ok(Schema {
            descriptor: EntityDescriptor {
                entity,
                table: self.table,
                alias: self.alias,
                fields: self.fields,
                relations: self.relations,
                primary_index,
            },
            fields: self.field_access,
            relations: self.relation_access,
        })
    }
}
