//! Result mapper: one [`ResultRow`] into one domain object.
//!
//! Fields are read as `<alias>.<column>` with the typed read selected by their
//! [`SqlType`](crate::SqlType) and stored through the write slot bound at
//! declaration. Relations are rebuilt from the joined target columns.

use crate::error::MappingError;
use crate::row::ResultRow;
use crate::schema::{Schema, MAX_RELATION_DEPTH};
use std::any::type_name;

/// Map `row` onto a fresh `T`.
pub fn map_row<T: Default>(schema: &Schema<T>, row: &ResultRow) -> Result<T, MappingError> {
    map_at_depth(schema, row, 0)
}

pub(crate) fn map_at_depth<T: Default>(
    schema: &Schema<T>,
    row: &ResultRow,
    depth: usize,
) -> Result<T, MappingError> {
    if depth > MAX_RELATION_DEPTH {
        return Err(MappingError::DepthExceeded {
            entity: type_name::<T>().to_string(),
            depth,
        });
    }
    let descriptor = schema.descriptor();
    let mut value = T::default();
    for (field, access) in descriptor.fields().iter().zip(schema.field_access()) {
        let Some(write) = &access.write else {
            return Err(MappingError::NoWriteSlot {
                entity: type_name::<T>().to_string(),
                column: field.column().to_string(),
            });
        };
        let column = descriptor.qualified(field.column());
        let read = row.read(&column, field.sql_type())?;
        write(&mut value, read).map_err(|source| MappingError::TypeMismatch {
            column,
            expected: field.sql_type(),
            source,
        })?;
    }
    for relation in schema.relation_access() {
        relation.hydrate(&mut value, row, depth + 1)?;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_cfg::{ann, Address, Person};
    use crate::value::ValueExtractionError;
    use crate::Entity;
    use sea_query::Value;

    fn ann_row() -> ResultRow {
        ResultRow::new()
            .with("p.id", 1)
            .with("p.name", "Ann")
            .with("a.id", 7)
            .with("a.city", "X")
    }

    #[test]
    fn test_maps_owner_and_relation() {
        let person = map_row(Person::schema().unwrap(), &ann_row()).unwrap();
        assert_eq!(person, ann());
    }

    #[test]
    fn test_left_join_miss_maps_to_none() {
        let row = ResultRow::new()
            .with("p.id", 2)
            .with("p.name", "Bob")
            .with("a.id", Value::Int(None))
            .with("a.city", Value::String(None));
        let person = map_row(Person::schema().unwrap(), &row).unwrap();
        assert_eq!(person.address, None);
        assert_eq!(person.name, "Bob");
    }

    #[test]
    fn test_null_into_required_field_is_type_mismatch() {
        let row = ResultRow::new()
            .with("p.id", 1)
            .with("p.name", Value::String(None))
            .with("a.id", 7)
            .with("a.city", "X");
        let err = map_row(Person::schema().unwrap(), &row).unwrap_err();
        assert_eq!(
            err,
            MappingError::TypeMismatch {
                column: "p.name".to_string(),
                expected: crate::SqlType::Varchar,
                source: ValueExtractionError::NullValue,
            }
        );
    }

    #[test]
    fn test_missing_column() {
        let row = ResultRow::new().with("a.id", 7);
        let err = map_row(Address::schema().unwrap(), &row).unwrap_err();
        assert_eq!(
            err,
            MappingError::MissingColumn {
                column: "a.city".to_string()
            }
        );
    }

    #[test]
    fn test_depth_exceeded() {
        let err = map_at_depth(Address::schema().unwrap(), &ann_row(), MAX_RELATION_DEPTH + 1).unwrap_err();
        assert!(matches!(err, MappingError::DepthExceeded { depth: 2, .. }));
    }

    #[derive(Debug, Default)]
    struct Audit {
        id: i32,
        note: String,
    }

    crate::entity!(
        Audit,
        Schema::<Audit>::builder("audit", "au")
            .primary("id", |a| a.id, |a, v| a.id = v)
            .write_only("note", |a| a.note.clone())
            .build()
    );

    #[derive(Debug, Default)]
    struct Visit {
        id: i32,
        address: Option<Address>,
    }

    crate::entity!(
        Visit,
        Schema::<Visit>::builder("visit", "v")
            .primary("id", |v| v.id, |v, x| v.id = x)
            .write_only_relation("address_id", "id", |v| v.address.as_ref())
            .build()
    );

    #[test]
    fn test_field_without_write_slot() {
        let row = ResultRow::new().with("au.id", 1).with("au.note", "n");
        let err = map_row(Audit::schema().unwrap(), &row).unwrap_err();
        assert!(matches!(err, MappingError::NoWriteSlot { column, .. } if column == "note"));
    }

    #[test]
    fn test_relation_without_write_slot() {
        let row = ResultRow::new()
            .with("v.id", 1)
            .with("a.id", 7)
            .with("a.city", "X");
        let err = map_row(Visit::schema().unwrap(), &row).unwrap_err();
        assert!(matches!(err, MappingError::NoRelationSlot { table, .. } if table == "address"));
    }
}
