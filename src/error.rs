//! Error taxonomy for finder operations.
//!
//! Every failure surfaced by [`EntityFinder`](crate::EntityFinder) is one of four
//! kinds, so callers can branch on the kind instead of parsing messages:
//!
//! - [`ValidationError`] - the schema declaration of a type is unusable
//! - [`MappingError`] - a result row cannot be turned back into a domain object
//! - [`ExecError`] - the connection failed to execute a statement
//! - [`ConsistencyError`] - an object graph cannot be persisted as given

use crate::executor::ExecError;
use crate::schema::SqlType;
use crate::value::ValueExtractionError;
use std::fmt;

/// A schema declaration failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The type declares no table or no alias
    MissingEntityMetadata { entity: String },
    /// No field is marked as primary key
    MissingPrimaryKey { entity: String },
    /// More than one field is marked as primary key
    DuplicatePrimaryKey { entity: String, columns: Vec<String> },
    /// A table, alias or column name is not a plain SQL identifier
    InvalidIdentifier { entity: String, identifier: String },
    /// A relation target declares relations of its own
    NestedRelation { entity: String, target: String },
    /// A relation refers back to a type whose schema is still being built
    RelationCycle { entity: String, target: String },
    /// Two entities in the same join share an alias
    DuplicateAlias { entity: String, alias: String },
    /// The referenced key of a relation is not a column of its target
    UnknownReferencedColumn {
        entity: String,
        target: String,
        column: String,
    },
    /// An order-by fragment is not of the form `column [ASC|DESC]`
    InvalidOrder { fragment: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingEntityMetadata { entity } => {
                write!(f, "Entity metadata (table and alias) not found for {entity}")
            }
            ValidationError::MissingPrimaryKey { entity } => {
                write!(f, "Primary key not found for {entity}")
            }
            ValidationError::DuplicatePrimaryKey { entity, columns } => {
                write!(
                    f,
                    "Entity {entity} declares more than one primary key: {}",
                    columns.join(", ")
                )
            }
            ValidationError::InvalidIdentifier { entity, identifier } => {
                write!(f, "Invalid SQL identifier '{identifier}' in {entity}")
            }
            ValidationError::NestedRelation { entity, target } => {
                write!(
                    f,
                    "Relation target {target} of {entity} declares relations itself; only one level is supported"
                )
            }
            ValidationError::RelationCycle { entity, target } => {
                write!(f, "Relation cycle detected: {entity} refers to {target} while it is being declared")
            }
            ValidationError::DuplicateAlias { entity, alias } => {
                write!(f, "Alias '{alias}' is used more than once in the joins of {entity}")
            }
            ValidationError::UnknownReferencedColumn {
                entity,
                target,
                column,
            } => {
                write!(
                    f,
                    "Relation of {entity} references column '{column}' which {target} does not declare"
                )
            }
            ValidationError::InvalidOrder { fragment } => {
                write!(f, "Invalid order-by fragment '{fragment}'")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// A result row could not be mapped onto a domain object.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingError {
    /// A declared field has no write slot to receive its column value
    NoWriteSlot { entity: String, column: String },
    /// A declared relation has no write slot to receive the joined object
    NoRelationSlot { entity: String, table: String },
    /// The row does not contain the addressed `alias.column`
    MissingColumn { column: String },
    /// The column holds a value of another type than the declared one
    TypeMismatch {
        column: String,
        expected: SqlType,
        source: ValueExtractionError,
    },
    /// Relation traversal went deeper than a single level
    DepthExceeded { entity: String, depth: usize },
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingError::NoWriteSlot { entity, column } => {
                write!(f, "No write slot for column '{column}' on {entity}")
            }
            MappingError::NoRelationSlot { entity, table } => {
                write!(f, "No write slot for relation '{table}' on {entity}")
            }
            MappingError::MissingColumn { column } => {
                write!(f, "Column '{column}' not present in result row")
            }
            MappingError::TypeMismatch {
                column,
                expected,
                source,
            } => {
                write!(f, "Column '{column}' is not readable as {expected}: {source}")
            }
            MappingError::DepthExceeded { entity, depth } => {
                write!(f, "Relation depth {depth} exceeded while mapping {entity}")
            }
        }
    }
}

impl std::error::Error for MappingError {}

/// The object graph handed to a write operation cannot be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    /// A relation target has no primary key value to bind as foreign key
    MissingRelationKey { owner: String, target: String },
    /// The instance itself has no primary key value to address its row
    MissingPrimaryKeyValue { table: String },
}

impl fmt::Display for ConsistencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyError::MissingRelationKey { owner, target } => {
                write!(f, "Relation target {target} of {owner} has no primary key value")
            }
            ConsistencyError::MissingPrimaryKeyValue { table } => {
                write!(f, "Primary key value of {table} is not set")
            }
        }
    }
}

impl std::error::Error for ConsistencyError {}

/// Error returned by every [`EntityFinder`](crate::EntityFinder) operation.
#[derive(Debug)]
pub enum FinderError {
    Validation(ValidationError),
    Mapping(MappingError),
    Connectivity(ExecError),
    Consistency(ConsistencyError),
}

impl FinderError {
    pub fn is_validation(&self) -> bool {
        matches!(self, FinderError::Validation(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, FinderError::Mapping(_))
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, FinderError::Connectivity(_))
    }

    pub fn is_consistency(&self) -> bool {
        matches!(self, FinderError::Consistency(_))
    }
}

impl fmt::Display for FinderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinderError::Validation(e) => write!(f, "Validation error: {e}"),
            FinderError::Mapping(e) => write!(f, "Mapping error: {e}"),
            FinderError::Connectivity(e) => write!(f, "Connectivity error: {e}"),
            FinderError::Consistency(e) => write!(f, "Consistency error: {e}"),
        }
    }
}

impl std::error::Error for FinderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FinderError::Validation(e) => Some(e),
            FinderError::Mapping(e) => Some(e),
            FinderError::Connectivity(e) => Some(e),
            FinderError::Consistency(e) => Some(e),
        }
    }
}

impl From<ValidationError> for FinderError {
    fn from(err: ValidationError) -> Self {
        FinderError::Validation(err)
    }
}

impl From<MappingError> for FinderError {
    fn from(err: MappingError) -> Self {
        FinderError::Mapping(err)
    }
}

impl From<ExecError> for FinderError {
    fn from(err: ExecError) -> Self {
        FinderError::Connectivity(err)
    }
}

impl From<ConsistencyError> for FinderError {
    fn from(err: ConsistencyError) -> Self {
        FinderError::Consistency(err)
    }
}
