//! # repomap
//!
//! Declarative entity schemas compiled to parameterized SQL over `may_postgres`.
//!
//! A domain type declares its table, alias, value fields and owned relations once
//! with [`entity!`]. [`EntityFinder`] then selects, counts, saves, updates and
//! deletes instances through an [`Executor`], joining each owned relation one
//! level deep and mapping joined rows back into nested objects.
//!
//! ```rust
//! use repomap::mock::MockExecutor;
//! use repomap::{entity, EntityFinder, Schema};
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Address { id: i32, city: String }
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Person { id: i32, name: String, address: Option<Address> }
//!
//! entity!(Address, Schema::<Address>::builder("address", "a")
//!     .primary("id", |a| a.id, |a, v| a.id = v)
//!     .field("city", |a| a.city.clone(), |a, v| a.city = v)
//!     .build());
//!
//! entity!(Person, Schema::<Person>::builder("person", "p")
//!     .primary("id", |p| p.id, |p, v| p.id = v)
//!     .field("name", |p| p.name.clone(), |p, v| p.name = v)
//!     .relation("address_id", "id", |p| p.address.as_ref(), |p, v| p.address = v)
//!     .build());
//!
//! let finder = EntityFinder::new(MockExecutor::new());
//! finder
//!     .save(&Person {
//!         id: 1,
//!         name: "Ann".to_string(),
//!         address: Some(Address { id: 7, city: "X".to_string() }),
//!     })
//!     .unwrap();
//! assert_eq!(
//!     finder.executor().sql_log(),
//!     vec![
//!         "INSERT INTO address (id, city) VALUES (?, ?)",
//!         "INSERT INTO person (id, name, address_id) VALUES (?, ?, ?)",
//!     ]
//! );
//! ```

pub mod condition;
pub mod config;
pub mod error;
pub mod executor;
pub mod finder;
mod macros;
pub mod mapper;
pub mod metrics;
pub mod mock;
pub mod postgres;
pub mod query;
pub mod row;
pub mod schema;
pub mod value;

#[cfg(test)]
mod tests_cfg;

pub use condition::Condition;
pub use config::FinderConfig;
pub use error::{ConsistencyError, FinderError, MappingError, ValidationError};
pub use executor::{ExecError, Executor};
pub use finder::{EntityFinder, FixedOrder, OrderHook, Unordered};
pub use postgres::MayPostgresExecutor;
pub use query::{ProjectedColumn, Statement};
pub use row::ResultRow;
pub use schema::{Entity, EntityDescriptor, OwnedRelation, Schema, SchemaBuilder, SqlType, ValueField};
pub use value::{SqlValue, ValueExtractionError};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
}
