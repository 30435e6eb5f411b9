//! Entity finder facade.
//!
//! [`EntityFinder`] owns one executor and turns calls on described types into
//! compiled statements. Every operation validates the schema of its type first
//! and fails before anything is sent when the declaration is unusable.
//!
//! # Examples
//!
//! ```rust
//! use repomap::mock::MockExecutor;
//! use repomap::{entity, Condition, EntityFinder, ResultRow, Schema};
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Address { id: i32, city: String }
//!
//! entity!(Address, Schema::<Address>::builder("address", "a")
//!     .primary("id", |a| a.id, |a, v| a.id = v)
//!     .field("city", |a| a.city.clone(), |a, v| a.city = v)
//!     .build());
//!
//! let executor = MockExecutor::new().append_query_results(vec![vec![
//!     ResultRow::new().with("a.id", 7).with("a.city", "X"),
//! ]]);
//! let finder = EntityFinder::new(executor);
//!
//! let found: Vec<Address> = finder.find_all_where(Condition::init("a", "city", "X")).unwrap();
//! assert_eq!(found, vec![Address { id: 7, city: "X".to_string() }]);
//! assert_eq!(
//!     finder.executor().sql_log()[0],
//!     "SELECT a.id, a.city FROM address AS a WHERE a.city = ?"
//! );
//! ```

mod order;
pub(crate) mod persist;

pub use order::{FixedOrder, OrderHook, Unordered};

use crate::condition::Condition;
use crate::config::FinderConfig;
use crate::error::FinderError;
use crate::executor::Executor;
use crate::mapper;
use crate::postgres::MayPostgresExecutor;
use crate::query::{Page, SelectQuery, Statement};
use crate::schema::{Entity, EntityDescriptor};

pub(crate) fn log_statement(statement: &Statement) {
    log::debug!("Executing statement: {}", statement.sql);
    log::trace!("Bound values: {:?}", statement.values);
}

/// Repository facade over an [`Executor`], ordering selects with an [`OrderHook`].
pub struct EntityFinder<X: Executor, O: OrderHook = Unordered> {
    executor: X,
    order: O,
}

impl<X: Executor> EntityFinder<X> {
    pub fn new(executor: X) -> Self {
        Self {
            executor,
            order: Unordered,
        }
    }
}

impl EntityFinder<MayPostgresExecutor, FixedOrder> {
    /// Connect to `config.url` and order every select by `config.default_order`.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::Connectivity` if the connection cannot be established.
    pub fn from_config(config: &FinderConfig) -> Result<Self, FinderError> {
        let executor = MayPostgresExecutor::connect(&config.url)?;
        Ok(EntityFinder::new(executor).with_order(FixedOrder(config.default_order.clone())))
    }
}

impl<X: Executor, O: OrderHook> EntityFinder<X, O> {
    /// Replace the ordering of selects.
    pub fn with_order<P: OrderHook>(self, order: P) -> EntityFinder<X, P> {
        EntityFinder {
            executor: self.executor,
            order,
        }
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    pub fn into_executor(self) -> X {
        self.executor
    }

    /// Validate the schema of `T` and return its descriptor.
    pub fn validate<T: Entity>(&self) -> Result<&'static EntityDescriptor, FinderError> {
        Ok(T::schema()?.descriptor())
    }

    /// Validate the schema of the type of `value`.
    pub fn validate_value<T: Entity>(&self, _value: &T) -> Result<(), FinderError> {
        self.validate::<T>().map(|_| ())
    }

    /// Validate the schema of the element type of `values`.
    pub fn validate_all<T: Entity>(&self, _values: &[T]) -> Result<(), FinderError> {
        self.validate::<T>().map(|_| ())
    }

    pub fn find_all<T: Entity>(&self) -> Result<Vec<T>, FinderError> {
        self.select(Condition::empty(), None)
    }

    pub fn find_all_where<T: Entity>(&self, condition: Condition) -> Result<Vec<T>, FinderError> {
        self.select(condition, None)
    }

    /// Select one page: `LIMIT <limit> OFFSET <offset>`.
    pub fn find_all_paged<T: Entity>(&self, limit: u64, offset: u64) -> Result<Vec<T>, FinderError> {
        self.select(Condition::empty(), Some(Page::new(limit, offset)))
    }

    pub fn find_all_where_paged<T: Entity>(
        &self,
        condition: Condition,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<T>, FinderError> {
        self.select(condition, Some(Page::new(limit, offset)))
    }

    pub fn count<T: Entity>(&self) -> Result<i64, FinderError> {
        self.count_where::<T>(Condition::empty())
    }

    pub fn count_where<T: Entity>(&self, condition: Condition) -> Result<i64, FinderError> {
        let descriptor = self.validate::<T>()?;
        let order = order::fragments(&self.order, descriptor)?;
        let statement = SelectQuery::new(descriptor)
            .filter(condition)
            .order_by(order)
            .build_count();
        log_statement(&statement);
        Ok(self.executor.query_count(&statement)?)
    }

    /// Insert `value`, inserting its relation targets first.
    pub fn save<T: Entity>(&self, value: &T) -> Result<(), FinderError> {
        persist::save(&self.executor, value)
    }

    /// Insert all `values` with one multi-row statement, after inserting their
    /// distinct relation targets. An empty slice issues nothing.
    pub fn save_all<T: Entity>(&self, values: &[T]) -> Result<(), FinderError> {
        let values: Vec<&T> = values.iter().collect();
        persist::save_all(&self.executor, &values)
    }

    /// Update `value` by primary key, updating its relation targets first.
    pub fn update<T: Entity>(&self, value: &T) -> Result<(), FinderError> {
        persist::update(&self.executor, value)
    }

    /// Delete `value` by primary key, then delete its relation targets.
    pub fn delete<T: Entity>(&self, value: &T) -> Result<(), FinderError> {
        persist::delete(&self.executor, value)
    }

    fn select<T: Entity>(&self, condition: Condition, page: Option<Page>) -> Result<Vec<T>, FinderError> {
        let schema = T::schema()?;
        let descriptor = schema.descriptor();
        let order = order::fragments(&self.order, descriptor)?;
        let mut query = SelectQuery::new(descriptor).filter(condition).order_by(order);
        if let Some(page) = page {
            query = query.page(page.limit, page.offset);
        }
        let statement = query.build();
        log_statement(&statement);
        let rows = self.executor.query_all(&statement)?;
        log::debug!("Mapping {} row(s) onto {}", rows.len(), descriptor.entity());
        rows.iter()
            .map(|row| mapper::map_row(schema, row).map_err(FinderError::from))
            .collect()
    }
}
