//! In-memory [`Executor`] for tests.
//!
//! Records every statement it is handed and replays scripted results, in the
//! manner of a mock database connection:
//!
//! ```rust
//! use repomap::mock::MockExecutor;
//! use repomap::{Executor, ResultRow, Statement};
//!
//! let executor = MockExecutor::new()
//!     .append_query_results(vec![vec![ResultRow::new().with("p.id", 1)]])
//!     .append_count(3);
//!
//! let rows = executor.query_all(&Statement::raw("SELECT p.id FROM person AS p")).unwrap();
//! assert_eq!(rows.len(), 1);
//! assert_eq!(executor.query_count(&Statement::raw("SELECT count(*) FROM person AS p")).unwrap(), 3);
//! assert_eq!(executor.sql_log().len(), 2);
//! ```

use crate::executor::{ExecError, Executor};
use crate::query::Statement;
use crate::row::ResultRow;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct MockExecutor {
    log: RefCell<Vec<Statement>>,
    query_results: RefCell<VecDeque<Vec<ResultRow>>>,
    counts: RefCell<VecDeque<i64>>,
    fail_at: Option<usize>,
    issued: Cell<usize>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue result sets, one per subsequent `query_all`. An exhausted queue yields no rows.
    pub fn append_query_results(self, results: Vec<Vec<ResultRow>>) -> Self {
        self.query_results.borrow_mut().extend(results);
        self
    }

    /// Queue the result of the next `query_count`. An exhausted queue yields 0.
    pub fn append_count(self, count: i64) -> Self {
        self.counts.borrow_mut().push_back(count);
        self
    }

    /// Fail the statement with this zero-based index.
    pub fn fail_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Every statement received so far, failed ones included.
    pub fn statements(&self) -> Vec<Statement> {
        self.log.borrow().clone()
    }

    pub fn sql_log(&self) -> Vec<String> {
        self.log.borrow().iter().map(|statement| statement.sql.clone()).collect()
    }

    fn record(&self, statement: &Statement) -> Result<(), ExecError> {
        let index = self.issued.get();
        self.issued.set(index + 1);
        self.log.borrow_mut().push(statement.clone());
        if self.fail_at == Some(index) {
            return Err(ExecError::QueryError(format!(
                "injected failure at statement {index}: {}",
                statement.sql
            )));
        }
        Ok(())
    }
}

impl Executor for MockExecutor {
    fn execute(&self, statement: &Statement) -> Result<u64, ExecError> {
        self.record(statement)?;
        Ok(1)
    }

    fn query_all(&self, statement: &Statement) -> Result<Vec<ResultRow>, ExecError> {
        self.record(statement)?;
        Ok(self.query_results.borrow_mut().pop_front().unwrap_or_default())
    }

    fn query_count(&self, statement: &Statement) -> Result<i64, ExecError> {
        self.record(statement)?;
        Ok(self.counts.borrow_mut().pop_front().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_statement_is_still_recorded() {
        let executor = MockExecutor::new().fail_at(1);
        executor.execute(&Statement::raw("A")).unwrap();
        assert!(executor.execute(&Statement::raw("B")).is_err());
        executor.execute(&Statement::raw("C")).unwrap();
        assert_eq!(executor.sql_log(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_exhausted_queues() {
        let executor = MockExecutor::new();
        assert!(executor.query_all(&Statement::raw("SELECT 1")).unwrap().is_empty());
        assert_eq!(executor.query_count(&Statement::raw("SELECT count(*)")).unwrap(), 0);
    }
}
