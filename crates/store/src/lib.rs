//! Relational store contract for the tabula fixture engine
//!
//! The fixture engine never speaks a SQL dialect itself. It hands table
//! names, header columns and equality predicates to a [`RelationalStore`]
//! and gets typed rows back. Backends live in their own crates.

mod error;
mod predicate;
mod statement;

pub use error::{Result, StoreError};
pub use predicate::{Condition, Predicate};
pub use statement::{Placeholder, Statement};

use tabula_value::{Row, Value};

/// Rows returned by a multi-row read, with the column order of the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl RowSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Value of `column` in row `index`, if both exist
    pub fn get(&self, index: usize, column: &str) -> Option<&Value> {
        let pos = self.columns.iter().position(|c| c == column)?;
        self.rows.get(index)?.get(pos)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Trait for relational store backends
///
/// Every call is synchronous and independent; implementations must be safe
/// to share between concurrently running sessions.
pub trait RelationalStore: Send + Sync {
    /// Delete every row of a table, returning the number of rows removed
    fn delete_all(&self, table: &str) -> Result<u64>;

    /// Insert all rows in a single statement covering exactly `columns`
    fn insert(&self, table: &str, columns: &[String], rows: &[Row]) -> Result<u64>;

    /// Fetch exactly one row matching the predicate, projected on `columns`
    ///
    /// Zero matches is [`StoreError::NoRows`], more than one is
    /// [`StoreError::TooManyRows`].
    fn select_one(&self, table: &str, columns: &[String], predicate: &Predicate) -> Result<Row>;

    /// Fetch up to `limit` rows; an empty `columns` slice selects every column
    fn select_many(&self, table: &str, columns: &[String], limit: usize) -> Result<RowSet>;

    /// Count all rows of a table
    fn count(&self, table: &str) -> Result<u64>;

    /// Execute a raw statement, such as a post-cleanup sequence reset
    fn execute(&self, statement: &str) -> Result<u64>;
}
