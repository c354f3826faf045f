//! Error types for relational store backends

use crate::statement::Statement;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("no rows in result set of {statement}")]
    NoRows { statement: Statement },

    #[error("expected exactly one row, found {found} for {statement}")]
    TooManyRows { statement: Statement, found: usize },

    #[error("table not found: {0}")]
    UnknownTable(String),

    #[error("column {column} not found in table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("unsupported statement: {0:?}")]
    Unsupported(String),

    #[error("{message} at {statement}")]
    Backend {
        statement: Statement,
        message: String,
    },
}

impl StoreError {
    pub fn backend(statement: Statement, message: impl ToString) -> Self {
        StoreError::Backend {
            statement,
            message: message.to_string(),
        }
    }

    /// Whether the error means "not exactly one row" rather than a failed query
    pub fn is_cardinality(&self) -> bool {
        matches!(
            self,
            StoreError::NoRows { .. } | StoreError::TooManyRows { .. }
        )
    }
}
