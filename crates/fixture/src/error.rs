//! Error types for the fixture engine

use tabula_store::{Predicate, Statement, StoreError};
use tabula_value::{CodecError, Value};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Configuration lookups
    #[error("unknown database {database}")]
    UnknownDatabase { database: String },

    #[error("unknown table {table} in database {database}")]
    UnknownTable { table: String, database: String },

    // Grid and schema shape
    #[error("header and at least one row required in table")]
    RowRequired,

    #[error("malformed table: {0}")]
    MalformedGrid(String),

    #[error("duplicate column {0} in record schema")]
    DuplicateColumn(String),

    #[error("column {column} is not part of the record schema")]
    UnknownColumn { column: String },

    // Decoding
    #[error("failed to decode column {column}: {source}")]
    Decode { column: String, source: CodecError },

    #[error("column {column} holds {found:?}, expected {expected}")]
    FieldType {
        column: String,
        expected: &'static str,
        found: Value,
    },

    /// Failure attributed to one data row of a grid (0-based)
    #[error("row {index}: {source}")]
    Row { index: usize, source: Box<Error> },

    // Seeding
    #[error("failed to delete from table {table} in db {database}: {source}")]
    Delete {
        table: String,
        database: String,
        source: StoreError,
    },

    #[error("failed to execute post cleanup statement {statement:?} for table {table} in db {database}: {source}")]
    PostCleanup {
        statement: String,
        table: String,
        database: String,
        source: StoreError,
    },

    #[error("failed to insert rows {statement} into table {table} in db {database}: {source}")]
    Insert {
        table: String,
        database: String,
        statement: Statement,
        source: StoreError,
    },

    // Assertions
    #[error("failed to count rows of table {table}: {source}")]
    Count { table: String, source: StoreError },

    #[error("invalid number of rows in table {table}: {expected} expected, {found} found")]
    CountMismatch {
        table: String,
        expected: u64,
        found: u64,
    },

    #[error("failed to query row with ({predicate}): {source}")]
    PredicateQuery {
        predicate: Predicate,
        source: StoreError,
    },

    #[error("row not uniquely found with ({predicate}): {source}")]
    RowNotFound {
        predicate: Predicate,
        source: StoreError,
    },

    #[error("unexpected row contents at column {column} ({expected:?}, {actual:?})")]
    PostCheckMismatch {
        column: String,
        expected: Value,
        actual: Value,
    },

    // Diagnostics
    #[error("{source}, rows available:\n{contents}")]
    WithContents { source: Box<Error>, contents: String },

    #[error("{source}, failed to query existing rows: {query_error}")]
    DiagnosticQuery {
        source: Box<Error>,
        query_error: StoreError,
    },
}

impl Error {
    /// The underlying failure, looking through row and diagnostic wrappers
    pub fn cause(&self) -> &Error {
        match self {
            Error::Row { source, .. }
            | Error::WithContents { source, .. }
            | Error::DiagnosticQuery { source, .. } => source.cause(),
            other => other,
        }
    }

    /// Row index of the failing data row, if the failure is tied to one
    pub fn row_index(&self) -> Option<usize> {
        match self {
            Error::Row { index, .. } => Some(*index),
            Error::WithContents { source, .. } | Error::DiagnosticQuery { source, .. } => {
                source.row_index()
            }
            _ => None,
        }
    }

    /// Rendered table snapshot attached to a failed assertion
    pub fn contents(&self) -> Option<&str> {
        match self {
            Error::WithContents { contents, .. } => Some(contents),
            _ => None,
        }
    }

    pub(crate) fn at_row(self, index: usize) -> Self {
        Error::Row {
            index,
            source: Box::new(self),
        }
    }
}
