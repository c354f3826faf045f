//! SQLite relational store
//!
//! Wraps a single `rusqlite::Connection` behind a mutex. Values are bound by
//! their canonical cell text unless SQLite has a native storage class for
//! them, and rows come back as SQLite storage classes; the fixture engine
//! re-decodes them into the declared column types.

use parking_lot::Mutex;
use rusqlite::types::Value as SqliteValue;
use rusqlite::{params_from_iter, Connection};
use std::path::Path;
use tabula_store::{
    Placeholder, Predicate, RelationalStore, Result, RowSet, Statement, StoreError,
};
use tabula_value::{encode, Row, Value};

/// Store backed by a SQLite database
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> rusqlite::Result<Self> {
        Ok(Self::from_connection(Connection::open(path)?))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn query(&self, statement: &Statement) -> Result<RowSet> {
        tracing::debug!("sqlite query {}", statement);
        let conn = self.conn.lock();
        let fail = |e: rusqlite::Error| StoreError::backend(statement.clone(), e);

        let mut stmt = conn.prepare(&statement.sql).map_err(fail)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let col_count = columns.len();

        let mut rows = stmt
            .query(params_from_iter(statement.args.iter().map(to_sqlite)))
            .map_err(fail)?;

        let mut result = RowSet::new(columns);
        while let Some(row) = rows.next().map_err(fail)? {
            let mut values = Vec::with_capacity(col_count);
            for i in 0..col_count {
                let v: SqliteValue = row.get(i).map_err(fail)?;
                values.push(from_sqlite(v));
            }
            result.rows.push(values);
        }

        Ok(result)
    }

    fn exec(&self, statement: &Statement) -> Result<u64> {
        tracing::debug!("sqlite exec {}", statement);
        let conn = self.conn.lock();
        conn.execute(
            &statement.sql,
            params_from_iter(statement.args.iter().map(to_sqlite)),
        )
        .map(|n| n as u64)
        .map_err(|e| StoreError::backend(statement.clone(), e))
    }
}

fn to_sqlite(value: &Value) -> SqliteValue {
    match value {
        Value::Null => SqliteValue::Null,
        Value::Bool(b) => SqliteValue::Integer(i64::from(*b)),
        Value::I16(i) => SqliteValue::Integer(i64::from(*i)),
        Value::I32(i) => SqliteValue::Integer(i64::from(*i)),
        Value::I64(i) => SqliteValue::Integer(*i),
        Value::U32(u) => SqliteValue::Integer(i64::from(*u)),
        Value::U64(u) => match i64::try_from(*u) {
            Ok(i) => SqliteValue::Integer(i),
            Err(_) => SqliteValue::Text(u.to_string()),
        },
        Value::F32(f) => SqliteValue::Real(f64::from(*f)),
        Value::F64(f) => SqliteValue::Real(*f),
        Value::Bytea(b) => SqliteValue::Blob(b.clone()),
        other => SqliteValue::Text(encode(other)),
    }
}

fn from_sqlite(value: SqliteValue) -> Value {
    match value {
        SqliteValue::Null => Value::Null,
        SqliteValue::Integer(i) => Value::I64(i),
        SqliteValue::Real(f) => Value::F64(f),
        SqliteValue::Text(s) => Value::Str(s),
        SqliteValue::Blob(b) => Value::Bytea(b),
    }
}

impl RelationalStore for SqliteStore {
    fn delete_all(&self, table: &str) -> Result<u64> {
        self.exec(&Statement::delete_all(table))
    }

    fn insert(&self, table: &str, columns: &[String], rows: &[Row]) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }
        self.exec(&Statement::insert(table, columns, rows, Placeholder::Question))
    }

    fn select_one(&self, table: &str, columns: &[String], predicate: &Predicate) -> Result<Row> {
        let statement =
            Statement::select_where(table, columns, predicate, Placeholder::Question, None);
        let mut result = self.query(&statement)?;

        match result.rows.len() {
            0 => Err(StoreError::NoRows { statement }),
            1 => Ok(result.rows.remove(0)),
            found => Err(StoreError::TooManyRows { statement, found }),
        }
    }

    fn select_many(&self, table: &str, columns: &[String], limit: usize) -> Result<RowSet> {
        self.query(&Statement::select_limit(table, columns, limit))
    }

    fn count(&self, table: &str) -> Result<u64> {
        let statement = Statement::count(table);
        let result = self.query(&statement)?;

        match result.rows.first().and_then(|row| row.first()) {
            Some(Value::I64(n)) => Ok(*n as u64),
            other => Err(StoreError::backend(
                statement,
                format!("unexpected count result {:?}", other),
            )),
        }
    }

    fn execute(&self, statement: &str) -> Result<u64> {
        tracing::debug!("sqlite execute {:?}", statement);
        let conn = self.conn.lock();
        conn.execute_batch(statement)
            .map_err(|e| StoreError::backend(Statement::raw(statement), e))?;
        Ok(conn.changes())
    }
}
