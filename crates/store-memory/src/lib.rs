//! In-memory relational store implementation
//!
//! Tables are declared up front with their column list. A table may own a
//! serial column backed by a sequence named `<table>_<column>_seq`, which
//! hands out generated identifiers the way a database default would.

use parking_lot::RwLock;
use std::collections::HashMap;
use tabula_store::{
    Placeholder, Predicate, RelationalStore, Result, RowSet, Statement, StoreError,
};
use tabula_value::{Row, Value};

struct Serial {
    column: usize,
    sequence: String,
    next: i64,
}

struct MemoryTable {
    columns: Vec<String>,
    rows: Vec<Row>,
    serial: Option<Serial>,
}

impl MemoryTable {
    fn position(&self, table: &str, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| StoreError::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            })
    }

    fn positions(&self, table: &str, columns: &[String]) -> Result<Vec<usize>> {
        columns.iter().map(|c| self.position(table, c)).collect()
    }
}

/// In-memory store for tests and demos
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, MemoryTable>>,
    executed: RwLock<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a table; re-declaring replaces it
    pub fn create_table(&self, name: &str, columns: &[&str]) {
        self.tables.write().insert(
            name.to_string(),
            MemoryTable {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows: Vec::new(),
                serial: None,
            },
        );
    }

    /// Declare a table whose `serial` column is filled from a sequence when
    /// an insert leaves it out or sets it to NULL
    pub fn create_table_with_serial(&self, name: &str, columns: &[&str], serial: &str) {
        let column = columns.iter().position(|c| *c == serial);
        let mut tables = self.tables.write();
        tables.insert(
            name.to_string(),
            MemoryTable {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows: Vec::new(),
                serial: column.map(|column| Serial {
                    column,
                    sequence: format!("{}_{}_seq", name, serial),
                    next: 1,
                }),
            },
        );
    }

    /// Snapshot of a table's contents in declared column order
    pub fn rows(&self, table: &str) -> Option<RowSet> {
        let tables = self.tables.read();
        let t = tables.get(table)?;
        Some(RowSet {
            columns: t.columns.clone(),
            rows: t.rows.clone(),
        })
    }

    /// Raw statements passed to [`RelationalStore::execute`], in order
    pub fn executed(&self) -> Vec<String> {
        self.executed.read().clone()
    }

    fn restart_sequence(&self, sequence: &str, start: i64) -> Result<u64> {
        let mut tables = self.tables.write();
        let serial = tables
            .values_mut()
            .filter_map(|t| t.serial.as_mut())
            .find(|s| s.sequence == sequence)
            .ok_or_else(|| StoreError::Unsupported(format!("unknown sequence {}", sequence)))?;
        serial.next = start;
        Ok(0)
    }
}

impl RelationalStore for MemoryStore {
    fn delete_all(&self, table: &str) -> Result<u64> {
        let mut tables = self.tables.write();
        let t = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
        let removed = t.rows.len() as u64;
        t.rows.clear();
        Ok(removed)
    }

    fn insert(&self, table: &str, columns: &[String], rows: &[Row]) -> Result<u64> {
        let mut tables = self.tables.write();
        let t = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
        let positions = t.positions(table, columns)?;

        // Validate every row before touching the table so a failed insert
        // leaves it unchanged, like a single SQL statement would.
        if let Some(bad) = rows.iter().find(|row| row.len() != columns.len()) {
            return Err(StoreError::backend(
                Statement::insert(table, columns, rows, Placeholder::Dollar),
                format!("row has {} values for {} columns", bad.len(), columns.len()),
            ));
        }

        for row in rows {
            let mut full = vec![Value::Null; t.columns.len()];
            for (pos, value) in positions.iter().zip(row) {
                full[*pos] = value.clone();
            }

            if let Some(serial) = t.serial.as_mut() {
                if full[serial.column].is_null() {
                    full[serial.column] = Value::I64(serial.next);
                    serial.next += 1;
                }
            }

            t.rows.push(full);
        }

        Ok(rows.len() as u64)
    }

    fn select_one(&self, table: &str, columns: &[String], predicate: &Predicate) -> Result<Row> {
        let tables = self.tables.read();
        let t = tables
            .get(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
        let positions = t.positions(table, columns)?;

        let mut matched = t.rows.iter().filter(|row| predicate.matches(&t.columns, row));
        let statement = || Statement::select_where(table, columns, predicate, Placeholder::Dollar, None);

        let Some(row) = matched.next() else {
            return Err(StoreError::NoRows {
                statement: statement(),
            });
        };

        let extra = matched.count();
        if extra > 0 {
            return Err(StoreError::TooManyRows {
                statement: statement(),
                found: extra + 1,
            });
        }

        Ok(positions.iter().map(|pos| row[*pos].clone()).collect())
    }

    fn select_many(&self, table: &str, columns: &[String], limit: usize) -> Result<RowSet> {
        let tables = self.tables.read();
        let t = tables
            .get(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;

        let columns = if columns.is_empty() {
            t.columns.clone()
        } else {
            columns.to_vec()
        };
        let positions = t.positions(table, &columns)?;

        let rows = t
            .rows
            .iter()
            .take(limit)
            .map(|row| positions.iter().map(|pos| row[*pos].clone()).collect())
            .collect();

        Ok(RowSet { columns, rows })
    }

    fn count(&self, table: &str) -> Result<u64> {
        let tables = self.tables.read();
        let t = tables
            .get(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
        Ok(t.rows.len() as u64)
    }

    /// Understands `DELETE FROM <table>` and `ALTER SEQUENCE <name> RESTART [WITH <n>]`.
    fn execute(&self, statement: &str) -> Result<u64> {
        tracing::debug!("memory store executing {:?}", statement);
        self.executed.write().push(statement.to_string());

        let trimmed = statement.trim().trim_end_matches(';');
        let words: Vec<&str> = trimmed.split_whitespace().collect();
        let upper: Vec<String> = words.iter().map(|w| w.to_uppercase()).collect();
        let upper: Vec<&str> = upper.iter().map(String::as_str).collect();

        match upper.as_slice() {
            ["DELETE", "FROM", _] => self.delete_all(words[2]),
            ["ALTER", "SEQUENCE", _, "RESTART"] => self.restart_sequence(words[2], 1),
            ["ALTER", "SEQUENCE", _, "RESTART", "WITH", n] => {
                let start = n
                    .parse::<i64>()
                    .map_err(|_| StoreError::Unsupported(statement.to_string()))?;
                self.restart_sequence(words[2], start)
            }
            _ => Err(StoreError::Unsupported(statement.to_string())),
        }
    }
}
