//! Row assertions against one table

use crate::error::{Error, Result};
use crate::grid::STRING_SUFFIX;
use crate::mapper::{DecodedRow, RowReceiver, TableMapper};
use crate::predicate::build_predicate;
use crate::record::RecordSchema;
use crate::render::render_table;
use crate::vars::VariableStore;
use indexmap::IndexSet;
use serde::de::IgnoredAny;
use std::sync::Arc;
use tabula_store::RelationalStore;
use tracing::{debug, warn};

/// Whether a cell holds a JSON object or array
pub(crate) fn is_json_shaped(value: &str) -> bool {
    matches!(value.as_bytes().first(), Some(b'{' | b'['))
        && serde_json::from_str::<IgnoredAny>(value).is_ok()
}

/// Assertion state for one table and one grid
pub(crate) struct TableQuery<'a> {
    pub mapper: &'a TableMapper,
    pub store: &'a dyn RelationalStore,
    pub table: &'a str,
    pub schema: &'a Arc<RecordSchema>,
    pub vars: &'a mut VariableStore,
    /// Columns of the current row left out of the lookup
    skip_where: IndexSet<String>,
    /// Columns of the current row compared after the lookup
    post_check: IndexSet<String>,
}

impl<'a> TableQuery<'a> {
    pub fn new(
        mapper: &'a TableMapper,
        store: &'a dyn RelationalStore,
        table: &'a str,
        schema: &'a Arc<RecordSchema>,
        vars: &'a mut VariableStore,
    ) -> Self {
        Self {
            mapper,
            store,
            table,
            schema,
            vars,
            skip_where: IndexSet::new(),
            post_check: IndexSet::new(),
        }
    }

    /// Compare the table's row count with the expected one
    pub fn check_count(&self, expected: usize) -> Result<()> {
        let found = self.store.count(self.table).map_err(|source| Error::Count {
            table: self.table.to_string(),
            source,
        })?;

        let expected = expected as u64;
        if found != expected {
            return Err(Error::CountMismatch {
                table: self.table.to_string(),
                expected,
                found,
            });
        }
        Ok(())
    }

    /// Attach a snapshot of the table to a failed assertion.
    ///
    /// Rows are rendered with `columns` when given, with every schema column
    /// otherwise.
    pub fn expose_contents(&self, err: Error, columns: Option<&[String]>, limit: usize) -> Error {
        let selected = self.schema.column_names();
        let rows = match self.store.select_many(self.table, &selected, limit) {
            Ok(rows) => rows,
            Err(query_error) => {
                warn!(table = self.table, error = %query_error, "failed to query existing rows");
                return Error::DiagnosticQuery {
                    source: Box::new(err),
                    query_error,
                };
            }
        };

        let shown = columns.map_or_else(|| rows.columns.clone(), <[String]>::to_vec);
        let cells: Vec<Vec<String>> = (0..rows.len())
            .map(|i| {
                shown
                    .iter()
                    .map(|c| match rows.get(i, c) {
                        Some(value) => self.mapper.encode(value),
                        None => tabula_value::NULL.to_string(),
                    })
                    .collect()
            })
            .collect();

        Error::WithContents {
            source: Box::new(err),
            contents: render_table(&shown, &cells),
        }
    }
}

impl RowReceiver for TableQuery<'_> {
    fn replace(&self, value: &str) -> Option<String> {
        self.vars.lookup(value).map(str::to_string)
    }

    fn skip_decode(&mut self, column: &str, value: &str, literal: bool) -> bool {
        // JSON equality is checked on decoded values after the lookup.
        if !literal && is_json_shaped(value) {
            self.post_check.insert(column.to_string());
            self.skip_where.insert(column.to_string());
            return false;
        }

        if self.vars.is_variable(value) && !self.vars.is_bound(value) {
            self.skip_where.insert(column.to_string());
            return true;
        }

        false
    }

    fn receive_row(&mut self, row: DecodedRow<'_>) -> Result<()> {
        let skip_where = std::mem::take(&mut self.skip_where);
        let post_check = std::mem::take(&mut self.post_check);

        let predicate = build_predicate(self.mapper, &row.record, row.columns, &skip_where);
        debug!(table = self.table, row = row.index, %predicate, "looking up row");

        let found = self
            .store
            .select_one(self.table, row.columns, &predicate)
            .map_err(|source| {
                if source.is_cardinality() {
                    Error::RowNotFound {
                        predicate: predicate.clone(),
                        source,
                    }
                } else {
                    Error::PredicateQuery {
                        predicate: predicate.clone(),
                        source,
                    }
                }
            })?;

        let received = self
            .mapper
            .record_from_row(self.schema, row.columns, &found)?;

        for (column, raw) in row.columns.iter().zip(row.raw) {
            let token = raw.strip_suffix(STRING_SUFFIX).unwrap_or(raw);
            if self.vars.is_variable(token) {
                let captured = self.mapper.encode(received.value(column));
                debug!(token, value = %captured, "binding variable");
                self.vars.bind(token.to_string(), captured);
            }

            if post_check.contains(column) {
                let expected = row.record.value(column);
                let actual = received.value(column);
                if expected != actual {
                    return Err(Error::PostCheckMismatch {
                        column: column.clone(),
                        expected: expected.clone(),
                        actual: actual.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
