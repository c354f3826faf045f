//! Grid to record mapping
//!
//! [`TableMapper`] decodes string cells into typed [`Record`]s through the
//! codec registry, and walks grids row by row handing each decoded record to
//! a [`RowReceiver`].

use crate::codec::CodecRegistry;
use crate::error::{Error, Result};
use crate::grid::{Grid, STRING_SUFFIX};
use crate::record::{Record, RecordSchema, TableRow};
use indexmap::IndexMap;
use std::sync::Arc;
use tabula_value::{Value, NULL};

/// One decoded data row as seen by a [`RowReceiver`]
#[derive(Debug)]
pub struct DecodedRow<'a> {
    /// 0-based index among the data rows
    pub index: usize,
    pub record: Record,
    /// Header columns of the grid
    pub columns: &'a [String],
    /// Cells exactly as written in the grid
    pub raw: &'a [String],
}

/// Callbacks driven by [`TableMapper::iterate_table`]
pub trait RowReceiver {
    /// Substitute for a cell value, applied before decoding
    fn replace(&self, _value: &str) -> Option<String> {
        None
    }

    /// Returning true leaves the column out of the decoded record.
    ///
    /// `literal` is set for cells written with the `::string` marker.
    fn skip_decode(&mut self, _column: &str, _value: &str, _literal: bool) -> bool {
        false
    }

    /// Called once per data row; an error stops the iteration
    fn receive_row(&mut self, row: DecodedRow<'_>) -> Result<()>;
}

struct FnReceiver<F>(F);

impl<F> RowReceiver for FnReceiver<F>
where
    F: FnMut(DecodedRow<'_>) -> Result<()>,
{
    fn receive_row(&mut self, row: DecodedRow<'_>) -> Result<()> {
        (self.0)(row)
    }
}

/// Converts between string cells and typed records
#[derive(Debug, Clone, Default)]
pub struct TableMapper {
    codecs: Arc<CodecRegistry>,
}

impl TableMapper {
    pub fn new(codecs: CodecRegistry) -> Self {
        Self {
            codecs: Arc::new(codecs),
        }
    }

    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    /// Canonical cell text of a value, `NULL` when absent
    pub fn encode(&self, value: &Value) -> String {
        self.codecs.encode(value)
    }

    /// Decode one cell of `column`
    pub fn decode_cell(&self, schema: &RecordSchema, column: &str, cell: &str) -> Result<Value> {
        let data_type = schema
            .data_type(column)
            .ok_or_else(|| Error::UnknownColumn {
                column: column.to_string(),
            })?;

        self.codecs
            .decode(cell, data_type)
            .map_err(|source| Error::Decode {
                column: column.to_string(),
                source,
            })
    }

    /// Populate a fresh record from a column to cell mapping.
    ///
    /// Columns missing from `cells` and `NULL` cells keep the zero value.
    pub fn decode_record(
        &self,
        schema: &Arc<RecordSchema>,
        cells: &IndexMap<String, String>,
    ) -> Result<Record> {
        let mut record = Record::new(Arc::clone(schema));
        for (column, cell) in cells {
            if cell == NULL {
                continue;
            }
            let value = self.decode_cell(schema, column, cell)?;
            record.set(column, value)?;
        }
        Ok(record)
    }

    /// Build a record from a row read back from a store.
    ///
    /// Store values are normalized into the declared column types by going
    /// through their cell text, so a backend that returns `I64` for a `U32`
    /// column or text for a timestamp still yields comparable records.
    pub fn record_from_row(
        &self,
        schema: &Arc<RecordSchema>,
        columns: &[String],
        row: &[Value],
    ) -> Result<Record> {
        let mut record = Record::new(Arc::clone(schema));
        for (column, value) in columns.iter().zip(row) {
            let data_type = schema
                .data_type(column)
                .ok_or_else(|| Error::UnknownColumn {
                    column: column.clone(),
                })?;

            let normalized = if value.is_null() || value.data_type() == *data_type.base_type() {
                value.clone()
            } else {
                self.decode_cell(schema, column, &self.encode(value))?
            };
            record.set(column, normalized)?;
        }
        Ok(record)
    }

    /// Walk the data rows of a grid, decoding each into a record.
    ///
    /// Per cell: a trailing `::string` is stripped and marks the cell
    /// literal, the receiver's replacement is applied, then the receiver may
    /// skip the cell, and `NULL` cells are left at the zero value. The first error stops the walk and is reported with
    /// its row index. A grid without data rows fails before any callback.
    pub fn iterate_table<R: RowReceiver + ?Sized>(
        &self,
        grid: &Grid,
        schema: &Arc<RecordSchema>,
        receiver: &mut R,
    ) -> Result<()> {
        grid.validate()?;

        let columns = grid.header();
        for (index, raw) in grid.data_rows().iter().enumerate() {
            let mut cells = IndexMap::with_capacity(columns.len());

            for (column, cell) in columns.iter().zip(raw) {
                let (value, literal) = match cell.strip_suffix(STRING_SUFFIX) {
                    Some(stripped) => (stripped, true),
                    None => (cell.as_str(), false),
                };

                let value = receiver
                    .replace(value)
                    .unwrap_or_else(|| value.to_string());

                if receiver.skip_decode(column, &value, literal) || value == NULL {
                    continue;
                }

                cells.insert(column.clone(), value);
            }

            let record = self
                .decode_record(schema, &cells)
                .map_err(|e| e.at_row(index))?;

            tracing::trace!(row = index, columns = cells.len(), "decoded grid row");

            receiver
                .receive_row(DecodedRow {
                    index,
                    record,
                    columns,
                    raw,
                })
                .map_err(|e| match e {
                    Error::Row { .. } => e,
                    other => other.at_row(index),
                })?;
        }

        Ok(())
    }

    /// Decode every data row of a grid into records, without replacements
    pub fn records_from_table(
        &self,
        grid: &Grid,
        schema: &Arc<RecordSchema>,
    ) -> Result<Vec<Record>> {
        let mut records = Vec::with_capacity(grid.row_count());
        self.iterate_table(
            grid,
            schema,
            &mut FnReceiver(|row: DecodedRow<'_>| {
                records.push(row.record);
                Ok(())
            }),
        )?;
        Ok(records)
    }

    /// Decode every data row of a grid into typed rows
    pub fn slice_from_table<T: TableRow>(&self, grid: &Grid) -> Result<Vec<T>> {
        let schema = Arc::new(T::schema()?);
        self.records_from_table(grid, &schema)?
            .iter()
            .enumerate()
            .map(|(i, record)| T::from_record(record).map_err(|e| e.at_row(i)))
            .collect()
    }
}
