//! Predicate builder

use crate::mapper::TableMapper;
use crate::record::Record;
use indexmap::IndexSet;
use tabula_store::Predicate;
use tabula_value::NULL;

/// Equality predicate over `columns` of a decoded record.
///
/// Columns appear in the given order. A field encoding to `NULL` becomes an
/// `IS NULL` condition; excluded columns take no part in the lookup.
pub fn build_predicate(
    mapper: &TableMapper,
    record: &Record,
    columns: &[String],
    exclude: &IndexSet<String>,
) -> Predicate {
    let mut predicate = Predicate::new();
    for column in columns {
        if exclude.contains(column) {
            predicate.exclude(column.as_str());
            continue;
        }

        let value = record.value(column);
        if mapper.encode(value) == NULL {
            predicate.push(column.as_str(), tabula_value::Value::Null);
        } else {
            predicate.push(column.as_str(), value.clone());
        }
    }
    predicate
}
