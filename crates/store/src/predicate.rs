//! Equality-conjunction predicates over a single table

use indexmap::{IndexMap, IndexSet};
use std::fmt;
use tabula_value::{encode, Value};

/// Condition applied to one column
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column = value`
    Eq(Value),
    /// `column IS NULL`
    IsNull,
}

/// Conjunction of per-column conditions, in insertion (header) order.
///
/// Excluded columns are tracked explicitly so diagnostics can show which
/// header columns took no part in the lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: IndexMap<String, Condition>,
    excluded: IndexSet<String>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition from a typed value; `Null` becomes `IS NULL`.
    pub fn push(&mut self, column: impl Into<String>, value: Value) {
        let condition = if value.is_null() {
            Condition::IsNull
        } else {
            Condition::Eq(value)
        };
        self.conditions.insert(column.into(), condition);
    }

    /// Remove a column from the conjunction and remember it as excluded
    pub fn exclude(&mut self, column: impl Into<String>) {
        let column = column.into();
        self.conditions.shift_remove(&column);
        self.excluded.insert(column);
    }

    pub fn conditions(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.conditions.iter().map(|(c, cond)| (c.as_str(), cond))
    }

    pub fn get(&self, column: &str) -> Option<&Condition> {
        self.conditions.get(column)
    }

    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.excluded.iter().map(String::as_str)
    }

    pub fn is_excluded(&self, column: &str) -> bool {
        self.excluded.contains(column)
    }

    /// Columns compared with `IS NULL`
    pub fn null_columns(&self) -> impl Iterator<Item = &str> {
        self.conditions()
            .filter(|(_, cond)| matches!(cond, Condition::IsNull))
            .map(|(c, _)| c)
    }

    /// Column to canonical cell text, `NULL` for `IS NULL` conditions
    pub fn encoded(&self) -> IndexMap<String, String> {
        self.conditions
            .iter()
            .map(|(column, cond)| {
                let text = match cond {
                    Condition::Eq(v) => encode(v),
                    Condition::IsNull => encode(&Value::Null),
                };
                (column.clone(), text)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluate the predicate against a row laid out as `columns`.
    ///
    /// Values of different types are compared by their canonical cell text,
    /// so `I32(1)` matches a stored `I64(1)`. A condition on a column the
    /// row does not carry never matches.
    pub fn matches(&self, columns: &[String], row: &[Value]) -> bool {
        self.conditions.iter().all(|(column, cond)| {
            let Some(value) = columns
                .iter()
                .position(|c| c == column)
                .and_then(|pos| row.get(pos))
            else {
                return false;
            };

            match cond {
                Condition::IsNull => value.is_null(),
                Condition::Eq(expected) => {
                    expected == value || (!value.is_null() && encode(expected) == encode(value))
                }
            }
        })
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conditions.is_empty() {
            return write!(f, "TRUE");
        }

        for (i, (column, cond)) in self.conditions.iter().enumerate() {
            if i > 0 {
                write!(f, " AND ")?;
            }
            match cond {
                Condition::IsNull => write!(f, "{} IS NULL", column)?,
                Condition::Eq(v) if v.is_numeric() || matches!(v, Value::Bool(_)) => {
                    write!(f, "{} = {}", column, encode(v))?
                }
                Condition::Eq(v) => write!(f, "{} = '{}'", column, encode(v).replace('\'', "''"))?,
            }
        }
        Ok(())
    }
}
