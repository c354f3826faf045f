//! SQL statement text with bound arguments
//!
//! Backends that speak SQL execute these; the rest use them to report what
//! would have been run.

use crate::predicate::{Condition, Predicate};
use std::fmt;
use tabula_value::{encode, Row, Value};

/// Bind parameter style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placeholder {
    /// PostgreSQL style `$1`
    #[default]
    Dollar,
    /// SQLite numbered style `?1`
    Question,
}

impl Placeholder {
    fn render(self, n: usize) -> String {
        match self {
            Placeholder::Dollar => format!("${}", n),
            Placeholder::Question => format!("?{}", n),
        }
    }
}

/// Statement text and its arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Statement {
    /// A statement without arguments
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    pub fn delete_all(table: &str) -> Self {
        Self::raw(format!("DELETE FROM {}", table))
    }

    pub fn count(table: &str) -> Self {
        Self::raw(format!("SELECT COUNT(1) AS c FROM {}", table))
    }

    /// Multi-row insert covering exactly `columns`
    pub fn insert(table: &str, columns: &[String], rows: &[Row], style: Placeholder) -> Self {
        let mut args = Vec::with_capacity(columns.len() * rows.len());
        let mut tuples = Vec::with_capacity(rows.len());

        for row in rows {
            let placeholders: Vec<String> = row
                .iter()
                .map(|value| {
                    args.push(value.clone());
                    style.render(args.len())
                })
                .collect();
            tuples.push(format!("({})", placeholders.join(",")));
        }

        Self {
            sql: format!(
                "INSERT INTO {} ({}) VALUES {}",
                table,
                columns.join(","),
                tuples.join(",")
            ),
            args,
        }
    }

    /// Projection of `columns` filtered by an equality conjunction
    pub fn select_where(
        table: &str,
        columns: &[String],
        predicate: &Predicate,
        style: Placeholder,
        limit: Option<usize>,
    ) -> Self {
        let mut sql = format!("SELECT {} FROM {}", projection(columns), table);
        let mut args = Vec::with_capacity(predicate.len());

        for (i, (column, cond)) in predicate.conditions().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            match cond {
                Condition::IsNull => {
                    sql.push_str(column);
                    sql.push_str(" IS NULL");
                }
                Condition::Eq(value) => {
                    args.push(value.clone());
                    sql.push_str(&format!("{} = {}", column, style.render(args.len())));
                }
            }
        }

        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        Self { sql, args }
    }

    /// First `limit` rows of a table; empty `columns` selects all
    pub fn select_limit(table: &str, columns: &[String], limit: usize) -> Self {
        Self::raw(format!(
            "SELECT {} FROM {} LIMIT {}",
            projection(columns),
            table,
            limit
        ))
    }
}

fn projection(columns: &[String]) -> String {
    if columns.is_empty() {
        "*".to_string()
    } else {
        columns.join(", ")
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.sql)?;
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(encode).collect();
            write!(f, " [{}]", args.join(" "))?;
        }
        Ok(())
    }
}
