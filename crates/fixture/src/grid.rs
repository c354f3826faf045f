//! Header-plus-rows string grids

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::str::FromStr;

/// Marker forcing a cell to be taken literally as a string
pub const STRING_SUFFIX: &str = "::string";

/// A grid of string cells; row 0 is the header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Checks the grid has a unique header and at least one data row of the
    /// header's width.
    pub fn validate(&self) -> Result<()> {
        if self.rows.len() < 2 {
            return Err(Error::RowRequired);
        }

        let header = self.header();
        let mut seen = HashSet::with_capacity(header.len());
        for column in header {
            if !seen.insert(column.as_str()) {
                return Err(Error::MalformedGrid(format!(
                    "duplicate header column {}",
                    column
                )));
            }
        }

        for (i, row) in self.data_rows().iter().enumerate() {
            if row.len() != header.len() {
                return Err(Error::MalformedGrid(format!(
                    "row {} has {} cells, header has {}",
                    i,
                    row.len(),
                    header.len()
                )));
            }
        }

        Ok(())
    }
}

impl<S: Into<String>> From<Vec<Vec<S>>> for Grid {
    fn from(rows: Vec<Vec<S>>) -> Self {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }
}

/// Parses a pipe table such as
///
/// ```text
/// | id | foo   |
/// | 1  | foo-1 |
/// ```
///
/// Blank lines are ignored and cells are trimmed.
impl FromStr for Grid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for line in s.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let inner = line
                .strip_prefix('|')
                .and_then(|l| l.strip_suffix('|'))
                .ok_or_else(|| Error::MalformedGrid(format!("line not delimited by '|': {}", line)))?;
            rows.push(inner.split('|').map(|c| c.trim().to_string()).collect());
        }
        Ok(Self::new(rows))
    }
}
