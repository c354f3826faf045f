//! Column data types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a record field / table column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    // Boolean
    Bool,
    // Integer types
    I16,
    I32,
    I64,
    U32,
    U64,
    // Float types
    F32,
    F64,
    // Arbitrary precision decimal
    Decimal,
    // String
    Str,
    // Date/Time types
    Date,
    Time,
    Timestamp,
    // Special types
    Uuid,
    Bytea,
    // Variable-size list (e.g., TEXT[])
    List(Box<DataType>),
    // JSON type (schemaless)
    Json,
    // Optional field, NULL is the zero value
    Nullable(Box<DataType>),
    // Explicit Null type (for NULL literals)
    Null,
}

impl DataType {
    /// Wrap a type as nullable
    pub fn nullable(inner: DataType) -> Self {
        match inner {
            DataType::Nullable(_) => inner,
            other => DataType::Nullable(Box::new(other)),
        }
    }

    pub fn base_type(&self) -> &DataType {
        match self {
            DataType::Nullable(inner) => inner.base_type(),
            _ => self,
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, DataType::Nullable(_) | DataType::Null)
    }

    /// Check if this type is an integer (signed or unsigned)
    pub fn is_integer(&self) -> bool {
        matches!(
            self.base_type(),
            DataType::I16 | DataType::I32 | DataType::I64 | DataType::U32 | DataType::U64
        )
    }

    /// Check if this type is numeric (integer, float, or decimal)
    pub fn is_numeric(&self) -> bool {
        self.is_integer()
            || matches!(
                self.base_type(),
                DataType::F32 | DataType::F64 | DataType::Decimal
            )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Bool => write!(f, "BOOLEAN"),
            DataType::I16 => write!(f, "SMALLINT"),
            DataType::I32 => write!(f, "INT"),
            DataType::I64 => write!(f, "BIGINT"),
            DataType::U32 => write!(f, "INT UNSIGNED"),
            DataType::U64 => write!(f, "BIGINT UNSIGNED"),
            DataType::F32 => write!(f, "REAL"),
            DataType::F64 => write!(f, "DOUBLE PRECISION"),
            DataType::Decimal => write!(f, "DECIMAL"),
            DataType::Str => write!(f, "VARCHAR"),
            DataType::Date => write!(f, "DATE"),
            DataType::Time => write!(f, "TIME"),
            DataType::Timestamp => write!(f, "TIMESTAMP"),
            DataType::Uuid => write!(f, "UUID"),
            DataType::Bytea => write!(f, "BYTEA"),
            DataType::List(inner) => write!(f, "{}[]", inner),
            DataType::Json => write!(f, "JSON"),
            DataType::Nullable(inner) => write!(f, "{} NULL", inner),
            DataType::Null => write!(f, "NULL"),
        }
    }
}
