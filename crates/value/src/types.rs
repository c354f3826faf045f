//! Value types for tabula
//!
//! Typed representation of a single relational cell, shared by the fixture
//! engine and every store backend.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::data_type::DataType;

/// A row of values, ordered like the columns that produced it
pub type Row = Vec<Value>;

/// Typed cell value
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    // Null
    Null,
    // Boolean
    Bool(bool),
    // Integer types
    I16(i16),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    // Float types
    F32(f32),
    F64(f64),
    // Decimal
    Decimal(Decimal),
    // String
    Str(String),
    // Date/Time types
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    // Special types
    Uuid(Uuid),
    Bytea(Vec<u8>),
    // Collection of values of one type
    List(Vec<Value>),
    // JSON type (schemaless)
    Json(serde_json::Value),
}

impl Value {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a null value
    pub fn null() -> Self {
        Value::Null
    }

    /// Create an I64 value (most common integer type)
    pub fn integer(i: i64) -> Self {
        Value::I64(i)
    }

    /// Create a string value
    pub fn string<S: Into<String>>(s: S) -> Self {
        Value::Str(s.into())
    }

    /// Create a JSON value
    pub fn json(j: serde_json::Value) -> Self {
        Value::Json(j)
    }

    // ========================================================================
    // Type Checks
    // ========================================================================

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if value is any integer type
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Value::I16(_) | Value::I32(_) | Value::I64(_) | Value::U32(_) | Value::U64(_)
        )
    }

    /// Check if value is numeric (integer, float, or decimal)
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, Value::F32(_) | Value::F64(_) | Value::Decimal(_))
    }

    /// The data type this value would decode back into.
    ///
    /// `Null` has no type of its own and reports `DataType::Null`.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null => DataType::Null,
            Value::Bool(_) => DataType::Bool,
            Value::I16(_) => DataType::I16,
            Value::I32(_) => DataType::I32,
            Value::I64(_) => DataType::I64,
            Value::U32(_) => DataType::U32,
            Value::U64(_) => DataType::U64,
            Value::F32(_) => DataType::F32,
            Value::F64(_) => DataType::F64,
            Value::Decimal(_) => DataType::Decimal,
            Value::Str(_) => DataType::Str,
            Value::Date(_) => DataType::Date,
            Value::Time(_) => DataType::Time,
            Value::Timestamp(_) => DataType::Timestamp,
            Value::Uuid(_) => DataType::Uuid,
            Value::Bytea(_) => DataType::Bytea,
            Value::List(items) => DataType::List(Box::new(
                items
                    .iter()
                    .find(|v| !v.is_null())
                    .map(Value::data_type)
                    .unwrap_or(DataType::Str),
            )),
            Value::Json(_) => DataType::Json,
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Decimal(_) => "decimal",
            Value::Str(_) => "string",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::Timestamp(_) => "timestamp",
            Value::Uuid(_) => "uuid",
            Value::Bytea(_) => "bytea",
            Value::List(_) => "list",
            Value::Json(_) => "json",
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    String => Str,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => Timestamp,
    Uuid => Uuid,
    Vec<u8> => Bytea,
    serde_json::Value => Json,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

/// Absent optionals are the zero value and map to `Null`.
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({:?})", b),
            Value::I16(i) => write!(f, "I16({:?})", i),
            Value::I32(i) => write!(f, "I32({:?})", i),
            Value::I64(i) => write!(f, "I64({:?})", i),
            Value::U32(u) => write!(f, "U32({:?})", u),
            Value::U64(u) => write!(f, "U64({:?})", u),
            Value::F32(fl) => write!(f, "F32({:?})", fl),
            Value::F64(fl) => write!(f, "F64({:?})", fl),
            Value::Decimal(d) => write!(f, "Decimal({:?})", d),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::Date(d) => write!(f, "Date({:?})", d),
            Value::Time(t) => write!(f, "Time({:?})", t),
            Value::Timestamp(ts) => write!(f, "Timestamp({:?})", ts),
            Value::Uuid(u) => write!(f, "Uuid({:?})", u),
            Value::Bytea(b) => write!(f, "Bytea({} bytes)", b.len()),
            Value::List(list) => write!(f, "List({:?})", list),
            Value::Json(j) => write!(f, "Json({})", j),
        }
    }
}

/// Displays the canonical cell text, identical to [`crate::encode`].
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::codec::encode(self))
    }
}
