//! Record schemas and typed records
//!
//! A [`RecordSchema`] is the explicit descriptor of one table's row type:
//! an ordered list of columns and their declared types. Field groups shared
//! by several row types are built as their own schema and embedded, which
//! flattens their columns into the enclosing namespace.

use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tabula_value::{DataType, Value};
use uuid::Uuid;

static NULL_VALUE: Value = Value::Null;

/// One column of a record schema
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
}

/// Ordered column descriptor of a record type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSchema {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
}

impl RecordSchema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn data_type(&self, column: &str) -> Option<&DataType> {
        self.position(column).map(|i| &self.columns[i].data_type)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Builder for [`RecordSchema`]
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    columns: Vec<Column>,
}

impl SchemaBuilder {
    pub fn column(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.columns.push(Column {
            name: name.into(),
            data_type,
        });
        self
    }

    /// Column whose zero value is NULL
    pub fn nullable(self, name: impl Into<String>, data_type: DataType) -> Self {
        self.column(name, DataType::nullable(data_type))
    }

    /// Flatten an embedded field group into this schema
    pub fn embed(mut self, group: &RecordSchema) -> Self {
        self.columns.extend(group.columns.iter().cloned());
        self
    }

    pub fn build(self) -> Result<RecordSchema> {
        let mut index = HashMap::with_capacity(self.columns.len());
        for (i, column) in self.columns.iter().enumerate() {
            if index.insert(column.name.clone(), i).is_some() {
                return Err(Error::DuplicateColumn(column.name.clone()));
            }
        }

        Ok(RecordSchema {
            columns: self.columns,
            index,
        })
    }
}

/// One row of a table, laid out by its schema.
///
/// Fields never set hold `Null`, the zero value.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<RecordSchema>,
    values: Vec<Value>,
}

impl Record {
    pub fn new(schema: Arc<RecordSchema>) -> Self {
        let values = vec![Value::Null; schema.len()];
        Self { schema, values }
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.schema.position(column).map(|i| &self.values[i])
    }

    /// Field value, `Null` for columns outside the schema
    pub fn value(&self, column: &str) -> &Value {
        self.get(column).unwrap_or(&NULL_VALUE)
    }

    pub fn set(&mut self, column: &str, value: Value) -> Result<()> {
        let i = self
            .schema
            .position(column)
            .ok_or_else(|| Error::UnknownColumn {
                column: column.to_string(),
            })?;
        self.values[i] = value;
        Ok(())
    }

    /// Typed field access
    pub fn get_as<T: FieldValue>(&self, column: &str) -> Result<T> {
        let value = self.get(column).ok_or_else(|| Error::UnknownColumn {
            column: column.to_string(),
        })?;

        T::from_field(value).ok_or_else(|| Error::FieldType {
            column: column.to_string(),
            expected: T::EXPECTED,
            found: value.clone(),
        })
    }

    /// Values of `columns`, in that order
    pub fn project(&self, columns: &[String]) -> Vec<Value> {
        columns.iter().map(|c| self.value(c).clone()).collect()
    }
}

/// Conversion from a record field into a Rust value
pub trait FieldValue: Sized {
    /// Name reported when the conversion fails
    const EXPECTED: &'static str;

    fn from_field(value: &Value) -> Option<Self>;
}

macro_rules! impl_field_value {
    ($($ty:ty => $name:literal, $($variant:ident)|+;)*) => {
        $(
            impl FieldValue for $ty {
                const EXPECTED: &'static str = $name;

                fn from_field(value: &Value) -> Option<Self> {
                    match value {
                        $(Value::$variant(v) => <$ty>::try_from(v.clone()).ok(),)+
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_field_value! {
    bool => "bool", Bool;
    i16 => "i16", I16;
    i32 => "i32", I16 | I32;
    i64 => "i64", I16 | I32 | I64 | U32 | U64;
    u32 => "u32", U32;
    u64 => "u64", U32 | U64 | I64;
    f32 => "f32", F32;
    f64 => "f64", F32 | F64;
    Decimal => "decimal", Decimal;
    String => "string", Str;
    NaiveDate => "date", Date;
    NaiveTime => "time", Time;
    NaiveDateTime => "timestamp", Timestamp;
    Uuid => "uuid", Uuid;
    Vec<u8> => "bytes", Bytea;
    serde_json::Value => "json", Json;
}

impl<T: FieldValue> FieldValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_field(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_field(other).map(Some),
        }
    }
}

impl FieldValue for Value {
    const EXPECTED: &'static str = "value";

    fn from_field(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

/// A Rust struct that maps to one table row.
///
/// Lets a grid decode straight into typed rows with
/// [`crate::TableMapper::slice_from_table`].
pub trait TableRow: Sized {
    fn schema() -> Result<RecordSchema>;

    fn from_record(record: &Record) -> Result<Self>;

    fn to_record(&self, schema: Arc<RecordSchema>) -> Result<Record>;
}
