//! Per-type cell codec overrides
//!
//! Every column type has a default text codec in `tabula-value`. A
//! [`CodecRegistry`] lets a fixture override it for one declared type, for
//! example to accept a custom array notation. Lookups try the exact declared
//! type first and then its base type, so an override for `Str` also applies
//! to nullable string columns.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tabula_value::{CodecError, DataType, Value};

/// Text codec for one column type
pub trait CellCodec: Send + Sync {
    fn decode(&self, cell: &str, target: &DataType) -> Result<Value, CodecError>;

    fn encode(&self, value: &Value) -> String {
        tabula_value::encode(value)
    }
}

/// Decode-only codec backed by a function
pub struct FnCodec<F>(pub F);

impl<F> CellCodec for FnCodec<F>
where
    F: Fn(&str, &DataType) -> Result<Value, CodecError> + Send + Sync,
{
    fn decode(&self, cell: &str, target: &DataType) -> Result<Value, CodecError> {
        (self.0)(cell, target)
    }
}

/// Codec overrides keyed by declared column type
#[derive(Default, Clone)]
pub struct CodecRegistry {
    codecs: HashMap<DataType, Arc<dyn CellCodec>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, data_type: DataType, codec: impl CellCodec + 'static) -> Self {
        self.codecs.insert(data_type, Arc::new(codec));
        self
    }

    pub fn register_fn<F>(self, data_type: DataType, decode: F) -> Self
    where
        F: Fn(&str, &DataType) -> Result<Value, CodecError> + Send + Sync + 'static,
    {
        self.register(data_type, FnCodec(decode))
    }

    pub fn lookup(&self, data_type: &DataType) -> Option<&Arc<dyn CellCodec>> {
        self.codecs
            .get(data_type)
            .or_else(|| self.codecs.get(data_type.base_type()))
    }

    pub fn decode(&self, cell: &str, target: &DataType) -> Result<Value, CodecError> {
        match self.lookup(target) {
            Some(codec) => codec.decode(cell, target),
            None => tabula_value::decode(cell, target),
        }
    }

    /// Encode a value, using the override registered for its own type
    pub fn encode(&self, value: &Value) -> String {
        if value.is_null() {
            return tabula_value::NULL.to_string();
        }
        match self.lookup(&value.data_type()) {
            Some(codec) => codec.encode(value),
            None => tabula_value::encode(value),
        }
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("types", &self.codecs.keys().collect::<Vec<_>>())
            .finish()
    }
}
