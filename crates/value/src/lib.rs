//! Tabula Value - typed cell values for the tabula fixture engine
//!
//! This crate provides:
//! - A `Value` type covering the scalar SQL types test tables use, plus lists and JSON
//! - A `DataType` describing the declared type of a record field
//! - A text codec converting values to canonical cell text and back

pub mod codec;
pub mod data_type;
pub mod types;

pub use codec::{CodecError, NULL, decode, encode};
pub use data_type::DataType;
pub use types::{Row, Value};
