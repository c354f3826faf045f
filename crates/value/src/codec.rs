//! Text cell codec for Value
//!
//! Converts values to their canonical cell text and parses cell text back
//! into a value of a declared type. `encode` output is always accepted by
//! `decode` for the value's own type.

use crate::data_type::DataType;
use crate::types::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Cell text of an absent value.
pub const NULL: &str = "NULL";

pub type Result<T> = std::result::Result<T, CodecError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("cannot decode {input:?} as {target}: {reason}")]
    InvalidValue {
        input: String,
        target: DataType,
        reason: String,
    },

    #[error("type {0} cannot be decoded from a cell")]
    UnsupportedType(DataType),
}

impl CodecError {
    fn invalid(input: &str, target: &DataType, reason: impl ToString) -> Self {
        CodecError::InvalidValue {
            input: input.to_string(),
            target: target.clone(),
            reason: reason.to_string(),
        }
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Canonical cell text for a value, `NULL` for absent values
pub fn encode(value: &Value) -> String {
    match value {
        Value::Null => NULL.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::I16(i) => i.to_string(),
        Value::I32(i) => i.to_string(),
        Value::I64(i) => i.to_string(),
        Value::U32(u) => u.to_string(),
        Value::U64(u) => u.to_string(),
        Value::F32(f) => f.to_string(),
        Value::F64(f) => f.to_string(),
        Value::Decimal(d) => d.to_string(),
        Value::Str(s) => s.clone(),
        Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        Value::Time(t) => t.format("%H:%M:%S%.f").to_string(),
        Value::Timestamp(ts) => ts.and_utc().to_rfc3339_opts(SecondsFormat::AutoSi, true),
        Value::Uuid(u) => u.hyphenated().to_string(),
        Value::Bytea(b) => format!("\\x{}", hex::encode(b)),
        Value::List(items) => {
            serde_json::Value::Array(items.iter().map(list_item_to_json).collect()).to_string()
        }
        Value::Json(j) => j.to_string(),
    }
}

fn list_item_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::I16(i) => (*i).into(),
        Value::I32(i) => (*i).into(),
        Value::I64(i) => (*i).into(),
        Value::U32(u) => (*u).into(),
        Value::U64(u) => (*u).into(),
        Value::Json(j) => j.clone(),
        other => serde_json::Value::String(encode(other)),
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Parse cell text into a value of the target type.
///
/// The literal `NULL` is not special here; callers decide whether a cell is
/// absent before decoding it.
pub fn decode(s: &str, target: &DataType) -> Result<Value> {
    match target {
        DataType::Nullable(inner) => decode(s, inner),
        DataType::Null => Err(CodecError::UnsupportedType(DataType::Null)),
        DataType::Str => Ok(Value::Str(s.to_string())),
        DataType::Bool => parse_bool(s),
        DataType::I16 => parse_num(s, target, Value::I16),
        DataType::I32 => parse_num(s, target, Value::I32),
        DataType::I64 => parse_num(s, target, Value::I64),
        DataType::U32 => parse_num(s, target, Value::U32),
        DataType::U64 => parse_num(s, target, Value::U64),
        DataType::F32 => parse_num(s, target, Value::F32),
        DataType::F64 => parse_num(s, target, Value::F64),
        DataType::Decimal => parse_decimal(s),
        DataType::Date => parse_date(s),
        DataType::Time => parse_time(s),
        DataType::Timestamp => parse_timestamp(s),
        DataType::Uuid => Uuid::parse_str(s.trim())
            .map(Value::Uuid)
            .map_err(|e| CodecError::invalid(s, target, e)),
        DataType::Bytea => parse_bytea(s),
        DataType::List(inner) => parse_list(s, inner),
        DataType::Json => serde_json::from_str(s)
            .map(Value::Json)
            .map_err(|e| CodecError::invalid(s, target, e)),
    }
}

fn parse_num<T>(s: &str, target: &DataType, wrap: fn(T) -> Value) -> Result<Value>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    s.trim()
        .parse::<T>()
        .map(wrap)
        .map_err(|e| CodecError::invalid(s, target, e))
}

fn parse_bool(s: &str) -> Result<Value> {
    match s.trim().to_uppercase().as_str() {
        "TRUE" | "T" | "YES" | "Y" | "1" => Ok(Value::Bool(true)),
        "FALSE" | "F" | "NO" | "N" | "0" => Ok(Value::Bool(false)),
        _ => Err(CodecError::invalid(s, &DataType::Bool, "not a boolean")),
    }
}

fn parse_decimal(s: &str) -> Result<Value> {
    let trimmed = s.trim();
    trimmed
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map(Value::Decimal)
        .map_err(|e| CodecError::invalid(s, &DataType::Decimal, e))
}

fn parse_date(s: &str) -> Result<Value> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map(Value::Date)
        .map_err(|e| CodecError::invalid(s, &DataType::Date, e))
}

fn parse_time(s: &str) -> Result<Value> {
    let trimmed = s.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map(Value::Time)
        .map_err(|e| CodecError::invalid(s, &DataType::Time, e))
}

/// Timestamps are stored as UTC; offsets in the input are applied.
fn parse_timestamp(s: &str) -> Result<Value> {
    let trimmed = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Value::Timestamp(dt.naive_utc()));
    }

    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| {
            DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f%#z").map(|dt| dt.naive_utc())
        })
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map(NaiveDateTime::from))
        .map(Value::Timestamp)
        .map_err(|e| CodecError::invalid(s, &DataType::Timestamp, e))
}

/// Accepts `\x48656c6c6f`, `0x48656c6c6f` or bare hex.
fn parse_bytea(s: &str) -> Result<Value> {
    let trimmed = s.trim();
    let hex_str = ["\\x", "\\X", "0x", "0X"]
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed);

    hex::decode(hex_str)
        .map(Value::Bytea)
        .map_err(|e| CodecError::invalid(s, &DataType::Bytea, e))
}

/// Lists are either a JSON array or a comma-separated sequence.
fn parse_list(s: &str, inner: &DataType) -> Result<Value> {
    let target = DataType::List(Box::new(inner.clone()));
    let trimmed = s.trim();

    if trimmed.starts_with('[') {
        let items: Vec<serde_json::Value> =
            serde_json::from_str(trimmed).map_err(|e| CodecError::invalid(s, &target, e))?;

        // Items of a JSON list are kept as parsed, strings and nulls included.
        let json_items = *inner.base_type() == DataType::Json;
        return items
            .iter()
            .map(|item| match item {
                other if json_items => Ok(Value::Json(other.clone())),
                serde_json::Value::Null => Ok(Value::Null),
                serde_json::Value::String(text) => decode(text, inner),
                other => decode(&other.to_string(), inner),
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::List);
    }

    if trimmed.is_empty() {
        return Ok(Value::List(Vec::new()));
    }

    trimmed
        .split(',')
        .map(|item| decode(item.trim(), inner))
        .collect::<Result<Vec<_>>>()
        .map(Value::List)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode(&Value::Str("abc".into())), "abc");
        assert_eq!(encode(&Value::I64(123)), "123");
        assert_eq!(encode(&Value::F64(123.45)), "123.45");
        assert_eq!(encode(&Value::Null), "NULL");
        assert_eq!(encode(&Value::Bool(true)), "true");
        assert_eq!(encode(&Value::Bytea(b"Hi".to_vec())), "\\x4869");
    }

    #[test]
    fn test_encode_timestamp_is_rfc3339_utc() {
        let v = Value::Timestamp(ts("2021-01-01 00:00:00"));
        assert_eq!(encode(&v), "2021-01-01T00:00:00Z");

        let zero = Value::Timestamp(ts("0001-01-01 00:00:00"));
        assert_eq!(encode(&zero), "0001-01-01T00:00:00Z");
    }

    #[test]
    fn test_decode_timestamp_formats() {
        let expected = Value::Timestamp(ts("2021-01-02 03:04:05"));
        for input in [
            "2021-01-02T03:04:05Z",
            "2021-01-02T05:04:05+02:00",
            "2021-01-02 03:04:05",
            "2021-01-02T03:04:05",
        ] {
            assert_eq!(decode(input, &DataType::Timestamp).unwrap(), expected, "{input}");
        }

        assert_eq!(
            decode("2021-01-02", &DataType::Timestamp).unwrap(),
            Value::Timestamp(ts("2021-01-02 00:00:00"))
        );
    }

    #[test]
    fn test_decode_bool_variants() {
        assert_eq!(decode("Yes", &DataType::Bool).unwrap(), Value::Bool(true));
        assert_eq!(decode("0", &DataType::Bool).unwrap(), Value::Bool(false));
        assert!(decode("maybe", &DataType::Bool).is_err());
    }

    #[test]
    fn test_decode_error_names_type_and_input() {
        let err = decode("abc", &DataType::I32).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("\"abc\""), "{msg}");
        assert!(msg.contains("INT"), "{msg}");
    }

    #[test]
    fn test_decode_list_forms() {
        let list_type = DataType::List(Box::new(DataType::Str));
        let expected = Value::List(vec![Value::Str("a".into()), Value::Str("b".into())]);

        assert_eq!(decode("a,b", &list_type).unwrap(), expected);
        assert_eq!(decode(r#"["a","b"]"#, &list_type).unwrap(), expected);
        assert_eq!(decode("", &list_type).unwrap(), Value::List(vec![]));

        let ints = decode("[1,2]", &DataType::List(Box::new(DataType::I32))).unwrap();
        assert_eq!(ints, Value::List(vec![Value::I32(1), Value::I32(2)]));
        assert_eq!(encode(&ints), "[1,2]");
    }

    #[test]
    fn test_decode_json_list_keeps_string_items() {
        let list_type = DataType::List(Box::new(DataType::nullable(DataType::Json)));
        let v = decode(r#"["a",{"b":1},null]"#, &list_type).unwrap();

        assert_eq!(
            v,
            Value::List(vec![
                Value::Json("a".into()),
                Value::Json(serde_json::json!({"b": 1})),
                Value::Json(serde_json::Value::Null),
            ])
        );
        assert_eq!(encode(&v), r#"["a",{"b":1},null]"#);
    }

    #[test]
    fn test_nullable_decodes_inner() {
        let t = DataType::nullable(DataType::I64);
        assert_eq!(decode("7", &t).unwrap(), Value::I64(7));
    }

    #[test]
    fn test_json_is_compact() {
        let v = decode(r#"{ "a" : [1, 2] }"#, &DataType::Json).unwrap();
        assert_eq!(encode(&v), r#"{"a":[1,2]}"#);
    }
}
