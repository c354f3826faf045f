//! Text codec round-trip properties

use chrono::{DateTime, NaiveDate, NaiveTime};
use proptest::prelude::*;
use rust_decimal::Decimal;
use tabula_value::{DataType, NULL, Value, decode, encode};
use uuid::Uuid;

fn roundtrip(value: &Value) -> Value {
    decode(&encode(value), &value.data_type()).unwrap()
}

fn json_value() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        any::<i64>().prop_map(serde_json::Value::from),
        "[a-z \"\\\\,]{0,8}".prop_map(serde_json::Value::String),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn prop_integer_roundtrip(a in any::<i16>(), b in any::<i32>(), c in any::<i64>(), d in any::<u64>()) {
        for v in [Value::I16(a), Value::I32(b), Value::I64(c), Value::U64(d)] {
            prop_assert_eq!(roundtrip(&v), v);
        }
    }

    #[test]
    fn prop_unsigned_roundtrip(u in any::<u32>()) {
        let v = Value::U32(u);
        prop_assert_eq!(roundtrip(&v), v);
    }

    #[test]
    fn prop_bool_roundtrip(b in any::<bool>()) {
        let v = Value::Bool(b);
        prop_assert_eq!(roundtrip(&v), v);
    }

    #[test]
    fn prop_float_roundtrip(f in -1.0e15f64..1.0e15f64, g in -1.0e7f32..1.0e7f32) {
        for v in [Value::F64(f), Value::F32(g)] {
            prop_assert_eq!(roundtrip(&v), v);
        }
    }

    #[test]
    fn prop_string_roundtrip(s in any::<String>()) {
        let v = Value::Str(s);
        prop_assert_eq!(roundtrip(&v), v);
    }

    #[test]
    fn prop_date_roundtrip(days in 1i32..3_000_000) {
        let v = Value::Date(NaiveDate::from_num_days_from_ce_opt(days).unwrap());
        prop_assert_eq!(roundtrip(&v), v);
    }

    #[test]
    fn prop_time_roundtrip(secs in 0u32..86_400, nanos in 0u32..1_000_000_000) {
        let v = Value::Time(NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos).unwrap());
        prop_assert_eq!(roundtrip(&v), v);
    }

    #[test]
    fn prop_json_roundtrip(j in json_value()) {
        let v = Value::Json(j);
        prop_assert_eq!(roundtrip(&v), v);
    }

    #[test]
    fn prop_json_list_roundtrip(items in prop::collection::vec(json_value(), 0..4)) {
        let v = Value::List(items.into_iter().map(Value::Json).collect());
        prop_assert_eq!(decode(&encode(&v), &DataType::List(Box::new(DataType::Json))).unwrap(), v);
    }

    #[test]
    fn prop_decimal_roundtrip(mantissa in any::<i64>(), scale in 0u32..12) {
        let v = Value::Decimal(Decimal::new(mantissa, scale));
        prop_assert_eq!(roundtrip(&v), v);
    }

    #[test]
    fn prop_timestamp_roundtrip(secs in 0i64..4_000_000_000, micros in 0u32..1_000_000) {
        let ts = DateTime::from_timestamp(secs, micros * 1000).unwrap().naive_utc();
        let v = Value::Timestamp(ts);
        prop_assert_eq!(roundtrip(&v), v);
    }

    #[test]
    fn prop_uuid_roundtrip(n in any::<u128>()) {
        let v = Value::Uuid(Uuid::from_u128(n));
        prop_assert_eq!(roundtrip(&v), v);
    }

    #[test]
    fn prop_bytea_roundtrip(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let v = Value::Bytea(bytes);
        prop_assert_eq!(roundtrip(&v), v);
    }

    #[test]
    fn prop_string_list_roundtrip(items in prop::collection::vec("[a-z ,\"]{0,8}", 0..6)) {
        let v = Value::List(items.into_iter().map(Value::Str).collect());
        prop_assert_eq!(decode(&encode(&v), &DataType::List(Box::new(DataType::Str))).unwrap(), v);
    }
}

#[test]
fn test_null_and_absent_optional_encode_as_null() {
    assert_eq!(encode(&Value::Null), NULL);
    assert_eq!(encode(&Value::from(None::<String>)), NULL);
    assert_eq!(encode(&Value::from(None::<chrono::NaiveDateTime>)), NULL);
}

#[test]
fn test_zero_values_are_not_null() {
    assert_eq!(encode(&Value::I64(0)), "0");
    assert_eq!(encode(&Value::Str(String::new())), "");
    assert_eq!(
        encode(&Value::Timestamp(chrono::NaiveDateTime::default())),
        "1970-01-01T00:00:00Z"
    );
}

#[test]
fn test_date_and_time_roundtrip() {
    for (text, ty) in [
        ("2021-03-04", DataType::Date),
        ("12:30:00", DataType::Time),
        ("12:30:00.250", DataType::Time),
        ("true", DataType::Bool),
        ("1.5", DataType::F32),
    ] {
        let v = decode(text, &ty).unwrap();
        assert_eq!(encode(&v), text, "{ty}");
    }
}
