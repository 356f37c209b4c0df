use serde::Deserialize;
use serde_json::json;

use crate::{
	deserializers::{
		parse_u256,
		u256_from_any,
	},
	types::{
		U256,
		U64,
	},
};

#[derive(Deserialize)]
struct Amount {
	#[serde(deserialize_with = "u256_from_any")]
	value: U256,
}

#[test]
fn test_deserialize_u256_from_decimal_string() {
	let result: Amount =
		serde_json::from_value(json!({ "value": "123" })).expect("Should deserialize");
	assert_eq!(result.value, U256::from(123));
}

#[test]
fn test_deserialize_u256_from_number() {
	let result: Amount =
		serde_json::from_value(json!({ "value": 42u64 })).expect("Should deserialize");
	assert_eq!(result.value, U256::from(42));
}

#[test]
fn test_deserialize_u256_from_hex_string() {
	let result: Amount =
		serde_json::from_value(json!({ "value": "0xff" })).expect("Should deserialize");
	assert_eq!(result.value, U256::from(255));
}

#[test]
fn test_deserialize_u256_rejects_garbage() {
	assert!(serde_json::from_value::<Amount>(json!({ "value": "12abc" })).is_err());
	assert!(serde_json::from_value::<Amount>(json!({ "value": -1 })).is_err());
	assert!(serde_json::from_value::<Amount>(json!({ "value": true })).is_err());
	assert!(parse_u256("0x").is_none());
	assert!(parse_u256("").is_none());
}

#[test]
fn test_deserialize_u64_from_number_or_string() {
	let number: U64 = serde_json::from_value(json!(7u64)).expect("Should deserialize");
	let string: U64 = serde_json::from_value(json!("7")).expect("Should deserialize");
	let hex: U64 = serde_json::from_value(json!("0x7")).expect("Should deserialize");
	assert_eq!(number, U64::from(7u64));
	assert_eq!(string, number);
	assert_eq!(hex, number);
}

#[test]
fn test_serialize_u64_as_number() {
	let value = serde_json::to_value(U64::from(100u64)).expect("Should serialize");
	assert_eq!(value, json!(100));
}
