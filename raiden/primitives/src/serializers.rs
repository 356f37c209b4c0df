use std::collections::HashMap;

use serde::{
	ser::SerializeMap,
	Serialize,
	Serializer,
};
use web3::types::U256;

use crate::{
	hashing::to_checksum_address,
	types::{
		Address,
		U64,
	},
};

impl Serialize for U64 {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_u64(self.low_u64())
	}
}

pub fn u256_to_str<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.serialize_str(&value.to_string())
}

pub fn u64_to_str<S>(value: &U64, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.serialize_str(&value.to_string())
}

pub fn address_to_checksum<S>(address: &Address, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.serialize_str(&to_checksum_address(address))
}

pub fn option_address_to_checksum<S>(
	address: &Option<Address>,
	serializer: S,
) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	match address {
		Some(address) => serializer.serialize_some(&to_checksum_address(address)),
		None => serializer.serialize_none(),
	}
}

/// Serializes an address to address mapping with both sides checksummed.
pub fn checksummed_address_map<S>(
	map: &HashMap<Address, Address>,
	serializer: S,
) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let mut entries = serializer.serialize_map(Some(map.len()))?;
	for (key, value) in map {
		entries.serialize_entry(&to_checksum_address(key), &to_checksum_address(value))?;
	}
	entries.end()
}
