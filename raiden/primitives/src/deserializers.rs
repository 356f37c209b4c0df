use std::{
	fmt,
	str::FromStr,
};

use serde::{
	de::{
		Error,
		Visitor,
	},
	Deserialize,
	Deserializer,
};
use web3::types::U256;

use crate::types::U64;

/// Parses a decimal string, or a `0x` prefixed hex string, into a `U256`.
pub fn parse_u256(value: &str) -> Option<U256> {
	match value.strip_prefix("0x") {
		Some(hex) if !hex.is_empty() => U256::from_str(hex).ok(),
		Some(_) => None,
		None if value.is_empty() => None,
		None => U256::from_dec_str(value).ok(),
	}
}

/// Deserializes a `U256` from a JSON integer or a numeric string.
///
/// Persisted states store amounts as decimal strings, older snapshots may
/// carry plain integers or hex.
pub fn u256_from_any<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
	D: Deserializer<'de>,
{
	struct AmountVisitor;

	impl<'de> Visitor<'de> for AmountVisitor {
		type Value = U256;

		fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
			f.write_str("an unsigned integer as a number or string")
		}

		fn visit_u64<E>(self, num: u64) -> Result<Self::Value, E>
		where
			E: Error,
		{
			Ok(U256::from(num))
		}

		fn visit_i64<E>(self, num: i64) -> Result<Self::Value, E>
		where
			E: Error,
		{
			if num < 0 {
				return Err(Error::custom(format!("negative value {}", num)))
			}
			Ok(U256::from(num as u64))
		}

		fn visit_str<E>(self, num: &str) -> Result<Self::Value, E>
		where
			E: Error,
		{
			parse_u256(num).ok_or_else(|| Error::custom(format!("invalid integer string `{}`", num)))
		}
	}

	deserializer.deserialize_any(AmountVisitor)
}

impl<'de> Deserialize<'de> for U64 {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		struct NumVisitor;

		impl<'de> Visitor<'de> for NumVisitor {
			type Value = U64;

			fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
				f.write_str("U64 as a number or string")
			}

			fn visit_u64<E>(self, num: u64) -> Result<Self::Value, E>
			where
				E: Error,
			{
				Ok(U64::from(num))
			}

			fn visit_i64<E>(self, num: i64) -> Result<Self::Value, E>
			where
				E: Error,
			{
				if num < 0 {
					return Err(Error::custom(format!("negative value {}", num)))
				}
				Ok(U64::from(num as u64))
			}

			fn visit_str<E>(self, num: &str) -> Result<Self::Value, E>
			where
				E: Error,
			{
				U64::from_str(num).map_err(|_| Error::custom("Could not parse U64 from string"))
			}
		}

		deserializer.deserialize_any(NumVisitor)
	}
}
