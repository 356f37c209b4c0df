#![warn(clippy::missing_docs_in_private_items)]

use std::{
	ops::{
		Add,
		Sub,
	},
	str::FromStr,
};

use derive_more::Display;
use web3::types::{
	U256,
	U64 as PrimitiveU64,
};

/// Block numbers and other small counters, wrapping web3's `U64`.
#[derive(
	Default, Copy, Clone, Display, Debug, derive_more::Deref, Eq, Ord, PartialEq, PartialOrd, Hash,
)]
pub struct U64(PrimitiveU64);

impl U64 {
	/// Addition that stops at the numeric bound.
	pub fn saturating_add(self, rhs: U64) -> U64 {
		Self(self.0.saturating_add(rhs.0))
	}

	/// Subtraction that stops at zero.
	pub fn saturating_sub(self, rhs: U64) -> U64 {
		Self(self.0.saturating_sub(rhs.0))
	}

	/// The value left padded to a 32 bytes big endian word.
	pub fn to_be_bytes(&self) -> Vec<u8> {
		let mut bytes = [0u8; 32];
		bytes[24..].copy_from_slice(&self.0.low_u64().to_be_bytes());
		bytes.to_vec()
	}
}

impl From<PrimitiveU64> for U64 {
	fn from(n: PrimitiveU64) -> Self {
		Self(n)
	}
}

impl From<U64> for PrimitiveU64 {
	fn from(n: U64) -> Self {
		n.0
	}
}

impl From<u64> for U64 {
	fn from(n: u64) -> Self {
		Self(n.into())
	}
}

impl From<u32> for U64 {
	fn from(n: u32) -> Self {
		Self((n as u64).into())
	}
}

impl From<U64> for U256 {
	fn from(num: U64) -> Self {
		num.0.low_u64().into()
	}
}

impl FromStr for U64 {
	type Err = ();

	/// Accepts decimal digits or a `0x` prefixed hex string.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if let Some(hex) = s.strip_prefix("0x") {
			let num = PrimitiveU64::from_str(hex).map_err(|_| ())?;
			return Ok(U64(num))
		}
		let num = PrimitiveU64::from_dec_str(s).map_err(|_| ())?;
		Ok(U64(num))
	}
}

impl Add<U64> for U64 {
	type Output = U64;

	fn add(self, rhs: U64) -> Self::Output {
		U64::from(self.0 + rhs.0)
	}
}

impl Sub<U64> for U64 {
	type Output = U64;

	fn sub(self, rhs: U64) -> Self::Output {
		U64::from(self.0 - rhs.0)
	}
}
