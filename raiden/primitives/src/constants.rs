use lazy_static::lazy_static;
use web3::signing::keccak256;

use crate::types::Locksroot;

lazy_static! {
	/// Commitment over an empty lock set.
	pub static ref LOCKSROOT_OF_NO_LOCKS: Locksroot = Locksroot::from_slice(&keccak256(&[]));
}

/// Length of an encoded lock: expiration, amount and secrethash words.
pub const ENCODED_LOCK_LENGTH: usize = 96;
