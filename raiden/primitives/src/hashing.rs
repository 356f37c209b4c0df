use sha2::{
	Digest,
	Sha256,
};
use web3::signing::keccak256;

use crate::{
	constants::ENCODED_LOCK_LENGTH,
	types::{
		Address,
		BlockExpiration,
		Bytes,
		EncodedLock,
		Locksroot,
		SecretHash,
		TokenAmount,
	},
};

/// The secrethash committed to by a lock.
pub fn hash_secret(secret: &[u8]) -> SecretHash {
	let mut hasher = Sha256::new();
	hasher.update(secret);
	SecretHash::from_slice(&hasher.finalize())
}

/// Packs a lock the way the token network contract expects it when unlocking.
pub fn pack_lock(
	expiration: BlockExpiration,
	amount: TokenAmount,
	secrethash: SecretHash,
) -> EncodedLock {
	let mut data = Vec::with_capacity(ENCODED_LOCK_LENGTH);
	data.extend(expiration.to_be_bytes());

	let mut amount_bytes = [0u8; 32];
	amount.to_big_endian(&mut amount_bytes);
	data.extend_from_slice(&amount_bytes);

	data.extend_from_slice(secrethash.as_bytes());
	Bytes(data)
}

/// keccak256 over the concatenation of the encoded locks, in order.
pub fn compute_locksroot(locks: &[EncodedLock]) -> Locksroot {
	let locks: Vec<&[u8]> = locks.iter().map(|lock| lock.0.as_slice()).collect();
	Locksroot::from_slice(&keccak256(&locks.concat()))
}

/// EIP-55 mixed-case representation of an address.
pub fn to_checksum_address(address: &Address) -> String {
	let lowercase = hex::encode(address.as_bytes());
	let hash = keccak256(lowercase.as_bytes());

	let mut checksummed = String::with_capacity(42);
	checksummed.push_str("0x");
	for (index, c) in lowercase.chars().enumerate() {
		let nibble =
			if index % 2 == 0 { hash[index / 2] >> 4 } else { hash[index / 2] & 0x0f };
		if nibble >= 8 {
			checksummed.push(c.to_ascii_uppercase());
		} else {
			checksummed.push(c);
		}
	}
	checksummed
}
