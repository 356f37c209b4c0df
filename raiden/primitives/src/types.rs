pub use web3::types::{
	Address,
	Bytes,
	H256,
	U256,
};

mod numeric;
pub use numeric::*;

pub type AdditionalHash = H256;

pub type BlockExpiration = U64;

pub type BlockNumber = U64;

pub type BlockTimeout = U64;

pub type ChainID = u64;

pub type ChannelIdentifier = U64;

pub type EncodedLock = Bytes;

pub type FeeAmount = U256;

pub type LockedAmount = U256;

pub type Locksroot = H256;

pub type MessageIdentifier = U64;

pub type Nonce = U256;

pub type OneToNAddress = Address;

pub type PaymentIdentifier = U64;

pub type Secret = Bytes;

pub type SecretHash = H256;

pub type SettleTimeout = U64;

pub type Signature = Bytes;

pub type TokenAddress = Address;

pub type TokenAmount = U256;

pub type TokenNetworkAddress = Address;

pub type TokenNetworkRegistryAddress = Address;

pub type TransactionHash = H256;

/// Milliseconds since the unix epoch, as stored next to timed values.
pub type Timestamp = u64;
