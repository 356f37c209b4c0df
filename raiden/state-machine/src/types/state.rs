use std::collections::HashMap;

use derive_more::Display;
use raiden_primitives::{
	constants::LOCKSROOT_OF_NO_LOCKS,
	deserializers::u256_from_any,
	hashing::pack_lock,
	serializers::{
		address_to_checksum,
		checksummed_address_map,
		option_address_to_checksum,
		u256_to_str,
		u64_to_str,
	},
	types::{
		AdditionalHash,
		Address,
		BlockExpiration,
		BlockNumber,
		BlockTimeout,
		ChainID,
		ChannelIdentifier,
		EncodedLock,
		FeeAmount,
		LockedAmount,
		Locksroot,
		MessageIdentifier,
		Nonce,
		OneToNAddress,
		PaymentIdentifier,
		Secret,
		SecretHash,
		SettleTimeout,
		Signature,
		Timestamp,
		TokenAddress,
		TokenAmount,
		TokenNetworkAddress,
		TokenNetworkRegistryAddress,
		TransactionHash,
		U256,
	},
};
use serde::{
	Deserialize,
	Serialize,
};
use serde_json::{
	Map,
	Value,
};

use crate::constants::CURRENT_STATE_VERSION;

/// `partner@tokenNetwork`, both sides checksummed.
pub type ChannelKey = String;

/// `channelId#partner@tokenNetwork`, keys of settled channels.
pub type ChannelUniqueKey = String;

/// A value stamped with the time it was recorded.
///
/// Serialized as the value's own fields plus a `ts` member.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Timed<T> {
	#[serde(flatten)]
	pub value: T,
	pub ts: Timestamp,
}

impl<T> Timed<T> {
	pub fn new(value: T, ts: Timestamp) -> Self {
		Self { value, ts }
	}
}

/// Root of the persisted client state.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RaidenState {
	#[serde(serialize_with = "address_to_checksum")]
	pub address: Address,
	pub version: u32,
	pub chain_id: ChainID,
	#[serde(serialize_with = "address_to_checksum")]
	pub registry: TokenNetworkRegistryAddress,
	pub block_number: BlockNumber,
	#[serde(default)]
	pub config: Map<String, Value>,
	pub channels: HashMap<ChannelKey, ChannelState>,
	pub old_channels: HashMap<ChannelUniqueKey, ChannelState>,
	#[serde(rename = "token2tokenNetwork", serialize_with = "checksummed_address_map")]
	pub token2token_network: HashMap<TokenAddress, TokenNetworkAddress>,
	#[serde(default)]
	pub transport: TransportState,
	pub sent: HashMap<SecretHash, TransferState>,
	pub received: HashMap<SecretHash, TransferState>,
	#[serde(default)]
	pub iou: HashMap<String, HashMap<String, IOU>>,
	#[serde(default)]
	pub pending_txs: Vec<Value>,
}

impl RaidenState {
	/// The state of a client starting from scratch.
	pub fn new(
		address: Address,
		chain_id: ChainID,
		registry: TokenNetworkRegistryAddress,
		block_number: BlockNumber,
	) -> Self {
		Self {
			address,
			version: CURRENT_STATE_VERSION,
			chain_id,
			registry,
			block_number,
			config: Map::new(),
			channels: HashMap::new(),
			old_channels: HashMap::new(),
			token2token_network: HashMap::new(),
			transport: TransportState::default(),
			sent: HashMap::new(),
			received: HashMap::new(),
			iou: HashMap::new(),
			pending_txs: vec![],
		}
	}
}

/// Lifecycle of a channel, as known locally.
#[derive(Copy, Clone, Display, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
	#[display(fmt = "open")]
	Open,
	#[display(fmt = "closing")]
	Closing,
	#[display(fmt = "closed")]
	Closed,
	#[display(fmt = "settleable")]
	Settleable,
	#[display(fmt = "settling")]
	Settling,
	#[display(fmt = "settled")]
	Settled,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelState {
	pub id: ChannelIdentifier,
	pub settle_timeout: SettleTimeout,
	pub open_block: BlockNumber,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub close_block: Option<BlockNumber>,
	#[serde(
		default,
		skip_serializing_if = "Option::is_none",
		serialize_with = "option_address_to_checksum"
	)]
	pub close_participant: Option<Address>,
	pub state: ChannelStatus,
	#[serde(serialize_with = "address_to_checksum")]
	pub token: TokenAddress,
	#[serde(serialize_with = "address_to_checksum")]
	pub token_network: TokenNetworkAddress,
	pub own: ChannelEndState,
	pub partner: ChannelEndState,
}

impl ChannelState {
	/// A freshly opened channel with zeroed ends.
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		chain_id: ChainID,
		id: ChannelIdentifier,
		token: TokenAddress,
		token_network: TokenNetworkAddress,
		our_address: Address,
		partner_address: Address,
		settle_timeout: SettleTimeout,
		open_block: BlockNumber,
	) -> Self {
		let zero_balance_proof = BalanceProofState::zero(chain_id, token_network, id);
		Self {
			id,
			settle_timeout,
			open_block,
			close_block: None,
			close_participant: None,
			state: ChannelStatus::Open,
			token,
			token_network,
			own: ChannelEndState::new(our_address, zero_balance_proof.clone()),
			partner: ChannelEndState::new(partner_address, zero_balance_proof),
		}
	}

	pub fn status(&self) -> ChannelStatus {
		self.state
	}

	/// Block after which the channel can be settled, once closed.
	pub fn settle_block(&self) -> Option<BlockNumber> {
		self.close_block.map(|close_block| close_block.saturating_add(self.settle_timeout))
	}
}

/// One participant's view of a channel.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelEndState {
	#[serde(serialize_with = "address_to_checksum")]
	pub address: Address,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_any")]
	pub deposit: TokenAmount,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_any")]
	pub withdraw: TokenAmount,
	pub locks: Vec<Lock>,
	pub balance_proof: BalanceProofState,
	pub pending_withdraws: Vec<WithdrawRequest>,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_any")]
	pub next_nonce: Nonce,
}

impl ChannelEndState {
	pub fn new(address: Address, balance_proof: BalanceProofState) -> Self {
		Self {
			address,
			deposit: TokenAmount::zero(),
			withdraw: TokenAmount::zero(),
			locks: vec![],
			next_nonce: balance_proof.nonce.saturating_add(Nonce::one()),
			balance_proof,
			pending_withdraws: vec![],
		}
	}

	pub fn get_lock(&self, secrethash: &SecretHash) -> Option<&Lock> {
		self.locks.iter().find(|lock| &lock.secrethash == secrethash)
	}
}

/// Latest balance proof of a channel end.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BalanceProofState {
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_any")]
	pub chain_id: U256,
	#[serde(serialize_with = "address_to_checksum")]
	pub token_network_address: TokenNetworkAddress,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_any")]
	pub channel_id: U256,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_any")]
	pub nonce: Nonce,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_any")]
	pub transferred_amount: TokenAmount,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_any")]
	pub locked_amount: LockedAmount,
	pub locksroot: Locksroot,
	pub additional_hash: AdditionalHash,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub signature: Option<Signature>,
}

impl BalanceProofState {
	/// The proof of an end that has not transferred anything yet.
	pub fn zero(
		chain_id: ChainID,
		token_network_address: TokenNetworkAddress,
		channel_id: ChannelIdentifier,
	) -> Self {
		Self {
			chain_id: U256::from(chain_id),
			token_network_address,
			channel_id: channel_id.into(),
			nonce: Nonce::zero(),
			transferred_amount: TokenAmount::zero(),
			locked_amount: LockedAmount::zero(),
			locksroot: *LOCKSROOT_OF_NO_LOCKS,
			additional_hash: AdditionalHash::zero(),
			signature: None,
		}
	}
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Lock {
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_any")]
	pub amount: TokenAmount,
	#[serde(serialize_with = "u64_to_str")]
	pub expiration: BlockExpiration,
	pub secrethash: SecretHash,
}

impl Lock {
	pub fn encode(&self) -> EncodedLock {
		pack_lock(self.expiration, self.amount, self.secrethash)
	}
}

/// Tags of the peer messages persisted in the state.
#[derive(Copy, Clone, Display, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum MessageType {
	LockedTransfer,
	RefundTransfer,
	WithdrawRequest,
}

/// A signed withdraw request, pending until confirmed on-chain or expired.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WithdrawRequest {
	#[serde(rename = "type")]
	pub message_type: MessageType,
	#[serde(serialize_with = "u64_to_str")]
	pub message_identifier: MessageIdentifier,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_any")]
	pub chain_id: U256,
	#[serde(serialize_with = "address_to_checksum")]
	pub token_network_address: TokenNetworkAddress,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_any")]
	pub channel_identifier: U256,
	#[serde(serialize_with = "address_to_checksum")]
	pub participant: Address,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_any")]
	pub total_withdraw: TokenAmount,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_any")]
	pub nonce: Nonce,
	#[serde(serialize_with = "u64_to_str")]
	pub expiration: BlockExpiration,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub signature: Option<Signature>,
}

/// Route hints attached to a transfer.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteMetadata {
	pub route: Vec<Address>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
	pub routes: Vec<RouteMetadata>,
}

/// The locked transfer message that started a payment.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LockedTransfer {
	#[serde(rename = "type")]
	pub message_type: MessageType,
	#[serde(serialize_with = "u64_to_str")]
	pub message_identifier: MessageIdentifier,
	#[serde(serialize_with = "u64_to_str")]
	pub payment_identifier: PaymentIdentifier,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_any")]
	pub chain_id: U256,
	#[serde(serialize_with = "address_to_checksum")]
	pub token_network_address: TokenNetworkAddress,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_any")]
	pub channel_identifier: U256,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_any")]
	pub nonce: Nonce,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_any")]
	pub transferred_amount: TokenAmount,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_any")]
	pub locked_amount: LockedAmount,
	pub locksroot: Locksroot,
	#[serde(serialize_with = "address_to_checksum")]
	pub token: TokenAddress,
	#[serde(serialize_with = "address_to_checksum")]
	pub recipient: Address,
	#[serde(serialize_with = "address_to_checksum")]
	pub target: Address,
	#[serde(serialize_with = "address_to_checksum")]
	pub initiator: Address,
	pub lock: Lock,
	#[serde(default)]
	pub metadata: Metadata,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub signature: Option<Signature>,
}

/// Any other peer message, kept verbatim.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PeerMessage {
	#[serde(rename = "type")]
	pub message_type: String,
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretState {
	pub value: Secret,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub register_block: Option<BlockNumber>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelClosedState {
	pub tx_hash: TransactionHash,
}

/// A payment leg, sent or received, keyed by its secrethash.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransferState {
	pub transfer: Timed<LockedTransfer>,
	#[serde(
		default,
		serialize_with = "u256_to_str",
		deserialize_with = "u256_from_any"
	)]
	pub fee: FeeAmount,
	#[serde(serialize_with = "address_to_checksum")]
	pub partner: Address,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub secret: Option<Timed<SecretState>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub transfer_processed: Option<Timed<PeerMessage>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refund: Option<Timed<PeerMessage>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub channel_closed: Option<Timed<ChannelClosedState>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub secret_request: Option<Timed<PeerMessage>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub secret_reveal: Option<Timed<PeerMessage>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub unlock: Option<Timed<PeerMessage>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub lock_expired: Option<Timed<PeerMessage>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub unlock_processed: Option<Timed<PeerMessage>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub lock_expired_processed: Option<Timed<PeerMessage>>,
}

/// Matrix session persisted between runs.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MatrixSetup {
	pub user_id: String,
	pub access_token: String,
	pub device_id: String,
	pub display_name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportState {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub server: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub setup: Option<MatrixSetup>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rooms: Option<HashMap<String, Vec<String>>>,
}

/// Pathfinding service debt, one per token network and service.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct IOU {
	#[serde(serialize_with = "address_to_checksum")]
	pub sender: Address,
	#[serde(serialize_with = "address_to_checksum")]
	pub receiver: Address,
	#[serde(serialize_with = "address_to_checksum")]
	pub one_to_n_address: OneToNAddress,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_any")]
	pub amount: TokenAmount,
	#[serde(serialize_with = "u64_to_str")]
	pub expiration_block: BlockTimeout,
	#[serde(serialize_with = "u256_to_str", deserialize_with = "u256_from_any")]
	pub chain_id: U256,
	pub signature: Signature,
}
