use raiden_macros::IntoEvent;
use raiden_primitives::types::{
	Address,
	BlockExpiration,
	BlockNumber,
	ChannelIdentifier,
	TokenAmount,
	TokenNetworkAddress,
};
use serde::{
	Deserialize,
	Serialize,
};

/// Events emitted by the channel state machine.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Event {
	ChannelSettleable(ChannelSettleable),
	WithdrawRequestExpired(WithdrawRequestExpired),
}

/// A closed channel reached the end of its settlement window.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, IntoEvent)]
pub struct ChannelSettleable {
	pub token_network_address: TokenNetworkAddress,
	pub partner: Address,
	pub channel_identifier: ChannelIdentifier,
	pub block_number: BlockNumber,
}

/// A pending withdraw request expired before being confirmed.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, IntoEvent)]
pub struct WithdrawRequestExpired {
	pub token_network_address: TokenNetworkAddress,
	pub partner: Address,
	pub participant: Address,
	pub total_withdraw: TokenAmount,
	pub expiration: BlockExpiration,
}
