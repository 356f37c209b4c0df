#![warn(clippy::missing_docs_in_private_items)]

use raiden_macros::IntoStateChange;
use raiden_primitives::types::{
	Address,
	BlockNumber,
	ChannelIdentifier,
	Secret,
	SecretHash,
	SettleTimeout,
	TokenAddress,
	TokenAmount,
	TokenNetworkAddress,
};
use serde::{
	Deserialize,
	Serialize,
};

use crate::types::state::{
	BalanceProofState,
	Lock,
	WithdrawRequest,
};

/// An enum containing all possible state change variants.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "type")]
pub enum StateChange {
	Block(Block),
	ActionChannelClose(ActionChannelClose),
	ActionChannelWithdraw(ActionChannelWithdraw),
	ActionTransferLock(ActionTransferLock),
	ActionTransferUnlock(ActionTransferUnlock),
	ActionLockExpired(ActionLockExpired),
	ContractReceiveChannelOpened(ContractReceiveChannelOpened),
	ContractReceiveChannelDeposit(ContractReceiveChannelDeposit),
	ContractReceiveChannelWithdraw(ContractReceiveChannelWithdraw),
	ContractReceiveChannelClosed(ContractReceiveChannelClosed),
	ContractReceiveChannelSettled(ContractReceiveChannelSettled),
	ReceiveLockedTransfer(ReceiveLockedTransfer),
	ReceiveUnlock(ReceiveUnlock),
	ReceiveLockExpired(ReceiveLockExpired),
	ReceiveWithdrawRequest(ReceiveWithdrawRequest),
}

impl StateChange {
	/// Returns a string of the inner state change's type name.
	pub fn type_name(&self) -> &'static str {
		match self {
			StateChange::Block(_) => Block::TYPE_NAME,
			StateChange::ActionChannelClose(_) => ActionChannelClose::TYPE_NAME,
			StateChange::ActionChannelWithdraw(_) => ActionChannelWithdraw::TYPE_NAME,
			StateChange::ActionTransferLock(_) => ActionTransferLock::TYPE_NAME,
			StateChange::ActionTransferUnlock(_) => ActionTransferUnlock::TYPE_NAME,
			StateChange::ActionLockExpired(_) => ActionLockExpired::TYPE_NAME,
			StateChange::ContractReceiveChannelOpened(_) => ContractReceiveChannelOpened::TYPE_NAME,
			StateChange::ContractReceiveChannelDeposit(_) =>
				ContractReceiveChannelDeposit::TYPE_NAME,
			StateChange::ContractReceiveChannelWithdraw(_) =>
				ContractReceiveChannelWithdraw::TYPE_NAME,
			StateChange::ContractReceiveChannelClosed(_) => ContractReceiveChannelClosed::TYPE_NAME,
			StateChange::ContractReceiveChannelSettled(_) =>
				ContractReceiveChannelSettled::TYPE_NAME,
			StateChange::ReceiveLockedTransfer(_) => ReceiveLockedTransfer::TYPE_NAME,
			StateChange::ReceiveUnlock(_) => ReceiveUnlock::TYPE_NAME,
			StateChange::ReceiveLockExpired(_) => ReceiveLockExpired::TYPE_NAME,
			StateChange::ReceiveWithdrawRequest(_) => ReceiveWithdrawRequest::TYPE_NAME,
		}
	}

	/// The `(partner, token network)` pair of the channel the change targets.
	///
	/// `None` for changes that are not bound to a single channel.
	pub fn channel_identity(&self) -> Option<(Address, TokenNetworkAddress)> {
		let identity = match self {
			StateChange::Block(_) => return None,
			StateChange::ActionChannelClose(inner) => (inner.partner, inner.token_network_address),
			StateChange::ActionChannelWithdraw(inner) =>
				(inner.partner, inner.token_network_address),
			StateChange::ActionTransferLock(inner) => (inner.partner, inner.token_network_address),
			StateChange::ActionTransferUnlock(inner) =>
				(inner.partner, inner.token_network_address),
			StateChange::ActionLockExpired(inner) => (inner.partner, inner.token_network_address),
			StateChange::ContractReceiveChannelOpened(inner) =>
				(inner.partner, inner.token_network_address),
			StateChange::ContractReceiveChannelDeposit(inner) =>
				(inner.partner, inner.token_network_address),
			StateChange::ContractReceiveChannelWithdraw(inner) =>
				(inner.partner, inner.token_network_address),
			StateChange::ContractReceiveChannelClosed(inner) =>
				(inner.partner, inner.token_network_address),
			StateChange::ContractReceiveChannelSettled(inner) =>
				(inner.partner, inner.token_network_address),
			StateChange::ReceiveLockedTransfer(inner) =>
				(inner.partner, inner.token_network_address),
			StateChange::ReceiveUnlock(inner) => (inner.partner, inner.token_network_address),
			StateChange::ReceiveLockExpired(inner) => (inner.partner, inner.token_network_address),
			StateChange::ReceiveWithdrawRequest(inner) =>
				(inner.partner, inner.token_network_address),
		};
		Some(identity)
	}
}

/// Transition used when a new block is mined.
#[derive(Serialize, Deserialize, Clone, Debug, IntoStateChange)]
pub struct Block {
	pub block_number: BlockNumber,
}

/// Request to close a channel.
#[derive(Serialize, Deserialize, Clone, Debug, IntoStateChange)]
pub struct ActionChannelClose {
	pub token_network_address: TokenNetworkAddress,
	pub partner: Address,
}

/// Our own signed withdraw request, about to be sent to the partner.
#[derive(Serialize, Deserialize, Clone, Debug, IntoStateChange)]
pub struct ActionChannelWithdraw {
	pub token_network_address: TokenNetworkAddress,
	pub partner: Address,
	pub request: WithdrawRequest,
}

/// A lock we add to our end, with the balance proof we signed for it.
#[derive(Serialize, Deserialize, Clone, Debug, IntoStateChange)]
pub struct ActionTransferLock {
	pub token_network_address: TokenNetworkAddress,
	pub partner: Address,
	pub lock: Lock,
	pub balance_proof: BalanceProofState,
}

/// We reveal the secret of one of our locks and unlock it off-chain.
#[derive(Serialize, Deserialize, Clone, Debug, IntoStateChange)]
pub struct ActionTransferUnlock {
	pub token_network_address: TokenNetworkAddress,
	pub partner: Address,
	pub secret: Secret,
	pub balance_proof: BalanceProofState,
}

/// We remove one of our expired locks.
#[derive(Serialize, Deserialize, Clone, Debug, IntoStateChange)]
pub struct ActionLockExpired {
	pub token_network_address: TokenNetworkAddress,
	pub partner: Address,
	pub secrethash: SecretHash,
	pub balance_proof: BalanceProofState,
}

/// A channel with us as participant was opened on-chain.
#[derive(Serialize, Deserialize, Clone, Debug, IntoStateChange)]
pub struct ContractReceiveChannelOpened {
	pub token: TokenAddress,
	pub token_network_address: TokenNetworkAddress,
	pub partner: Address,
	pub channel_identifier: ChannelIdentifier,
	pub settle_timeout: SettleTimeout,
	pub block_number: BlockNumber,
}

#[derive(Serialize, Deserialize, Clone, Debug, IntoStateChange)]
pub struct ContractReceiveChannelDeposit {
	pub token_network_address: TokenNetworkAddress,
	pub partner: Address,
	pub participant: Address,
	pub total_deposit: TokenAmount,
}

#[derive(Serialize, Deserialize, Clone, Debug, IntoStateChange)]
pub struct ContractReceiveChannelWithdraw {
	pub token_network_address: TokenNetworkAddress,
	pub partner: Address,
	pub participant: Address,
	pub total_withdraw: TokenAmount,
}

/// The close transaction of a channel was mined.
#[derive(Serialize, Deserialize, Clone, Debug, IntoStateChange)]
pub struct ContractReceiveChannelClosed {
	pub token_network_address: TokenNetworkAddress,
	pub partner: Address,
	pub participant: Address,
	pub block_number: BlockNumber,
}

#[derive(Serialize, Deserialize, Clone, Debug, IntoStateChange)]
pub struct ContractReceiveChannelSettled {
	pub token_network_address: TokenNetworkAddress,
	pub partner: Address,
	pub block_number: BlockNumber,
}

/// A locked transfer from the partner.
#[derive(Serialize, Deserialize, Clone, Debug, IntoStateChange)]
pub struct ReceiveLockedTransfer {
	pub token_network_address: TokenNetworkAddress,
	pub partner: Address,
	pub lock: Lock,
	pub balance_proof: BalanceProofState,
}

/// The partner unlocked one of their locks to us.
#[derive(Serialize, Deserialize, Clone, Debug, IntoStateChange)]
pub struct ReceiveUnlock {
	pub token_network_address: TokenNetworkAddress,
	pub partner: Address,
	pub secret: Secret,
	pub balance_proof: BalanceProofState,
}

/// The partner removed one of their expired locks.
#[derive(Serialize, Deserialize, Clone, Debug, IntoStateChange)]
pub struct ReceiveLockExpired {
	pub token_network_address: TokenNetworkAddress,
	pub partner: Address,
	pub secrethash: SecretHash,
	pub balance_proof: BalanceProofState,
}

#[derive(Serialize, Deserialize, Clone, Debug, IntoStateChange)]
pub struct ReceiveWithdrawRequest {
	pub token_network_address: TokenNetworkAddress,
	pub partner: Address,
	pub request: WithdrawRequest,
}
