use raiden_primitives::hashing::hash_secret;
use web3::types::{
	Address,
	Bytes,
	U256,
};

use crate::{
	machine::{
		channel::utils::compute_locksroot,
		raiden,
	},
	types::{
		BalanceProofState,
		ChannelEndState,
		ChannelState,
		ContractReceiveChannelDeposit,
		ContractReceiveChannelOpened,
		Lock,
		MessageType,
		RaidenState,
		Secret,
		StateChange,
		TokenAmount,
		WithdrawRequest,
		U64,
	},
	views,
};

pub const CHAIN_ID: u64 = 1337;
pub const SETTLE_TIMEOUT: u64 = 500;

/// Participants and contracts of a test channel.
#[derive(Clone, Copy)]
pub struct ChannelFixture {
	pub token: Address,
	pub token_network: Address,
	pub partner: Address,
	pub channel_identifier: U64,
}

impl ChannelFixture {
	pub fn random() -> Self {
		Self {
			token: Address::random(),
			token_network: Address::random(),
			partner: Address::random(),
			channel_identifier: U64::from(17u64),
		}
	}
}

pub fn empty_raiden_state() -> RaidenState {
	RaidenState::new(Address::random(), CHAIN_ID, Address::random(), U64::from(100u64))
}

pub fn apply(raiden_state: &RaidenState, state_change: impl Into<StateChange>) -> RaidenState {
	raiden::state_transition(raiden_state.clone(), state_change.into())
		.expect("State change should apply")
		.new_state
}

/// A state with one open channel funded on both sides.
pub fn raiden_state_with_channel(
	fixture: &ChannelFixture,
	our_deposit: u64,
	partner_deposit: u64,
) -> RaidenState {
	let raiden_state = empty_raiden_state();
	let raiden_state = apply(
		&raiden_state,
		ContractReceiveChannelOpened {
			token: fixture.token,
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			channel_identifier: fixture.channel_identifier,
			settle_timeout: U64::from(SETTLE_TIMEOUT),
			block_number: U64::from(90u64),
		},
	);
	let our_address = raiden_state.address;
	let raiden_state = apply(
		&raiden_state,
		ContractReceiveChannelDeposit {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			participant: our_address,
			total_deposit: TokenAmount::from(our_deposit),
		},
	);
	apply(
		&raiden_state,
		ContractReceiveChannelDeposit {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			participant: fixture.partner,
			total_deposit: TokenAmount::from(partner_deposit),
		},
	)
}

pub fn channel<'a>(raiden_state: &'a RaidenState, fixture: &ChannelFixture) -> &'a ChannelState {
	views::get_channel_by_partner(raiden_state, &fixture.token_network, &fixture.partner)
		.expect("Channel should exist")
}

pub fn secret_and_lock(seed: u8, amount: u64, expiration: u64) -> (Secret, Lock) {
	let secret = Bytes(vec![seed; 32]);
	let lock = Lock {
		amount: TokenAmount::from(amount),
		expiration: U64::from(expiration),
		secrethash: hash_secret(&secret.0),
	};
	(secret, lock)
}

/// The next balance proof of `end_state` once its locks become `locks`.
pub fn next_balance_proof(
	end_state: &ChannelEndState,
	locks: &[Lock],
	transferred_amount: TokenAmount,
) -> BalanceProofState {
	let locked_amount =
		locks.iter().fold(TokenAmount::zero(), |total, lock| total + lock.amount);
	BalanceProofState {
		nonce: end_state.next_nonce,
		transferred_amount,
		locked_amount,
		locksroot: compute_locksroot(locks),
		signature: Some(Bytes(vec![1; 65])),
		..end_state.balance_proof.clone()
	}
}

pub fn withdraw_request(
	channel_state: &ChannelState,
	end_state: &ChannelEndState,
	total_withdraw: u64,
	expiration: u64,
) -> WithdrawRequest {
	WithdrawRequest {
		message_type: MessageType::WithdrawRequest,
		message_identifier: U64::from(1u64),
		chain_id: U256::from(CHAIN_ID),
		token_network_address: channel_state.token_network,
		channel_identifier: U256::from(channel_state.id),
		participant: end_state.address,
		total_withdraw: TokenAmount::from(total_withdraw),
		nonce: end_state.next_nonce,
		expiration: U64::from(expiration),
		signature: Some(Bytes(vec![2; 65])),
	}
}
