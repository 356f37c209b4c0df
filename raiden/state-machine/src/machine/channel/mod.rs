use raiden_primitives::types::{
	Address,
	BlockNumber,
	Secret,
	SecretHash,
	U256,
};

use self::{
	utils::compute_locksroot,
	validators::{
		is_channel_open,
		is_valid_lock_expired,
		is_valid_locked_transfer,
		is_valid_unlock,
		is_valid_withdraw_request,
	},
};
use crate::{
	errors::StateTransitionError,
	types::{
		ActionChannelClose,
		BalanceProofState,
		Block,
		ChannelEndState,
		ChannelSettleable,
		ChannelState,
		ChannelStatus,
		ContractReceiveChannelClosed,
		ContractReceiveChannelDeposit,
		ContractReceiveChannelSettled,
		ContractReceiveChannelWithdraw,
		Event,
		Lock,
		StateChange,
		WithdrawRequest,
		WithdrawRequestExpired,
	},
	views::get_amount_locked,
};

pub mod utils;
pub mod validators;

type TransitionResult = std::result::Result<ChannelTransition, StateTransitionError>;

pub struct ChannelTransition {
	pub new_state: ChannelState,
	pub events: Vec<Event>,
}

/// Which end of the channel sends the message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Sender {
	Us,
	Partner,
}

/// Splits the channel into the sender's and the receiver's end.
fn ends_mut(
	channel_state: &mut ChannelState,
	sender: Sender,
) -> (&mut ChannelEndState, &mut ChannelEndState) {
	match sender {
		Sender::Us => (&mut channel_state.own, &mut channel_state.partner),
		Sender::Partner => (&mut channel_state.partner, &mut channel_state.own),
	}
}

/// Stores a new balance proof on an end, keeping `next_nonce` in step.
fn update_balance_proof(
	end_state: &mut ChannelEndState,
	locks: Vec<Lock>,
	balance_proof: BalanceProofState,
) {
	end_state.next_nonce = balance_proof.nonce.saturating_add(U256::one());
	end_state.balance_proof = balance_proof;
	end_state.locks = locks;
}

fn end_for_participant<'a>(
	channel_state: &'a mut ChannelState,
	participant: &Address,
) -> Option<&'a mut ChannelEndState> {
	if participant == &channel_state.own.address {
		Some(&mut channel_state.own)
	} else if participant == &channel_state.partner.address {
		Some(&mut channel_state.partner)
	} else {
		None
	}
}

fn handle_locked_transfer(
	mut channel_state: ChannelState,
	sender: Sender,
	lock: Lock,
	balance_proof: BalanceProofState,
	block_number: BlockNumber,
) -> TransitionResult {
	let (sender_end, receiver_end) = match sender {
		Sender::Us => (&channel_state.own, &channel_state.partner),
		Sender::Partner => (&channel_state.partner, &channel_state.own),
	};
	let locks = is_valid_locked_transfer(
		&channel_state,
		sender_end,
		receiver_end,
		&lock,
		&balance_proof,
		block_number,
	)?;

	let (sender_end, _) = ends_mut(&mut channel_state, sender);
	update_balance_proof(sender_end, locks, balance_proof);

	Ok(ChannelTransition { new_state: channel_state, events: vec![] })
}

fn handle_unlock(
	mut channel_state: ChannelState,
	sender: Sender,
	secret: Secret,
	balance_proof: BalanceProofState,
	block_number: BlockNumber,
) -> TransitionResult {
	let sender_end = match sender {
		Sender::Us => &channel_state.own,
		Sender::Partner => &channel_state.partner,
	};
	let (_, locks) =
		is_valid_unlock(&channel_state, sender_end, &secret, &balance_proof, block_number)?;

	let (sender_end, _) = ends_mut(&mut channel_state, sender);
	update_balance_proof(sender_end, locks, balance_proof);

	Ok(ChannelTransition { new_state: channel_state, events: vec![] })
}

fn handle_lock_expired(
	mut channel_state: ChannelState,
	sender: Sender,
	secrethash: SecretHash,
	balance_proof: BalanceProofState,
	block_number: BlockNumber,
) -> TransitionResult {
	let sender_end = match sender {
		Sender::Us => &channel_state.own,
		Sender::Partner => &channel_state.partner,
	};
	let (_, locks) = is_valid_lock_expired(
		&channel_state,
		sender_end,
		&secrethash,
		&balance_proof,
		block_number,
	)?;

	let (sender_end, _) = ends_mut(&mut channel_state, sender);
	update_balance_proof(sender_end, locks, balance_proof);

	Ok(ChannelTransition { new_state: channel_state, events: vec![] })
}

fn handle_withdraw_request(
	mut channel_state: ChannelState,
	sender: Sender,
	request: WithdrawRequest,
	block_number: BlockNumber,
) -> TransitionResult {
	let (sender_end, receiver_end) = match sender {
		Sender::Us => (&channel_state.own, &channel_state.partner),
		Sender::Partner => (&channel_state.partner, &channel_state.own),
	};
	is_valid_withdraw_request(&channel_state, sender_end, receiver_end, &request, block_number)?;

	let (sender_end, _) = ends_mut(&mut channel_state, sender);
	sender_end.pending_withdraws.push(request);

	Ok(ChannelTransition { new_state: channel_state, events: vec![] })
}

fn handle_channel_deposit(
	mut channel_state: ChannelState,
	state_change: ContractReceiveChannelDeposit,
) -> TransitionResult {
	if let Some(end_state) = end_for_participant(&mut channel_state, &state_change.participant) {
		if state_change.total_deposit > end_state.deposit {
			end_state.deposit = state_change.total_deposit;
		}
	}

	Ok(ChannelTransition { new_state: channel_state, events: vec![] })
}

fn handle_channel_withdraw(
	mut channel_state: ChannelState,
	state_change: ContractReceiveChannelWithdraw,
) -> TransitionResult {
	let end_state = match end_for_participant(&mut channel_state, &state_change.participant) {
		Some(end_state) => end_state,
		None => return Ok(ChannelTransition { new_state: channel_state, events: vec![] }),
	};

	end_state
		.pending_withdraws
		.retain(|request| request.total_withdraw > state_change.total_withdraw);
	if state_change.total_withdraw > end_state.withdraw {
		end_state.withdraw = state_change.total_withdraw;
	}

	Ok(ChannelTransition { new_state: channel_state, events: vec![] })
}

fn handle_action_close(
	mut channel_state: ChannelState,
	_state_change: ActionChannelClose,
) -> TransitionResult {
	is_channel_open(&channel_state)?;
	channel_state.state = ChannelStatus::Closing;

	Ok(ChannelTransition { new_state: channel_state, events: vec![] })
}

fn handle_channel_closed(
	mut channel_state: ChannelState,
	state_change: ContractReceiveChannelClosed,
) -> TransitionResult {
	let just_closed = matches!(channel_state.status(), ChannelStatus::Open | ChannelStatus::Closing);
	if just_closed {
		channel_state.state = ChannelStatus::Closed;
		channel_state.close_block = Some(state_change.block_number);
		channel_state.close_participant = Some(state_change.participant);
	}

	Ok(ChannelTransition { new_state: channel_state, events: vec![] })
}

fn handle_channel_settled(
	mut channel_state: ChannelState,
	_state_change: ContractReceiveChannelSettled,
) -> TransitionResult {
	match channel_state.status() {
		ChannelStatus::Closed | ChannelStatus::Settleable | ChannelStatus::Settling => {
			channel_state.state = ChannelStatus::Settled;
		},
		status =>
			return Err(StateTransitionError {
				msg: format!("Channel cannot be settled while {}", status),
			}),
	}

	Ok(ChannelTransition { new_state: channel_state, events: vec![] })
}

fn expire_withdraws(
	channel_state: &ChannelState,
	end_state: &mut ChannelEndState,
	block_number: BlockNumber,
) -> Vec<Event> {
	let (expired, pending): (Vec<_>, Vec<_>) = end_state
		.pending_withdraws
		.drain(..)
		.partition(|request| request.expiration < block_number);
	end_state.pending_withdraws = pending;

	expired
		.into_iter()
		.map(|request| {
			WithdrawRequestExpired {
				token_network_address: channel_state.token_network,
				partner: channel_state.partner.address,
				participant: request.participant,
				total_withdraw: request.total_withdraw,
				expiration: request.expiration,
			}
			.into()
		})
		.collect()
}

fn handle_block(mut channel_state: ChannelState, state_change: Block) -> TransitionResult {
	let mut events = vec![];
	let block_number = state_change.block_number;

	if channel_state.status() == ChannelStatus::Open {
		let snapshot = channel_state.clone();
		events.extend(expire_withdraws(&snapshot, &mut channel_state.own, block_number));
		events.extend(expire_withdraws(&snapshot, &mut channel_state.partner, block_number));
	}

	if channel_state.status() == ChannelStatus::Closed {
		let settle_block = match channel_state.settle_block() {
			Some(settle_block) => settle_block,
			None =>
				return Err(StateTransitionError {
					msg: "Channel is Closed but closeBlock is not set".to_owned(),
				}),
		};
		if block_number > settle_block {
			channel_state.state = ChannelStatus::Settleable;
			events.push(
				ChannelSettleable {
					token_network_address: channel_state.token_network,
					partner: channel_state.partner.address,
					channel_identifier: channel_state.id,
					block_number,
				}
				.into(),
			);
		}
	}

	Ok(ChannelTransition { new_state: channel_state, events })
}

fn check_end_state(end_state: &ChannelEndState, name: &str) -> Result<(), StateTransitionError> {
	let balance_proof = &end_state.balance_proof;
	if Some(end_state.next_nonce) != balance_proof.nonce.checked_add(U256::one()) {
		return Err(StateTransitionError {
			msg: format!(
				"{} end next nonce {} does not follow balance proof nonce {}",
				name, end_state.next_nonce, balance_proof.nonce
			),
		})
	}

	if compute_locksroot(&end_state.locks) != balance_proof.locksroot {
		return Err(StateTransitionError {
			msg: format!("{} end locksroot does not commit to its pending locks", name),
		})
	}

	if get_amount_locked(end_state) != balance_proof.locked_amount {
		return Err(StateTransitionError {
			msg: format!("{} end locked amount does not match its pending locks", name),
		})
	}

	Ok(())
}

/// Checks the channel invariants on the result of a transition.
fn sanity_check(transition: ChannelTransition) -> TransitionResult {
	let channel_state = &transition.new_state;

	check_end_state(&channel_state.own, "Our")?;
	check_end_state(&channel_state.partner, "Partner")?;

	if channel_state.status() == ChannelStatus::Open && channel_state.close_participant.is_some()
	{
		return Err(StateTransitionError {
			msg: "Open channel must not have a close participant".to_owned(),
		})
	}

	Ok(transition)
}

/// Applies a state change to a single channel.
pub fn state_transition(
	channel_state: ChannelState,
	state_change: StateChange,
	block_number: BlockNumber,
) -> TransitionResult {
	let transition = match state_change {
		StateChange::Block(inner) => handle_block(channel_state, inner),
		StateChange::ActionChannelClose(inner) => handle_action_close(channel_state, inner),
		StateChange::ActionChannelWithdraw(inner) =>
			handle_withdraw_request(channel_state, Sender::Us, inner.request, block_number),
		StateChange::ActionTransferLock(inner) => handle_locked_transfer(
			channel_state,
			Sender::Us,
			inner.lock,
			inner.balance_proof,
			block_number,
		),
		StateChange::ActionTransferUnlock(inner) => handle_unlock(
			channel_state,
			Sender::Us,
			inner.secret,
			inner.balance_proof,
			block_number,
		),
		StateChange::ActionLockExpired(inner) => handle_lock_expired(
			channel_state,
			Sender::Us,
			inner.secrethash,
			inner.balance_proof,
			block_number,
		),
		StateChange::ContractReceiveChannelDeposit(inner) =>
			handle_channel_deposit(channel_state, inner),
		StateChange::ContractReceiveChannelWithdraw(inner) =>
			handle_channel_withdraw(channel_state, inner),
		StateChange::ContractReceiveChannelClosed(inner) =>
			handle_channel_closed(channel_state, inner),
		StateChange::ContractReceiveChannelSettled(inner) =>
			handle_channel_settled(channel_state, inner),
		StateChange::ReceiveLockedTransfer(inner) => handle_locked_transfer(
			channel_state,
			Sender::Partner,
			inner.lock,
			inner.balance_proof,
			block_number,
		),
		StateChange::ReceiveUnlock(inner) => handle_unlock(
			channel_state,
			Sender::Partner,
			inner.secret,
			inner.balance_proof,
			block_number,
		),
		StateChange::ReceiveLockExpired(inner) => handle_lock_expired(
			channel_state,
			Sender::Partner,
			inner.secrethash,
			inner.balance_proof,
			block_number,
		),
		StateChange::ReceiveWithdrawRequest(inner) =>
			handle_withdraw_request(channel_state, Sender::Partner, inner.request, block_number),
		StateChange::ContractReceiveChannelOpened(_) => Err(StateTransitionError {
			msg: String::from("Channel opened events are handled by the token network"),
		}),
	}?;

	sanity_check(transition)
}
