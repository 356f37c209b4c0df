use std::cmp::max;

use raiden_primitives::{
	hashing::hash_secret,
	types::{
		BlockNumber,
		Secret,
		SecretHash,
		U256,
	},
};

use super::utils::{
	compute_locks_with,
	compute_locks_without,
	compute_locksroot,
};
use crate::{
	types::{
		BalanceProofState,
		ChannelEndState,
		ChannelState,
		ChannelStatus,
		Lock,
		WithdrawRequest,
	},
	views::{
		channel_distributable,
		get_max_withdraw_amount,
		get_pending_withdraw_total,
	},
};

pub(crate) fn is_channel_open(channel_state: &ChannelState) -> Result<(), String> {
	if channel_state.status() != ChannelStatus::Open {
		return Err(format!("Channel is not open, current state is {}", channel_state.status()))
	}
	Ok(())
}

/// Checks that a balance proof belongs to the channel and carries the sender's next nonce.
pub(crate) fn is_valid_balance_proof_for(
	channel_state: &ChannelState,
	sender: &ChannelEndState,
	balance_proof: &BalanceProofState,
) -> Result<(), String> {
	if balance_proof.channel_id != U256::from(channel_state.id) {
		return Err(format!(
			"Balance proof is for channel {}, expected {}",
			balance_proof.channel_id, channel_state.id
		))
	}

	if balance_proof.token_network_address != channel_state.token_network {
		return Err("Balance proof token network does not match the channel".to_owned())
	}

	if balance_proof.chain_id != sender.balance_proof.chain_id {
		return Err(format!(
			"Balance proof chain id {} does not match {}",
			balance_proof.chain_id, sender.balance_proof.chain_id
		))
	}

	if balance_proof.nonce != sender.next_nonce {
		return Err(format!(
			"Invalid nonce. Expected {}, got {}",
			sender.next_nonce, balance_proof.nonce
		))
	}

	if balance_proof.nonce.checked_add(U256::one()).is_none() {
		return Err(format!("Nonce {} has no successor", balance_proof.nonce))
	}

	Ok(())
}

fn is_valid_locksroot(locks: &[Lock], balance_proof: &BalanceProofState) -> Result<(), String> {
	let locksroot = compute_locksroot(locks);
	if balance_proof.locksroot != locksroot {
		return Err(format!(
			"Balance proof locksroot {:#x} does not match the pending locks {:#x}",
			balance_proof.locksroot, locksroot
		))
	}
	Ok(())
}

/// Validates a new lock and its balance proof, returning the sender's new lock set.
pub(crate) fn is_valid_locked_transfer(
	channel_state: &ChannelState,
	sender: &ChannelEndState,
	receiver: &ChannelEndState,
	lock: &Lock,
	balance_proof: &BalanceProofState,
	block_number: BlockNumber,
) -> Result<Vec<Lock>, String> {
	is_channel_open(channel_state)?;
	is_valid_balance_proof_for(channel_state, sender, balance_proof)?;

	if receiver.get_lock(&lock.secrethash).is_some() {
		return Err(format!("Lock {:#x} already exists in the channel", lock.secrethash))
	}

	let locks = compute_locks_with(sender, lock)
		.ok_or_else(|| format!("Lock {:#x} already exists in the channel", lock.secrethash))?;
	is_valid_locksroot(&locks, balance_proof)?;

	if lock.expiration <= block_number {
		return Err(format!(
			"Lock expiration {} is not after the current block {}",
			lock.expiration, block_number
		))
	}

	let expected_locked_amount = sender
		.balance_proof
		.locked_amount
		.checked_add(lock.amount)
		.ok_or_else(|| "Locked amount overflow".to_owned())?;
	if balance_proof.locked_amount != expected_locked_amount {
		return Err(format!(
			"Invalid locked amount. Expected {}, got {}",
			expected_locked_amount, balance_proof.locked_amount
		))
	}

	if balance_proof.transferred_amount != sender.balance_proof.transferred_amount {
		return Err("Transferred amount must not change when adding a lock".to_owned())
	}

	let distributable = channel_distributable(sender, receiver);
	if lock.amount > distributable {
		return Err(format!(
			"Lock amount {} is larger than the distributable amount {}",
			lock.amount, distributable
		))
	}

	Ok(locks)
}

/// Validates an off-chain unlock, returning the unlocked lock and the remaining ones.
pub(crate) fn is_valid_unlock(
	channel_state: &ChannelState,
	sender: &ChannelEndState,
	secret: &Secret,
	balance_proof: &BalanceProofState,
	block_number: BlockNumber,
) -> Result<(Lock, Vec<Lock>), String> {
	is_channel_open(channel_state)?;
	is_valid_balance_proof_for(channel_state, sender, balance_proof)?;

	let secrethash = hash_secret(&secret.0);
	let (lock, locks) = compute_locks_without(sender, &secrethash)
		.ok_or_else(|| format!("No lock found for secrethash {:#x}", secrethash))?;

	if lock.expiration <= block_number {
		return Err(format!("Lock {:#x} expired at block {}", secrethash, lock.expiration))
	}

	is_valid_locksroot(&locks, balance_proof)?;

	let expected_transferred_amount = sender
		.balance_proof
		.transferred_amount
		.checked_add(lock.amount)
		.ok_or_else(|| "Transferred amount overflow".to_owned())?;
	if balance_proof.transferred_amount != expected_transferred_amount {
		return Err(format!(
			"Invalid transferred amount. Expected {}, got {}",
			expected_transferred_amount, balance_proof.transferred_amount
		))
	}

	let expected_locked_amount = sender.balance_proof.locked_amount.saturating_sub(lock.amount);
	if balance_proof.locked_amount != expected_locked_amount {
		return Err(format!(
			"Invalid locked amount. Expected {}, got {}",
			expected_locked_amount, balance_proof.locked_amount
		))
	}

	Ok((lock, locks))
}

/// Validates the removal of an expired lock, returning it and the remaining ones.
pub(crate) fn is_valid_lock_expired(
	channel_state: &ChannelState,
	sender: &ChannelEndState,
	secrethash: &SecretHash,
	balance_proof: &BalanceProofState,
	block_number: BlockNumber,
) -> Result<(Lock, Vec<Lock>), String> {
	is_channel_open(channel_state)?;
	is_valid_balance_proof_for(channel_state, sender, balance_proof)?;

	let (lock, locks) = compute_locks_without(sender, secrethash)
		.ok_or_else(|| format!("No lock found for secrethash {:#x}", secrethash))?;

	if lock.expiration >= block_number {
		return Err(format!(
			"Lock {:#x} expires at block {} which is not below the current block {}",
			secrethash, lock.expiration, block_number
		))
	}

	is_valid_locksroot(&locks, balance_proof)?;

	if balance_proof.transferred_amount != sender.balance_proof.transferred_amount {
		return Err("Transferred amount must not change when expiring a lock".to_owned())
	}

	let expected_locked_amount = sender.balance_proof.locked_amount.saturating_sub(lock.amount);
	if balance_proof.locked_amount != expected_locked_amount {
		return Err(format!(
			"Invalid locked amount. Expected {}, got {}",
			expected_locked_amount, balance_proof.locked_amount
		))
	}

	Ok((lock, locks))
}

pub(crate) fn is_valid_withdraw_request(
	channel_state: &ChannelState,
	sender: &ChannelEndState,
	receiver: &ChannelEndState,
	request: &WithdrawRequest,
	block_number: BlockNumber,
) -> Result<(), String> {
	is_channel_open(channel_state)?;

	if request.participant != sender.address {
		return Err("Withdraw request participant does not match the channel end".to_owned())
	}

	if request.channel_identifier != U256::from(channel_state.id) ||
		request.token_network_address != channel_state.token_network
	{
		return Err("Withdraw request is for another channel".to_owned())
	}

	if request.nonce < sender.next_nonce {
		return Err(format!(
			"Withdraw request nonce {} is below the next nonce {}",
			request.nonce, sender.next_nonce
		))
	}

	if request.expiration <= block_number {
		return Err(format!("Withdraw request already expired at block {}", request.expiration))
	}

	let current_total = max(sender.withdraw, get_pending_withdraw_total(sender));
	if request.total_withdraw <= current_total {
		return Err(format!(
			"Total withdraw {} must be larger than the current total {}",
			request.total_withdraw, current_total
		))
	}

	let max_withdraw = get_max_withdraw_amount(sender, receiver);
	if request.total_withdraw > max_withdraw {
		return Err(format!(
			"Total withdraw {} is larger than the withdrawable amount {}",
			request.total_withdraw, max_withdraw
		))
	}

	Ok(())
}
