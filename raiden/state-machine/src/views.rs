#![warn(clippy::missing_docs_in_private_items)]

use std::{
	cmp::max,
	str::FromStr,
};

use raiden_primitives::{
	hashing::to_checksum_address,
	types::{
		Address,
		TokenAmount,
		TokenNetworkAddress,
	},
};

use crate::{
	constants::{
		CHANNEL_KEY_SEPARATOR,
		CHANNEL_UNIQUE_KEY_SEPARATOR,
	},
	types::{
		ChannelEndState,
		ChannelKey,
		ChannelState,
		ChannelStatus,
		ChannelUniqueKey,
		RaidenState,
	},
};

/// Key of the live channel with `partner` in `token_network`.
pub fn channel_key(partner: &Address, token_network: &TokenNetworkAddress) -> ChannelKey {
	format!(
		"{}{}{}",
		to_checksum_address(partner),
		CHANNEL_KEY_SEPARATOR,
		to_checksum_address(token_network)
	)
}

/// Key of a channel once moved to `oldChannels`.
pub fn channel_unique_key(channel: &ChannelState) -> ChannelUniqueKey {
	format!(
		"{}{}{}",
		channel.id,
		CHANNEL_UNIQUE_KEY_SEPARATOR,
		channel_key(&channel.partner.address, &channel.token_network)
	)
}

/// Splits a channel key into partner and token network addresses.
pub fn parse_channel_key(key: &str) -> Option<(Address, TokenNetworkAddress)> {
	let (partner, token_network) = key.split_once(CHANNEL_KEY_SEPARATOR)?;
	Some((parse_address(partner)?, parse_address(token_network)?))
}

/// Parses a `0x` prefixed address in any letter case.
pub fn parse_address(value: &str) -> Option<Address> {
	let hex = value.strip_prefix("0x")?;
	if hex.len() != 40 {
		return None
	}
	Address::from_str(hex).ok()
}

/// Returns the live channel with `partner` in `token_network`.
pub fn get_channel_by_partner<'a>(
	raiden_state: &'a RaidenState,
	token_network: &TokenNetworkAddress,
	partner: &Address,
) -> Option<&'a ChannelState> {
	raiden_state.channels.get(&channel_key(partner, token_network))
}

/// Returns the live channels in the given status.
pub fn get_channels_by_status(
	raiden_state: &RaidenState,
	status: ChannelStatus,
) -> Vec<&ChannelState> {
	raiden_state.channels.values().filter(|channel| channel.state == status).collect()
}

/// Sum of the amounts of the locks pending on an end.
pub fn get_amount_locked(end_state: &ChannelEndState) -> TokenAmount {
	end_state
		.locks
		.iter()
		.fold(TokenAmount::zero(), |total, lock| total.saturating_add(lock.amount))
}

/// Highest withdraw total requested but not yet confirmed on-chain.
pub fn get_pending_withdraw_total(end_state: &ChannelEndState) -> TokenAmount {
	end_state
		.pending_withdraws
		.iter()
		.map(|request| request.total_withdraw)
		.max()
		.unwrap_or_default()
}

/// Returns the total balance of the sender's end of a channel.
pub fn channel_balance(sender: &ChannelEndState, receiver: &ChannelEndState) -> TokenAmount {
	let withdrawn = max(sender.withdraw, get_pending_withdraw_total(sender));
	sender
		.deposit
		.saturating_add(receiver.balance_proof.transferred_amount)
		.saturating_sub(withdrawn)
		.saturating_sub(sender.balance_proof.transferred_amount)
}

/// What the sender can still lock in new transfers.
pub fn channel_distributable(sender: &ChannelEndState, receiver: &ChannelEndState) -> TokenAmount {
	channel_balance(sender, receiver).saturating_sub(sender.balance_proof.locked_amount)
}

/// The highest total the sender's end may withdraw.
pub fn get_max_withdraw_amount(sender: &ChannelEndState, receiver: &ChannelEndState) -> TokenAmount {
	sender
		.deposit
		.saturating_add(receiver.balance_proof.transferred_amount)
		.saturating_sub(sender.balance_proof.transferred_amount)
		.saturating_sub(sender.balance_proof.locked_amount)
}

/// Settled channels once held with `partner` in `token_network`.
pub fn get_old_channels_with<'a>(
	raiden_state: &'a RaidenState,
	token_network: &TokenNetworkAddress,
	partner: &Address,
) -> Vec<(&'a ChannelUniqueKey, &'a ChannelState)> {
	raiden_state
		.old_channels
		.iter()
		.filter(|(_, channel)| {
			&channel.token_network == token_network && &channel.partner.address == partner
		})
		.collect()
}
