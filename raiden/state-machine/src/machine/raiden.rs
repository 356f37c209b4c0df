use tracing::debug;

use crate::{
	errors::StateTransitionError,
	machine::channel,
	types::{
		Block,
		ChannelState,
		ChannelStatus,
		ContractReceiveChannelOpened,
		Event,
		RaidenState,
		StateChange,
	},
	views::{
		channel_key,
		channel_unique_key,
	},
};

type TransitionResult = std::result::Result<RaidenTransition, StateTransitionError>;

pub struct RaidenTransition {
	pub new_state: RaidenState,
	pub events: Vec<Event>,
}

fn handle_block(mut raiden_state: RaidenState, state_change: Block) -> TransitionResult {
	let block_number = state_change.block_number;
	if block_number > raiden_state.block_number {
		raiden_state.block_number = block_number;
	}

	let mut events = vec![];
	let mut keys: Vec<String> = raiden_state.channels.keys().cloned().collect();
	keys.sort();
	for key in keys {
		let channel_state = match raiden_state.channels.remove(&key) {
			Some(channel_state) => channel_state,
			None => continue,
		};
		let transition = channel::state_transition(
			channel_state,
			state_change.clone().into(),
			raiden_state.block_number,
		)?;
		raiden_state.channels.insert(key, transition.new_state);
		events.extend(transition.events);
	}

	Ok(RaidenTransition { new_state: raiden_state, events })
}

fn handle_channel_opened(
	mut raiden_state: RaidenState,
	state_change: ContractReceiveChannelOpened,
) -> TransitionResult {
	let key = channel_key(&state_change.partner, &state_change.token_network_address);
	if raiden_state.channels.contains_key(&key) {
		return Err(StateTransitionError {
			msg: format!("A channel {} is already open with this partner", key),
		})
	}

	if let Some(token_network) = raiden_state.token2token_network.get(&state_change.token) {
		if token_network != &state_change.token_network_address {
			return Err(StateTransitionError {
				msg: format!(
					"Token {:#x} is registered with token network {:#x}",
					state_change.token, token_network
				),
			})
		}
	}

	let channel_state = ChannelState::new(
		raiden_state.chain_id,
		state_change.channel_identifier,
		state_change.token,
		state_change.token_network_address,
		raiden_state.address,
		state_change.partner,
		state_change.settle_timeout,
		state_change.block_number,
	);
	if raiden_state.old_channels.contains_key(&channel_unique_key(&channel_state)) {
		return Err(StateTransitionError {
			msg: format!("Channel {} was already settled", channel_state.id),
		})
	}

	raiden_state
		.token2token_network
		.insert(state_change.token, state_change.token_network_address);
	raiden_state.channels.insert(key, channel_state);

	Ok(RaidenTransition { new_state: raiden_state, events: vec![] })
}

fn handle_channel_state_change(
	mut raiden_state: RaidenState,
	state_change: StateChange,
) -> TransitionResult {
	let (partner, token_network) = match state_change.channel_identity() {
		Some(identity) => identity,
		None =>
			return Err(StateTransitionError {
				msg: format!("{} is not bound to a channel", state_change.type_name()),
			}),
	};
	let key = channel_key(&partner, &token_network);
	let channel_state = match raiden_state.channels.get(&key) {
		Some(channel_state) => channel_state.clone(),
		None => return Err(StateTransitionError { msg: format!("Unknown channel {}", key) }),
	};

	let transition =
		channel::state_transition(channel_state, state_change, raiden_state.block_number)?;
	let new_channel_state = transition.new_state;

	if new_channel_state.status() == ChannelStatus::Settled {
		let unique_key = channel_unique_key(&new_channel_state);
		if raiden_state.old_channels.contains_key(&unique_key) {
			return Err(StateTransitionError {
				msg: format!("Channel {} is already in the settled history", unique_key),
			})
		}
		debug!(channel = key.as_str(), "Moving settled channel to history");
		raiden_state.channels.remove(&key);
		raiden_state.old_channels.insert(unique_key, new_channel_state);
	} else {
		raiden_state.channels.insert(key, new_channel_state);
	}

	Ok(RaidenTransition { new_state: raiden_state, events: transition.events })
}

/// Applies a state change to the client state.
///
/// On error the state passed in is consumed; callers that need to keep it
/// should pass a clone.
pub fn state_transition(raiden_state: RaidenState, state_change: StateChange) -> TransitionResult {
	debug!(state_change = state_change.type_name(), "Applying state change");

	match state_change {
		StateChange::Block(inner) => handle_block(raiden_state, inner),
		StateChange::ContractReceiveChannelOpened(inner) =>
			handle_channel_opened(raiden_state, inner),
		state_change => handle_channel_state_change(raiden_state, state_change),
	}
}
