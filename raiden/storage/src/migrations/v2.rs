//! Version 2: fields later code relies on are derived from what is already stored.
//!
//! A channel with a `closeBlock` gets `closeParticipant` set to our own address. The legacy
//! state never recorded who closed, so this assumes we did. Sent transfers get their
//! `partner` from the locked transfer's recipient, and an empty `received` container is added.

use serde_json::{
	json,
	Value,
};

use super::{
	as_object_mut,
	join,
	object_entry,
	required,
	MigrationStepError,
};

/// Rewrites a version 1 document into the version 2 shape.
pub fn migrate(state: &mut Value) -> Result<(), MigrationStepError> {
	let root = as_object_mut(state, "")?;
	let address = required(root, "address", "")?.clone();

	let channels = object_entry(root, "channels", "")?;
	for (token_network, partners) in channels.iter_mut() {
		let partners_path = join("channels", token_network);
		for (partner, channel) in as_object_mut(partners, &partners_path)?.iter_mut() {
			let channel = as_object_mut(channel, &join(&partners_path, partner))?;
			let closed = channel.get("closeBlock").map_or(false, |block| !block.is_null());
			if closed && !channel.contains_key("closeParticipant") {
				channel.insert("closeParticipant".to_owned(), address.clone());
			}
		}
	}

	let sent = object_entry(root, "sent", "")?;
	for (secrethash, transfer) in sent.iter_mut() {
		let transfer_path = join("sent", secrethash);
		let transfer = as_object_mut(transfer, &transfer_path)?;
		if !transfer.contains_key("partner") {
			let recipient = required(transfer, "transfer", &transfer_path)?
				.get(1)
				.and_then(|message| message.get("recipient"))
				.cloned()
				.ok_or_else(|| MigrationStepError::MissingField {
					path: format!("{}[1].recipient", join(&transfer_path, "transfer")),
				})?;
			transfer.insert("partner".to_owned(), recipient);
		}

		if let Some(Value::Array(tuple)) = transfer.get_mut("channelClosed") {
			if let [_, tx_hash @ Value::String(_)] = tuple.as_mut_slice() {
				*tx_hash = json!({ "txHash": tx_hash.clone() });
			}
		}
	}

	object_entry(root, "received", "")?;
	Ok(())
}
