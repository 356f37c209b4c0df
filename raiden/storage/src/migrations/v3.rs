//! Version 3: channels are flattened and keyed by `partner@tokenNetwork`.
//!
//! Besides the re-keying, each channel learns its `token` and `tokenNetwork`, each end its
//! `address`, and ends that never transacted get a zero balance proof, no locks and no
//! withdraw. Balance proofs drop `sender` and rename `messageHash` to `additionalHash`.
//! Channels still `opening` have no identifier or funds yet and are dropped. The `tokens` map,
//! the `path.iou` debts and the `transport.matrix` session move to their current places.

use std::collections::HashMap;

use raiden_primitives::{
	constants::LOCKSROOT_OF_NO_LOCKS,
	hashing::to_checksum_address,
	types::{
		Address,
		H256,
		U256,
	},
};
use raiden_state_machine::views::channel_key;
use serde_json::{
	json,
	Map,
	Value,
};

use super::{
	as_object_mut,
	checksummed,
	join,
	read_address,
	read_uint,
	required,
	take_object,
	MigrationStepError,
};

/// Legacy state of a channel whose open transaction was not mined yet.
const OPENING: &str = "opening";

/// Rewrites a version 2 document into the version 3 shape.
pub fn migrate(state: &mut Value) -> Result<(), MigrationStepError> {
	let root = as_object_mut(state, "")?;
	let our_address = read_address(required(root, "address", "")?, "address")?;
	let chain_id = read_uint(required(root, "chainId", "")?, "chainId")?;

	let tokens = take_object(root, "tokens", "")?;
	let mut token_by_network: HashMap<Address, Address> = HashMap::new();
	for (token, token_network) in tokens.iter() {
		let token_path = join("tokens", token);
		let token = read_address(&Value::String(token.clone()), &token_path)?;
		token_by_network.insert(read_address(token_network, &token_path)?, token);
	}

	let nested = take_object(root, "channels", "")?;
	let mut channels = Map::new();
	for (token_network, partners) in nested {
		let partners_path = join("channels", &token_network);
		let token_network = read_address(&Value::String(token_network), &partners_path)?;
		let token = token_by_network.get(&token_network).ok_or_else(|| {
			MigrationStepError::InvalidValue {
				path: partners_path.clone(),
				reason: "token network is not registered in `tokens`".to_owned(),
			}
		})?;

		let partners = match partners {
			Value::Object(partners) => partners,
			_ =>
				return Err(MigrationStepError::UnexpectedType {
					path: partners_path,
					expected: "an object",
				}),
		};
		for (partner, mut channel) in partners {
			let channel_path = join(&partners_path, &partner);
			let partner = read_address(&Value::String(partner), &channel_path)?;
			let channel_object = as_object_mut(&mut channel, &channel_path)?;
			if channel_object.get("state").and_then(Value::as_str) == Some(OPENING) {
				continue
			}

			let channel_id = read_uint(
				required(channel_object, "id", &channel_path)?,
				&join(&channel_path, "id"),
			)?;
			channel_object.insert("token".to_owned(), checksummed(token));
			channel_object.insert("tokenNetwork".to_owned(), checksummed(&token_network));

			let zero_proof = zero_balance_proof(chain_id, &token_network, channel_id);
			for (end_name, end_address) in [("own", our_address), ("partner", partner)] {
				let end_path = join(&channel_path, end_name);
				let end = channel_object
					.entry(end_name.to_owned())
					.or_insert_with(|| Value::Object(Map::new()));
				let end = as_object_mut(end, &end_path)?;
				end.insert("address".to_owned(), checksummed(&end_address));
				migrate_end(end, &end_path, &zero_proof)?;
			}

			channels.insert(channel_key(&partner, &token_network), channel);
		}
	}
	root.insert("channels".to_owned(), Value::Object(channels));
	root.entry("oldChannels".to_owned()).or_insert_with(|| Value::Object(Map::new()));

	let token2token_network: Map<String, Value> = token_by_network
		.iter()
		.map(|(token_network, token)| (to_checksum_address(token), checksummed(token_network)))
		.collect();
	root.insert("token2tokenNetwork".to_owned(), Value::Object(token2token_network));

	let mut path = take_object(root, "path", "")?;
	let iou = take_object(&mut path, "iou", "path")?;
	root.insert("iou".to_owned(), Value::Object(iou));

	if let Some(transport) = root.get_mut("transport") {
		let transport = as_object_mut(transport, "transport")?;
		let matrix = take_object(transport, "matrix", "transport")?;
		transport.extend(matrix);
	}

	Ok(())
}

/// Balance proof of an end that never sent a transfer.
fn zero_balance_proof(chain_id: U256, token_network: &Address, channel_id: U256) -> Value {
	json!({
		"chainId": chain_id.to_string(),
		"tokenNetworkAddress": checksummed(token_network),
		"channelId": channel_id.to_string(),
		"nonce": "0",
		"transferredAmount": "0",
		"lockedAmount": "0",
		"locksroot": format!("{:#x}", *LOCKSROOT_OF_NO_LOCKS),
		"additionalHash": format!("{:#x}", H256::zero()),
	})
}

/// Backfills an end and renames its balance proof fields.
fn migrate_end(
	end: &mut Map<String, Value>,
	end_path: &str,
	zero_balance_proof: &Value,
) -> Result<(), MigrationStepError> {
	match end.get_mut("balanceProof") {
		None | Some(Value::Null) => {
			end.insert("balanceProof".to_owned(), zero_balance_proof.clone());
		},
		Some(balance_proof) => {
			let balance_proof = as_object_mut(balance_proof, &join(end_path, "balanceProof"))?;
			if let Some(message_hash) = balance_proof.remove("messageHash") {
				balance_proof.insert("additionalHash".to_owned(), message_hash);
			}
			balance_proof.remove("sender");
		},
	}

	end.entry("locks".to_owned()).or_insert_with(|| json!([]));
	end.entry("withdraw".to_owned()).or_insert_with(|| json!("0"));
	end.entry("deposit".to_owned()).or_insert_with(|| json!("0"));
	Ok(())
}
