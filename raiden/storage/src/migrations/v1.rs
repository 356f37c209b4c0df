//! Version 1: secrets move into the sent transfer they unlock.
//!
//! `secrets[hash] = { secret, registerBlock }` becomes
//! `sent[hash].secret = [ts, { value, registerBlock }]`, stamped with the transfer's own
//! timestamp. Secrets without a matching sent transfer have no place in the new layout.

use serde_json::{
	json,
	Map,
	Value,
};

use super::{
	as_object_mut,
	join,
	object_entry,
	required,
	take_object,
	MigrationStepError,
};

/// Rewrites a version 0 document into the version 1 shape.
pub fn migrate(state: &mut Value) -> Result<(), MigrationStepError> {
	let root = as_object_mut(state, "")?;
	let secrets = take_object(root, "secrets", "")?;
	let sent = object_entry(root, "sent", "")?;

	for (secrethash, secret) in secrets {
		let secret_path = join("secrets", &secrethash);
		let secret = secret
			.as_object()
			.ok_or(MigrationStepError::UnexpectedType { path: secret_path.clone(), expected: "an object" })?;

		let transfer_path = join("sent", &secrethash);
		let transfer = match sent.get_mut(&secrethash) {
			Some(transfer) => as_object_mut(transfer, &transfer_path)?,
			None => continue,
		};
		let ts = required(transfer, "transfer", &transfer_path)?
			.as_array()
			.and_then(|tuple| tuple.first())
			.cloned()
			.ok_or_else(|| MigrationStepError::MissingField {
				path: format!("{}[0]", join(&transfer_path, "transfer")),
			})?;

		let mut record = Map::new();
		record.insert("value".to_owned(), required(secret, "secret", &secret_path)?.clone());
		if let Some(register_block) = secret.get("registerBlock").filter(|block| !block.is_null()) {
			record.insert("registerBlock".to_owned(), register_block.clone());
		}
		transfer.insert("secret".to_owned(), json!([ts, record]));
	}

	Ok(())
}
