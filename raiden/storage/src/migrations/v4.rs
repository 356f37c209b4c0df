//! Version 4: channel ends track withdraw requests and their next nonce.

use raiden_primitives::types::U256;
use serde_json::{
	json,
	Value,
};

use super::{
	for_each_channel_end,
	join,
	read_uint,
	required,
	MigrationStepError,
};

/// Rewrites a version 3 document into the version 4 shape.
pub fn migrate(state: &mut Value) -> Result<(), MigrationStepError> {
	for_each_channel_end(state, |end, end_path| {
		end.entry("withdrawRequests".to_owned()).or_insert_with(|| json!([]));

		let balance_proof_path = join(end_path, "balanceProof");
		let balance_proof = required(end, "balanceProof", end_path)?;
		let nonce_path = join(&balance_proof_path, "nonce");
		let nonce = match balance_proof.get("nonce") {
			Some(nonce) => read_uint(nonce, &nonce_path)?,
			None => return Err(MigrationStepError::MissingField { path: nonce_path }),
		};
		let next_nonce = nonce.checked_add(U256::one()).ok_or(MigrationStepError::InvalidValue {
			path: nonce_path,
			reason: "nonce has no successor".to_owned(),
		})?;
		end.insert("nextNonce".to_owned(), Value::String(next_nonce.to_string()));
		Ok(())
	})
}
