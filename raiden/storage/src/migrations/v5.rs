//! Version 5: `withdrawRequests` is renamed to `pendingWithdraws`.

use serde_json::{
	json,
	Value,
};

use super::{
	for_each_channel_end,
	MigrationStepError,
};

/// Rewrites a version 4 document into the version 5 shape.
pub fn migrate(state: &mut Value) -> Result<(), MigrationStepError> {
	for_each_channel_end(state, |end, _| {
		let requests = end.remove("withdrawRequests").unwrap_or_else(|| json!([]));
		end.insert("pendingWithdraws".to_owned(), requests);
		Ok(())
	})
}
