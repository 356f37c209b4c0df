//! Version 0: the legacy untagged document.

use serde_json::{
	Map,
	Value,
};

use super::{
	as_object_mut,
	MigrationStepError,
};

/// Containers every later step expects, even on a client that never used them.
const CONTAINERS: [&str; 3] = ["channels", "tokens", "sent"];

/// Rewrites a legacy document into the version 0 shape.
pub fn migrate(state: &mut Value) -> Result<(), MigrationStepError> {
	let root = as_object_mut(state, "")?;
	for name in CONTAINERS {
		let entry = root.entry(name.to_owned()).or_insert(Value::Null);
		if entry.is_null() {
			*entry = Value::Object(Map::new());
		}
	}
	Ok(())
}
