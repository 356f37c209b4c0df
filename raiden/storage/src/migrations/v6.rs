//! Version 6: timed tuples become objects with a `ts` member.
//!
//! Every member of a sent or received transfer that is a two element array whose second
//! element is an object is taken to be `[timestamp, value]` and rewritten as
//! `{ ...value, ts: timestamp }`. Nothing else marks these tuples in legacy documents, so the
//! shape alone decides.

use serde_json::{
	Map,
	Value,
};

use super::{
	as_object_mut,
	join,
	MigrationStepError,
};

/// Rewrites a version 5 document into the version 6 shape.
pub fn migrate(state: &mut Value) -> Result<(), MigrationStepError> {
	let root = as_object_mut(state, "")?;
	for container in ["sent", "received"] {
		let transfers = match root.get_mut(container) {
			None | Some(Value::Null) => continue,
			Some(transfers) => as_object_mut(transfers, container)?,
		};
		for (secrethash, transfer) in transfers.iter_mut() {
			let transfer = as_object_mut(transfer, &join(container, secrethash))?;
			for member in transfer.values_mut() {
				if let Some(timed) = untuple(member) {
					*member = Value::Object(timed);
				}
			}
		}
	}
	Ok(())
}

/// The flattened form of `[ts, { ... }]`, or `None` for any other shape.
fn untuple(value: &Value) -> Option<Map<String, Value>> {
	match value.as_array().map(Vec::as_slice) {
		Some([ts, Value::Object(inner)]) => {
			let mut timed = inner.clone();
			timed.insert("ts".to_owned(), ts.clone());
			Some(timed)
		},
		_ => None,
	}
}
