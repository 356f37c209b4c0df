#![warn(clippy::missing_docs_in_private_items)]

//! The ordered chain of state document migrations.
//!
//! Migration `N` takes a document at version `N - 1` (version `0` takes an untagged legacy
//! document) and rewrites it in place into the version `N` shape. Steps work over an untyped
//! `serde_json::Value` tree; the typed codec only runs once the chain is done. Stamping the
//! version after a step is the caller's job.

use std::collections::BTreeMap;

use raiden_primitives::{
	deserializers::parse_u256,
	hashing::to_checksum_address,
	types::{
		Address,
		U256,
	},
};
use raiden_state_machine::views::parse_address;
use serde_json::{
	Map,
	Value,
};
use thiserror::Error;

/// Version 0 migration.
pub mod v0;
/// Version 1 migration.
pub mod v1;
/// Version 2 migration.
pub mod v2;
/// Version 3 migration.
pub mod v3;
/// Version 4 migration.
pub mod v4;
/// Version 5 migration.
pub mod v5;
/// Version 6 migration.
pub mod v6;

/// A single migration over the document root.
pub type MigrationStep = fn(&mut Value) -> Result<(), MigrationStepError>;

/// A document did not have the shape a migration step expects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MigrationStepError {
	/// A required member is absent or null.
	#[error("Missing field `{path}`")]
	MissingField { path: String },
	/// A member holds the wrong JSON type.
	#[error("Expected {expected} at `{path}`")]
	UnexpectedType { path: String, expected: &'static str },
	/// A member has the right type but an unusable value.
	#[error("Invalid value at `{path}`: {reason}")]
	InvalidValue { path: String, reason: String },
}

/// Registered migrations, keyed by the version they produce.
#[derive(Clone)]
pub struct Migrations {
	/// Steps by produced version.
	steps: BTreeMap<u32, MigrationStep>,
}

impl Migrations {
	/// A registry with no migrations at all.
	pub fn empty() -> Self {
		Self { steps: BTreeMap::new() }
	}

	/// Registers `step` as the migration producing `version`, replacing any previous one.
	pub fn register(&mut self, version: u32, step: MigrationStep) -> &mut Self {
		self.steps.insert(version, step);
		self
	}

	/// Unregisters the migration producing `version`.
	pub fn remove(&mut self, version: u32) -> Option<MigrationStep> {
		self.steps.remove(&version)
	}

	/// The migration producing `version`.
	pub fn get(&self, version: u32) -> Option<MigrationStep> {
		self.steps.get(&version).copied()
	}

	/// Highest registered version.
	pub fn latest_version(&self) -> Option<u32> {
		self.steps.keys().next_back().copied()
	}

	/// First version in `0..=target_version` with no registered migration.
	pub fn first_gap(&self, target_version: u32) -> Option<u32> {
		(0..=target_version).find(|version| !self.steps.contains_key(version))
	}
}

impl Default for Migrations {
	fn default() -> Self {
		let mut migrations = Self::empty();
		migrations
			.register(0, v0::migrate)
			.register(1, v1::migrate)
			.register(2, v2::migrate)
			.register(3, v3::migrate)
			.register(4, v4::migrate)
			.register(5, v5::migrate)
			.register(6, v6::migrate);
		migrations
	}
}

/// Appends a member name to a document path.
pub(crate) fn join(path: &str, name: &str) -> String {
	if path.is_empty() {
		name.to_owned()
	} else {
		format!("{}.{}", path, name)
	}
}

/// `value` as an object, or an `UnexpectedType` error at `path`.
pub(crate) fn as_object_mut<'a>(
	value: &'a mut Value,
	path: &str,
) -> Result<&'a mut Map<String, Value>, MigrationStepError> {
	value
		.as_object_mut()
		.ok_or_else(|| MigrationStepError::UnexpectedType { path: path.to_owned(), expected: "an object" })
}

/// Takes an object member out of `object`, or an empty object if it is absent.
pub(crate) fn take_object(
	object: &mut Map<String, Value>,
	name: &str,
	path: &str,
) -> Result<Map<String, Value>, MigrationStepError> {
	match object.remove(name) {
		None | Some(Value::Null) => Ok(Map::new()),
		Some(Value::Object(map)) => Ok(map),
		Some(_) => Err(MigrationStepError::UnexpectedType {
			path: join(path, name),
			expected: "an object",
		}),
	}
}

/// A mutable object member of `object`, created empty when absent.
pub(crate) fn object_entry<'a>(
	object: &'a mut Map<String, Value>,
	name: &str,
	path: &str,
) -> Result<&'a mut Map<String, Value>, MigrationStepError> {
	let value = object.entry(name.to_owned()).or_insert_with(|| Value::Object(Map::new()));
	if value.is_null() {
		*value = Value::Object(Map::new());
	}
	as_object_mut(value, &join(path, name))
}

/// A member of `object` that must be present and not null.
pub(crate) fn required<'a>(
	object: &'a Map<String, Value>,
	name: &str,
	path: &str,
) -> Result<&'a Value, MigrationStepError> {
	match object.get(name) {
		None | Some(Value::Null) =>
			Err(MigrationStepError::MissingField { path: join(path, name) }),
		Some(value) => Ok(value),
	}
}

/// Reads an unsigned integer stored either as a JSON number or a decimal/hex string.
pub(crate) fn read_uint(value: &Value, path: &str) -> Result<U256, MigrationStepError> {
	let parsed = match value {
		Value::Number(n) => n.as_u64().map(U256::from),
		Value::String(s) => parse_u256(s),
		_ => None,
	};
	parsed.ok_or_else(|| MigrationStepError::InvalidValue {
		path: path.to_owned(),
		reason: format!("{} is not an unsigned integer", value),
	})
}

/// Reads a `0x` prefixed address in any letter case.
pub(crate) fn read_address(value: &Value, path: &str) -> Result<Address, MigrationStepError> {
	value.as_str().and_then(parse_address).ok_or_else(|| MigrationStepError::InvalidValue {
		path: path.to_owned(),
		reason: format!("{} is not an address", value),
	})
}

/// The checksummed string form of `address`.
pub(crate) fn checksummed(address: &Address) -> Value {
	Value::String(to_checksum_address(address))
}

/// Runs `f` over the `own` and `partner` ends of every channel in `channels` and
/// `oldChannels`.
pub(crate) fn for_each_channel_end<F>(state: &mut Value, mut f: F) -> Result<(), MigrationStepError>
where
	F: FnMut(&mut Map<String, Value>, &str) -> Result<(), MigrationStepError>,
{
	let root = as_object_mut(state, "")?;
	for container in ["channels", "oldChannels"] {
		let channels = match root.get_mut(container) {
			None | Some(Value::Null) => continue,
			Some(channels) => as_object_mut(channels, container)?,
		};
		for (key, channel) in channels.iter_mut() {
			let channel_path = join(container, key);
			let channel = as_object_mut(channel, &channel_path)?;
			for end_name in ["own", "partner"] {
				let end_path = join(&channel_path, end_name);
				let end = match channel.get_mut(end_name) {
					Some(end) => as_object_mut(end, &end_path)?,
					None => return Err(MigrationStepError::MissingField { path: end_path }),
				};
				f(end, &end_path)?;
			}
		}
	}
	Ok(())
}
