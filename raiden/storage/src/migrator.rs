#![warn(clippy::missing_docs_in_private_items)]

use serde_json::{
	Map,
	Value,
};
use thiserror::Error;

use crate::{
	logger::MigrationLogger,
	migrations::{
		MigrationStepError,
		Migrations,
	},
};

/// Version of a document that never went through a migration.
pub const UNVERSIONED: i64 = -1;

/// A state could not be brought to the target version.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MigrationError {
	/// The chain has a gap below the target.
	#[error("No migration registered for version {version}")]
	MissingMigration { version: u32 },
	/// The state was written by a newer client.
	#[error("State version {version} is newer than the target version {target_version}")]
	StateTooNew { version: i64, target_version: u32 },
	/// The `version` member is not an integer.
	#[error("State version is not an integer: {version}")]
	InvalidVersion { version: String },
	/// A step rejected the document.
	#[error("Migration from version {from_version} to {to_version} failed: {cause}")]
	Step { from_version: i64, to_version: u32, cause: MigrationStepError },
}

/// The version recorded in a document, `UNVERSIONED` when it has none.
pub fn recorded_version(state: &Value) -> Result<i64, MigrationError> {
	match state.get("version") {
		None | Some(Value::Null) => Ok(UNVERSIONED),
		Some(version) => version
			.as_i64()
			.filter(|version| *version >= UNVERSIONED)
			.ok_or_else(|| MigrationError::InvalidVersion { version: version.to_string() }),
	}
}

/// Records `version` on the document root.
fn stamp_version(state: &mut Value, version: u32) -> Result<(), MigrationStepError> {
	let root: &mut Map<String, Value> = state.as_object_mut().ok_or_else(|| {
		MigrationStepError::UnexpectedType { path: String::new(), expected: "an object" }
	})?;
	root.insert("version".to_owned(), Value::from(version));
	Ok(())
}

/// Brings `state` up to `target_version`, one version at a time.
///
/// Every version up to the target must have a registered migration; this is checked before
/// the state is looked at. Migration `V` only runs on a document at version `V - 1`, so a
/// document already at the target comes back unchanged. Each step works on a copy which only
/// replaces the state once the step succeeded.
pub fn migrate_state(
	state: Value,
	target_version: u32,
	migrations: &Migrations,
	logger: &dyn MigrationLogger,
) -> Result<Value, MigrationError> {
	if let Some(version) = migrations.first_gap(target_version) {
		return Err(MigrationError::MissingMigration { version })
	}

	let mut state = state;
	let mut current_version = recorded_version(&state)?;
	if current_version > i64::from(target_version) {
		return Err(MigrationError::StateTooNew { version: current_version, target_version })
	}

	for version in 0..=target_version {
		if current_version != i64::from(version) - 1 {
			continue
		}
		let step =
			migrations.get(version).ok_or(MigrationError::MissingMigration { version })?;

		let mut migrated = state.clone();
		let result = step(&mut migrated).and_then(|_| stamp_version(&mut migrated, version));
		if let Err(cause) = result {
			logger.migration_failed(current_version, version, &state, &cause);
			return Err(MigrationError::Step {
				from_version: current_version,
				to_version: version,
				cause,
			})
		}

		logger.migration_applied(current_version, version);
		state = migrated;
		current_version = i64::from(version);
	}

	Ok(state)
}
