use raiden_state_machine::{
	codec::{
		self,
		DecodeError,
	},
	constants::CURRENT_STATE_VERSION,
	types::RaidenState,
};
use serde_json::Value;
use thiserror::Error;

use crate::{
	logger::MigrationLogger,
	migrations::Migrations,
	migrator::{
		migrate_state,
		MigrationError,
	},
};

/// Failure to turn a persisted document into a current `RaidenState`.
#[derive(Error, Debug)]
pub enum StateLoadError {
	/// The text is not JSON.
	#[error("State is not valid JSON: {0}")]
	Json(#[from] serde_json::Error),
	/// The migration chain failed.
	#[error(transparent)]
	Migration(#[from] MigrationError),
	/// The migrated document is not a valid state.
	#[error(transparent)]
	Decode(#[from] DecodeError),
}

/// Migrates a document of any known version to the current one and validates it.
///
/// Returns the migrated document alongside the typed state so callers can persist exactly
/// what was validated.
pub fn migrate_and_decode(
	state: Value,
	migrations: &Migrations,
	logger: &dyn MigrationLogger,
) -> Result<(Value, RaidenState), StateLoadError> {
	let migrated = migrate_state(state, CURRENT_STATE_VERSION, migrations, logger)?;
	match codec::decode_raiden_state(&migrated) {
		Ok(raiden_state) => Ok((migrated, raiden_state)),
		Err(e) => {
			logger.validation_failed(CURRENT_STATE_VERSION, &e);
			Err(e.into())
		},
	}
}

/// Parses, migrates and validates a persisted state document.
pub fn decode_raiden_state(
	data: &str,
	logger: &dyn MigrationLogger,
) -> Result<RaidenState, StateLoadError> {
	let value: Value = serde_json::from_str(data)?;
	decode_raiden_state_value(value, logger)
}

/// Migrates and validates an already parsed document.
pub fn decode_raiden_state_value(
	value: Value,
	logger: &dyn MigrationLogger,
) -> Result<RaidenState, StateLoadError> {
	let (_, raiden_state) = migrate_and_decode(value, &Migrations::default(), logger)?;
	Ok(raiden_state)
}
