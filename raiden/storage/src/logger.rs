use raiden_state_machine::codec::DecodeError;
use serde_json::Value;
use tracing::{
	debug,
	error,
};

use crate::migrations::MigrationStepError;

/// Receives the progress and failures of a state load.
///
/// Passed explicitly to the migrator so callers decide where diagnostics go.
pub trait MigrationLogger {
	/// A step succeeded and the document now sits at `to_version`.
	fn migration_applied(&self, from_version: i64, to_version: u32);

	/// `state` is the document as it was before the failing step ran.
	fn migration_failed(
		&self,
		from_version: i64,
		to_version: u32,
		state: &Value,
		cause: &MigrationStepError,
	);

	/// The fully migrated document failed validation.
	fn validation_failed(&self, version: u32, error: &DecodeError);
}

/// Forwards everything to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl MigrationLogger for TracingLogger {
	fn migration_applied(&self, from_version: i64, to_version: u32) {
		debug!(from_version, to_version, "Applied state migration");
	}

	fn migration_failed(
		&self,
		from_version: i64,
		to_version: u32,
		state: &Value,
		cause: &MigrationStepError,
	) {
		error!(
			from_version,
			to_version,
			state = %state,
			cause = %cause,
			"State migration failed"
		);
	}

	fn validation_failed(&self, version: u32, error: &DecodeError) {
		error!(version, error = %error, "Migrated state failed validation");
	}
}
