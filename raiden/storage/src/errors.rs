use derive_more::Display;
use raiden_primitives::types::BlockNumber;
use ulid::DecodeError;

use crate::decode::StateLoadError;

/// Errors of the snapshot store.
#[derive(Display, Debug)]
pub enum StorageError {
	/// The connection mutex is poisoned.
	#[display(fmt = "Storage lock poisoned")]
	CannotLock,
	/// JSON encoding or decoding of a snapshot failed.
	#[display(fmt = "Cannot serialize for storage {}", _0)]
	SerializationError(serde_json::Error),
	/// Sqlite failure.
	#[display(fmt = "SQL Error: {}", _0)]
	Sql(rusqlite::Error),
	/// A stored identifier is not a ULID.
	#[display(fmt = "Cannot convert value to Ulid: {}", _0)]
	ID(DecodeError),
	/// Migration or validation of a loaded snapshot failed.
	#[display(fmt = "Cannot load state: {}", _0)]
	Load(StateLoadError),
	/// The state is behind the latest stored snapshot.
	#[display(fmt = "Refusing to store state at block {} over a snapshot at block {}", given, stored)]
	StaleState { stored: BlockNumber, given: BlockNumber },
	/// The block number does not fit the sqlite integer column.
	#[display(fmt = "Block number {} cannot be stored", _0)]
	BlockNumberOutOfRange(BlockNumber),
	/// Any other failure.
	#[display(fmt = "Error: {}", _0)]
	Other(&'static str),
}

impl std::error::Error for StorageError {}

impl From<StateLoadError> for StorageError {
	fn from(e: StateLoadError) -> Self {
		StorageError::Load(e)
	}
}
