use std::convert::TryFrom;

use chrono::NaiveDateTime;
use raiden_primitives::types::BlockNumber;
use serde_json::Value;
use ulid::Ulid;

use crate::errors::StorageError;

/// Result of storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Identifier of a stored snapshot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StorageID {
	/// Time ordered identifier.
	pub(crate) inner: Ulid,
}

impl StorageID {
	/// A fresh identifier.
	pub fn new() -> Self {
		Self { inner: Ulid::new() }
	}
}

impl Default for StorageID {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Display for StorageID {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.inner)
	}
}

impl From<Ulid> for StorageID {
	fn from(id: Ulid) -> Self {
		Self { inner: id }
	}
}

impl From<StorageID> for String {
	fn from(id: StorageID) -> Self {
		id.inner.to_string()
	}
}

impl TryFrom<String> for StorageID {
	type Error = StorageError;

	fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
		Ok(Self { inner: Ulid::from_string(&value).map_err(StorageError::ID)? })
	}
}

/// A persisted state document, as stored.
///
/// `version` is the version recorded in the document when it was written, `-1` for legacy
/// documents without one.
#[derive(Clone, Debug)]
pub struct SnapshotRecord {
	pub identifier: StorageID,
	pub version: i64,
	pub block_number: BlockNumber,
	/// The document itself.
	pub data: Value,
	/// When the row was written.
	pub timestamp: NaiveDateTime,
}
