use std::{
	convert::{
		TryFrom,
		TryInto,
	},
	sync::Mutex,
};

use chrono::NaiveDateTime;
use raiden_primitives::{
	hashing::to_checksum_address,
	types::{
		Address,
		BlockNumber,
	},
};
use raiden_state_machine::{
	codec::encode_raiden_state,
	types::RaidenState,
};
use rusqlite::{
	params,
	Connection,
	Row,
};
use serde_json::Value;
use tracing::{
	debug,
	info,
};

use crate::{
	decode::migrate_and_decode,
	errors::StorageError,
	logger::MigrationLogger,
	migrations::Migrations,
	migrator::recorded_version,
	sqlite,
	types::{
		Result,
		SnapshotRecord,
		StorageID,
	},
};

/// Columns read back into a `SnapshotRecord`, in order.
const SNAPSHOT_COLUMNS: &str = "identifier, version, block_number, data, timestamp";

/// Sqlite store of state snapshots, one history per address.
pub struct StateStorage {
	/// Connection guarded for use across threads.
	conn: Mutex<Connection>,
}

impl StateStorage {
	/// Create an instance of `StateStorage`.
	pub fn new(conn: Connection) -> Self {
		Self { conn: Mutex::new(conn) }
	}

	/// Creates the snapshot table and its index if missing.
	pub fn setup_database(&self) -> Result<()> {
		let setup_db_sql = format!(
			"
			PRAGMA foreign_keys=off;
			BEGIN TRANSACTION;
			{}{}
			COMMIT;
			PRAGMA foreign_keys=on;
			",
			sqlite::DB_CREATE_STATE_SNAPSHOT,
			sqlite::DB_CREATE_STATE_SNAPSHOT_INDEX,
		);
		self.conn
			.lock()
			.map_err(|_| StorageError::CannotLock)?
			.execute_batch(&setup_db_sql)
			.map_err(StorageError::Sql)?;

		Ok(())
	}

	/// Persists a new snapshot of `state`.
	///
	/// A state behind the latest stored snapshot of the same address is refused.
	pub fn store_state(&self, state: &RaidenState) -> Result<StorageID> {
		let data = encode_raiden_state(state).map_err(StorageError::SerializationError)?;
		let conn = self.conn.lock().map_err(|_| StorageError::CannotLock)?;

		if let Some(latest) = latest_snapshot(&conn, &state.address)? {
			if latest.block_number > state.block_number {
				return Err(StorageError::StaleState {
					stored: latest.block_number,
					given: state.block_number,
				})
			}
		}

		insert_snapshot(
			&conn,
			&state.address,
			i64::from(state.version),
			state.block_number,
			&data,
		)
	}

	/// Stores a document as is, whatever its version. Used to bring in legacy states.
	pub fn import_snapshot(&self, address: &Address, data: &Value) -> Result<StorageID> {
		let version = recorded_version(data).map_err(|e| StorageError::Load(e.into()))?;
		let block_number = data
			.get("blockNumber")
			.and_then(Value::as_u64)
			.map(BlockNumber::from)
			.unwrap_or_default();
		let conn = self.conn.lock().map_err(|_| StorageError::CannotLock)?;
		insert_snapshot(&conn, address, version, block_number, data)
	}

	/// Most recently stored snapshot of `address`.
	pub fn latest_snapshot(&self, address: &Address) -> Result<Option<SnapshotRecord>> {
		let conn = self.conn.lock().map_err(|_| StorageError::CannotLock)?;
		latest_snapshot(&conn, address)
	}

	/// All snapshots of `address`, oldest first.
	pub fn snapshots(&self, address: &Address) -> Result<Vec<SnapshotRecord>> {
		let conn = self.conn.lock().map_err(|_| StorageError::CannotLock)?;
		let mut stmt = conn
			.prepare(&format!(
				"SELECT {} FROM state_snapshot WHERE address=?1 ORDER BY rowid ASC",
				SNAPSHOT_COLUMNS
			))
			.map_err(StorageError::Sql)?;
		let mut rows = stmt.query(params![to_checksum_address(address)]).map_err(StorageError::Sql)?;

		let mut snapshots = vec![];
		while let Some(row) = rows.next().map_err(StorageError::Sql)? {
			snapshots.push(snapshot_from_row(row)?);
		}
		Ok(snapshots)
	}

	/// Loads the latest state of `address`, migrated to the current version and validated.
	///
	/// When the stored snapshot was older, the migrated document is stored as a new snapshot.
	/// If migration or validation fails nothing is written.
	pub fn load_state(
		&self,
		address: &Address,
		migrations: &Migrations,
		logger: &dyn MigrationLogger,
		commit: bool,
	) -> Result<Option<RaidenState>> {
		let conn = self.conn.lock().map_err(|_| StorageError::CannotLock)?;
		let snapshot = match latest_snapshot(&conn, address)? {
			Some(snapshot) => snapshot,
			None => return Ok(None),
		};

		let stored_version = snapshot.version;
		let (migrated, raiden_state) = migrate_and_decode(snapshot.data, migrations, logger)?;
		if stored_version != i64::from(raiden_state.version) && commit {
			let identifier = insert_snapshot(
				&conn,
				address,
				i64::from(raiden_state.version),
				raiden_state.block_number,
				&migrated,
			)?;
			info!(
				snapshot = identifier.to_string().as_str(),
				from_version = stored_version,
				to_version = raiden_state.version,
				"Stored migrated state"
			);
		}

		Ok(Some(raiden_state))
	}
}

/// Appends a snapshot row and returns its identifier.
fn insert_snapshot(
	conn: &Connection,
	address: &Address,
	version: i64,
	block_number: BlockNumber,
	data: &Value,
) -> Result<StorageID> {
	let stored_block_number = i64::try_from(block_number.as_u64())
		.map_err(|_| StorageError::BlockNumberOutOfRange(block_number))?;
	let serialized = serde_json::to_string(data).map_err(StorageError::SerializationError)?;
	let identifier = StorageID::new();
	conn.execute(
		"INSERT INTO state_snapshot(identifier, address, version, block_number, data)
		VALUES(?1, ?2, ?3, ?4, ?5)",
		params![
			identifier.to_string(),
			to_checksum_address(address),
			version,
			stored_block_number,
			serialized,
		],
	)
	.map_err(StorageError::Sql)?;
	debug!(snapshot = identifier.to_string().as_str(), version, "Stored state snapshot");

	Ok(identifier)
}

/// Latest snapshot of `address` on an already locked connection.
fn latest_snapshot(conn: &Connection, address: &Address) -> Result<Option<SnapshotRecord>> {
	let mut stmt = conn
		.prepare(&format!(
			"SELECT {} FROM state_snapshot WHERE address=?1 ORDER BY rowid DESC LIMIT 1",
			SNAPSHOT_COLUMNS
		))
		.map_err(StorageError::Sql)?;
	let mut rows = stmt.query(params![to_checksum_address(address)]).map_err(StorageError::Sql)?;
	match rows.next().map_err(StorageError::Sql)? {
		Some(row) => Ok(Some(snapshot_from_row(row)?)),
		None => Ok(None),
	}
}

/// Reads a row selected with `SNAPSHOT_COLUMNS`.
fn snapshot_from_row(row: &Row) -> Result<SnapshotRecord> {
	let identifier: String = row.get(0).map_err(StorageError::Sql)?;
	let stored_block_number: i64 = row.get(2).map_err(StorageError::Sql)?;
	let block_number = u64::try_from(stored_block_number)
		.map_err(|_| StorageError::Other("Negative block number in snapshot"))?;
	let data: String = row.get(3).map_err(StorageError::Sql)?;
	let timestamp: NaiveDateTime = row.get(4).map_err(StorageError::Sql)?;
	Ok(SnapshotRecord {
		identifier: identifier.try_into()?,
		version: row.get(1).map_err(StorageError::Sql)?,
		block_number: BlockNumber::from(block_number),
		data: serde_json::from_str(&data).map_err(StorageError::SerializationError)?,
		timestamp,
	})
}
