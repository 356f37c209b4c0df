/// Snapshot table.
pub(crate) const DB_CREATE_STATE_SNAPSHOT: &str = "
CREATE TABLE IF NOT EXISTS state_snapshot (
	identifier ULID PRIMARY KEY NOT NULL,
	address TEXT NOT NULL,
	version INTEGER NOT NULL,
	block_number INTEGER NOT NULL,
	data JSON,
	timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP NOT NULL
);
";

/// Lookup of snapshots by address.
pub(crate) const DB_CREATE_STATE_SNAPSHOT_INDEX: &str = "
CREATE INDEX IF NOT EXISTS state_snapshot_address ON state_snapshot(address);
";
