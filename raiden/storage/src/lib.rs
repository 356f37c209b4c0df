#![warn(clippy::missing_docs_in_private_items)]

/// Parsing, migration and validation of a persisted state in one go.
pub mod decode;
/// Storage errors.
pub mod errors;
/// Diagnostics of a state load.
pub mod logger;
/// The versioned migration chain.
pub mod migrations;
/// Walks the migration chain up to a target version.
pub mod migrator;
/// SQL schema.
mod sqlite;
/// Sqlite snapshot store.
pub mod state;
#[cfg(test)]
mod tests;
/// Storage types.
pub mod types;

pub use decode::{
	decode_raiden_state,
	StateLoadError,
};
pub use logger::{
	MigrationLogger,
	TracingLogger,
};
pub use migrations::Migrations;
pub use migrator::{
	migrate_state,
	MigrationError,
};
pub use state::StateStorage;
