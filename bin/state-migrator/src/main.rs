use std::{
	fs,
	path::Path,
	process,
};

use colored::Colorize;
use raiden_primitives::types::Address;
use raiden_state_machine::{
	codec::encode_raiden_state,
	constants::CURRENT_STATE_VERSION,
};
use raiden_storage::{
	decode::migrate_and_decode,
	migrator::recorded_version,
	migrate_state,
	Migrations,
	StateStorage,
	TracingLogger,
};
use rusqlite::Connection;
use serde_json::Value;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{
	MigratorConfig,
	Opt,
	StateSource,
};

mod cli;

fn main() {
	let cli = Opt::from_args();

	let config = match MigratorConfig::from_opt(cli) {
		Ok(config) => config,
		Err(e) => {
			eprintln!("{}", e);
			process::exit(1);
		},
	};

	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	let result = match &config.source {
		StateSource::File(input) => migrate_file(input, &config),
		StateSource::Database { dbpath, address } => {
			let conn = match Connection::open(dbpath) {
				Ok(conn) => conn,
				Err(e) => {
					eprintln!("Could not connect to database: {}", e);
					process::exit(1);
				},
			};
			migrate_database(StateStorage::new(conn), address, &config)
		},
	};

	let (from_version, migrated) = match result {
		Ok(outcome) => outcome,
		Err(e) => {
			eprintln!("{} {}", "Error:".red().bold(), e);
			process::exit(1);
		},
	};

	if let Err(e) = write_output(config.output.as_deref(), config.dry_run, &migrated) {
		eprintln!("{} {}", "Error:".red().bold(), e);
		process::exit(1);
	}

	let summary = format!(
		"State migrated from version {} to {}{}",
		from_version,
		config.target_version,
		if config.dry_run { " (dry run)" } else { "" },
	);
	eprintln!("{}", summary.green().bold());
}

/// Migrates a state document read from a file. States reaching the current version are
/// validated as well.
fn migrate_file(input: &Path, config: &MigratorConfig) -> Result<(i64, Value), String> {
	let data = fs::read_to_string(input)
		.map_err(|e| format!("Could not read {}: {}", input.display(), e))?;
	let state: Value = serde_json::from_str(&data).map_err(|e| format!("Invalid state: {}", e))?;
	let from_version = recorded_version(&state).map_err(|e| e.to_string())?;
	info!(input = %input.display(), from_version, "Migrating state file");

	let migrations = Migrations::default();
	let migrated = if config.target_version == CURRENT_STATE_VERSION {
		let (migrated, _) =
			migrate_and_decode(state, &migrations, &TracingLogger).map_err(|e| e.to_string())?;
		migrated
	} else {
		migrate_state(state, config.target_version, &migrations, &TracingLogger)
			.map_err(|e| e.to_string())?
	};

	Ok((from_version, migrated))
}

/// Loads the latest snapshot of `address`, committing the migrated snapshot unless running dry.
fn migrate_database(
	storage: StateStorage,
	address: &Address,
	config: &MigratorConfig,
) -> Result<(i64, Value), String> {
	storage.setup_database().map_err(|e| e.to_string())?;
	let from_version = match storage.latest_snapshot(address).map_err(|e| e.to_string())? {
		Some(snapshot) => snapshot.version,
		None => return Err(format!("No state stored for {:#x}", address)),
	};

	let raiden_state = storage
		.load_state(address, &Migrations::default(), &TracingLogger, !config.dry_run)
		.map_err(|e| e.to_string())?
		.ok_or_else(|| format!("No state stored for {:#x}", address))?;
	let migrated = encode_raiden_state(&raiden_state).map_err(|e| e.to_string())?;

	Ok((from_version, migrated))
}

/// Writes the migrated state to `output`, or stdout. A dry run never touches `output`.
fn write_output(output: Option<&Path>, dry_run: bool, state: &Value) -> Result<(), String> {
	let data = serde_json::to_string_pretty(state).map_err(|e| e.to_string())?;
	match output {
		Some(_) if dry_run => Ok(()),
		Some(path) =>
			fs::write(path, data).map_err(|e| format!("Could not write {}: {}", path.display(), e)),
		None => {
			println!("{}", data);
			Ok(())
		},
	}
}
