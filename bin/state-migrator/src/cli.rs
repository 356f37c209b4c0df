use std::path::PathBuf;

use raiden_primitives::types::Address;
use raiden_state_machine::{
	constants::CURRENT_STATE_VERSION,
	views,
};
use structopt::StructOpt;

fn parse_address(address: &str) -> Result<Address, String> {
	views::parse_address(address).ok_or_else(|| format!("Invalid address `{}`", address))
}

#[derive(StructOpt, Debug)]
#[structopt(name = "State Migrator")]
pub struct Opt {
	/// JSON file holding a persisted state.
	#[structopt(short("i"), long, parse(from_os_str), conflicts_with = "dbpath")]
	pub input: Option<PathBuf>,

	/// Sqlite database holding state snapshots.
	#[structopt(short("d"), long, parse(from_os_str), requires = "address")]
	pub dbpath: Option<PathBuf>,

	/// Address owning the snapshots in `dbpath`.
	#[structopt(short("a"), long, parse(try_from_str = parse_address))]
	pub address: Option<Address>,

	/// Where to write the migrated state. Printed to stdout otherwise.
	#[structopt(short("o"), long, parse(from_os_str))]
	pub output: Option<PathBuf>,

	#[structopt(short("t"), long)]
	pub target_version: Option<u32>,

	/// Migrate and validate without writing anything.
	#[structopt(long)]
	pub dry_run: bool,

	#[structopt(short, long, parse(from_occurrences))]
	pub verbose: u8,
}

/// Where the state to migrate comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum StateSource {
	File(PathBuf),
	Database { dbpath: PathBuf, address: Address },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MigratorConfig {
	pub source: StateSource,
	pub output: Option<PathBuf>,
	pub target_version: u32,
	pub dry_run: bool,
	pub log_filter: String,
}

impl MigratorConfig {
	pub fn from_opt(opt: Opt) -> Result<Self, String> {
		let source = match (opt.input, opt.dbpath, opt.address) {
			(Some(input), None, _) => StateSource::File(expand(input)?),
			(None, Some(dbpath), Some(address)) =>
				StateSource::Database { dbpath: expand(dbpath)?, address },
			_ => return Err("Either --input or --dbpath with --address is required".to_owned()),
		};

		let target_version = opt.target_version.unwrap_or(CURRENT_STATE_VERSION);
		if target_version > CURRENT_STATE_VERSION {
			return Err(format!(
				"Target version {} is above the latest known version {}",
				target_version, CURRENT_STATE_VERSION
			))
		}
		if matches!(source, StateSource::Database { .. }) && target_version != CURRENT_STATE_VERSION
		{
			return Err("Database snapshots can only be migrated to the current version".to_owned())
		}

		let output = match opt.output {
			Some(output) => Some(expand(output)?),
			None => None,
		};

		Ok(Self {
			source,
			output,
			target_version,
			dry_run: opt.dry_run,
			log_filter: log_filter(opt.verbose).to_owned(),
		})
	}
}

fn expand(path: PathBuf) -> Result<PathBuf, String> {
	expanduser::expanduser(path.to_string_lossy())
		.map_err(|e| format!("Error expanding path {}: {}", path.display(), e))
}

fn log_filter(verbose: u8) -> &'static str {
	match verbose {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	}
}
