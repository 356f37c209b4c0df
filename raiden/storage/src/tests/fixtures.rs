use std::cell::RefCell;

use raiden_primitives::{
	constants::LOCKSROOT_OF_NO_LOCKS,
	hashing::{
		hash_secret,
		to_checksum_address,
	},
};
use raiden_state_machine::{
	codec::DecodeError,
	views::{
		channel_key,
		parse_address,
	},
};
use serde_json::{
	json,
	Value,
};

use crate::{
	logger::MigrationLogger,
	migrations::MigrationStepError,
};

pub const OUR_ADDRESS: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
pub const PARTNER: &str = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359";
pub const CLOSED_PARTNER: &str = "0xdbf03b407c01e7cd3cbea99509d93f8dddc8c6fb";
pub const OPENING_PARTNER: &str = "0xd1220a0cf47c7b9be7a2e6ba89f429762e7b9adb";
pub const TOKEN: &str = "0x52908400098527886e0f7030069857d2e4169ee7";
pub const TOKEN_NETWORK: &str = "0x8617e340b3d01fa5f11f306f4090fd50e238070d";
pub const REGISTRY: &str = "0xde709f2102306220921060314715629080e2fb77";
pub const CLOSE_TX_HASH: &str =
	"0x2222222222222222222222222222222222222222222222222222222222222222";
pub const MESSAGE_HASH: &str =
	"0x3333333333333333333333333333333333333333333333333333333333333333";

pub fn checksum(address: &str) -> String {
	to_checksum_address(&parse_address(address).expect("Fixture address should parse"))
}

pub fn key_of(partner: &str) -> String {
	channel_key(
		&parse_address(partner).expect("Fixture address should parse"),
		&parse_address(TOKEN_NETWORK).expect("Fixture address should parse"),
	)
}

pub fn secret() -> String {
	format!("0x{}", "11".repeat(32))
}

pub fn secrethash() -> String {
	let secret = hex_bytes(&secret());
	format!("{:#x}", hash_secret(&secret))
}

fn hex_bytes(value: &str) -> Vec<u8> {
	(2..value.len())
		.step_by(2)
		.map(|i| u8::from_str_radix(&value[i..i + 2], 16).expect("Fixture hex should parse"))
		.collect()
}

pub fn locksroot_of_no_locks() -> String {
	format!("{:#x}", *LOCKSROOT_OF_NO_LOCKS)
}

/// A locked transfer message as the legacy client stored it.
pub fn locked_transfer() -> Value {
	json!({
		"type": "LockedTransfer",
		"message_identifier": "11",
		"payment_identifier": "12",
		"chain_id": "1337",
		"token_network_address": TOKEN_NETWORK,
		"channel_identifier": "7",
		"nonce": "1",
		"transferred_amount": "0",
		"locked_amount": "10",
		"locksroot": locksroot_of_no_locks(),
		"token": TOKEN,
		"recipient": PARTNER,
		"target": PARTNER,
		"initiator": OUR_ADDRESS,
		"lock": {
			"amount": "10",
			"expiration": "600",
			"secrethash": secrethash(),
		},
		"metadata": { "routes": [{ "route": [OUR_ADDRESS, PARTNER] }] },
		"signature": format!("0x{}", "aa".repeat(65)),
	})
}

/// The smallest document the oldest client could have written.
pub fn minimal_legacy_state() -> Value {
	json!({
		"address": OUR_ADDRESS,
		"chainId": 1337,
		"registry": REGISTRY,
		"blockNumber": 500,
	})
}

/// An untagged document exercising every legacy layout the chain rewrites.
pub fn legacy_state() -> Value {
	json!({
		"address": OUR_ADDRESS,
		"chainId": 1337,
		"registry": REGISTRY,
		"blockNumber": 500,
		"config": { "pfsMode": "auto" },
		"tokens": { TOKEN: TOKEN_NETWORK },
		"channels": {
			TOKEN_NETWORK: {
				PARTNER: {
					"state": "open",
					"id": 7,
					"settleTimeout": 500,
					"openBlock": 120,
					"own": { "deposit": "100" },
					"partner": {
						"deposit": "50",
						"balanceProof": {
							"chainId": "1337",
							"tokenNetworkAddress": TOKEN_NETWORK,
							"channelId": "7",
							"nonce": "3",
							"transferredAmount": "20",
							"lockedAmount": "0",
							"locksroot": locksroot_of_no_locks(),
							"messageHash": MESSAGE_HASH,
							"signature": format!("0x{}", "bb".repeat(65)),
							"sender": PARTNER,
						},
					},
				},
				CLOSED_PARTNER: {
					"state": "closed",
					"id": 8,
					"settleTimeout": 500,
					"openBlock": 100,
					"closeBlock": 450,
					"own": { "deposit": "10" },
					"partner": { "deposit": "0" },
				},
				OPENING_PARTNER: { "state": "opening" },
			},
		},
		"sent": {
			secrethash(): {
				"transfer": [1000, locked_transfer()],
				"transferProcessed": [1010, {
					"type": "Processed",
					"message_identifier": "11",
					"signature": format!("0x{}", "cc".repeat(65)),
				}],
				"secretReveal": [1100, {
					"type": "SecretReveal",
					"message_identifier": "13",
					"secret": secret(),
					"signature": format!("0x{}", "dd".repeat(65)),
				}],
				"channelClosed": [1200, CLOSE_TX_HASH],
			},
		},
		"secrets": {
			secrethash(): { "secret": secret(), "registerBlock": 10 },
			MESSAGE_HASH: { "secret": "0x99" },
		},
		"path": { "iou": {} },
		"transport": {
			"matrix": {
				"server": "https://matrix.example.org",
				"setup": {
					"userId": "@0x5aaeb605:matrix.example.org",
					"accessToken": "token",
					"deviceId": "RAIDEN",
					"displayName": "0xsignature",
				},
				"rooms": {},
			},
		},
		"pendingTxs": [],
	})
}

/// Keeps every call for inspection.
#[derive(Default)]
pub struct RecordingLogger {
	pub applied: RefCell<Vec<(i64, u32)>>,
	pub failed: RefCell<Vec<(i64, u32, Value)>>,
	pub invalid: RefCell<Vec<u32>>,
}

impl MigrationLogger for RecordingLogger {
	fn migration_applied(&self, from_version: i64, to_version: u32) {
		self.applied.borrow_mut().push((from_version, to_version));
	}

	fn migration_failed(
		&self,
		from_version: i64,
		to_version: u32,
		state: &Value,
		_cause: &MigrationStepError,
	) {
		self.failed.borrow_mut().push((from_version, to_version, state.clone()));
	}

	fn validation_failed(&self, version: u32, _error: &DecodeError) {
		self.invalid.borrow_mut().push(version);
	}
}
