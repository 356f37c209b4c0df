#![warn(clippy::missing_docs_in_private_items)]

//! Typed decoding of a persisted `RaidenState` document.
//!
//! Decoding walks the document container by container so that a failure
//! names the offending path, what was expected there and what was found.

use std::collections::{
	HashMap,
	HashSet,
};

use raiden_primitives::{
	deserializers::u256_from_any,
	hashing::to_checksum_address,
	types::{
		Address,
		BlockNumber,
		ChannelIdentifier,
		SecretHash,
		U256,
	},
};
use serde::{
	de::DeserializeOwned,
	Deserialize,
};
use serde_json::{
	Map,
	Value,
};
use thiserror::Error;

use crate::{
	constants::CURRENT_STATE_VERSION,
	types::{
		BalanceProofState,
		ChannelEndState,
		ChannelState,
		ChannelStatus,
		Lock,
		RaidenState,
		TransferState,
		WithdrawRequest,
	},
	views::{
		channel_key,
		channel_unique_key,
	},
};

/// Maximum length of a rendered value in error messages.
const MAX_ACTUAL_LENGTH: usize = 80;

/// A persisted state failed schema validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid state at `{path}`: expected {expected}, got {actual}")]
pub struct DecodeError {
	pub path: String,
	pub expected: String,
	pub actual: String,
}

impl DecodeError {
	fn new(path: &str, expected: impl Into<String>, actual: &Value) -> Self {
		Self { path: path.to_owned(), expected: expected.into(), actual: describe(actual) }
	}
}

/// Unsigned integer in any of the accepted encodings.
#[derive(Deserialize)]
struct UInt(#[serde(deserialize_with = "u256_from_any")] U256);

/// Short human readable rendering of a JSON value.
fn describe(value: &Value) -> String {
	let rendered = match value {
		Value::Null => "null".to_owned(),
		Value::Bool(b) => format!("boolean {}", b),
		Value::Number(n) => format!("number {}", n),
		Value::String(s) => format!("string {:?}", s),
		Value::Array(items) => format!("array of {} items", items.len()),
		Value::Object(map) => {
			let keys: Vec<&str> = map.keys().map(String::as_str).collect();
			format!("object with keys [{}]", keys.join(", "))
		},
	};
	if rendered.len() > MAX_ACTUAL_LENGTH {
		let cut = (0..=MAX_ACTUAL_LENGTH).rev().find(|i| rendered.is_char_boundary(*i)).unwrap_or(0);
		return format!("{}...", &rendered[..cut])
	}
	rendered
}

fn join(path: &str, name: &str) -> String {
	if path.is_empty() {
		name.to_owned()
	} else {
		format!("{}.{}", path, name)
	}
}

fn decode<T: DeserializeOwned>(value: &Value, path: &str, expected: &str) -> Result<T, DecodeError> {
	T::deserialize(value)
		.map_err(|e| DecodeError::new(path, format!("{} ({})", expected, e), value))
}

/// Members of a JSON object under decoding.
struct Fields<'a> {
	/// Path of the object itself.
	path: String,
	/// The object members.
	object: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
	fn of(value: &'a Value, path: &str, expected: &str) -> Result<Self, DecodeError> {
		match value.as_object() {
			Some(object) => Ok(Self { path: path.to_owned(), object }),
			None => Err(DecodeError::new(path, expected, value)),
		}
	}

	fn path(&self, name: &str) -> String {
		join(&self.path, name)
	}

	fn value(&self, name: &str) -> Result<&'a Value, DecodeError> {
		self.object.get(name).ok_or_else(|| DecodeError {
			path: self.path(name),
			expected: "a value".to_owned(),
			actual: "missing field".to_owned(),
		})
	}

	fn required<T: DeserializeOwned>(&self, name: &str, expected: &str) -> Result<T, DecodeError> {
		decode(self.value(name)?, &self.path(name), expected)
	}

	fn optional<T: DeserializeOwned>(
		&self,
		name: &str,
		expected: &str,
	) -> Result<Option<T>, DecodeError> {
		match self.object.get(name) {
			None | Some(Value::Null) => Ok(None),
			Some(value) => decode(value, &self.path(name), expected).map(Some),
		}
	}

	fn object(&self, name: &str) -> Result<Fields<'a>, DecodeError> {
		Fields::of(self.value(name)?, &self.path(name), "an object")
	}

	fn array(&self, name: &str) -> Result<Vec<(String, &'a Value)>, DecodeError> {
		let value = self.value(name)?;
		let path = self.path(name);
		match value.as_array() {
			Some(items) => Ok(items
				.iter()
				.enumerate()
				.map(|(index, item)| (format!("{}[{}]", path, index), item))
				.collect()),
			None => Err(DecodeError::new(&path, "an array", value)),
		}
	}
}

/// Decodes and validates a current version state document.
pub fn decode_raiden_state(value: &Value) -> Result<RaidenState, DecodeError> {
	let root = Fields::of(value, "", "a RaidenState object")?;

	let version: u32 = root.required("version", "an integer version")?;
	if version != CURRENT_STATE_VERSION {
		return Err(DecodeError::new(
			"version",
			format!("version {}", CURRENT_STATE_VERSION),
			root.value("version")?,
		))
	}

	let mut channels = HashMap::new();
	let channels_fields = root.object("channels")?;
	for (key, channel) in channels_fields.object {
		let path = channels_fields.path(key);
		let channel = decode_channel(channel, &path)?;
		let expected_key = channel_key(&channel.partner.address, &channel.token_network);
		if key != &expected_key {
			return Err(DecodeError::new(
				&path,
				format!("channel stored under `{}`", expected_key),
				&Value::String(key.clone()),
			))
		}
		channels.insert(key.clone(), channel);
	}

	let mut old_channels = HashMap::new();
	let old_channels_fields = root.object("oldChannels")?;
	for (key, channel) in old_channels_fields.object {
		let path = old_channels_fields.path(key);
		let channel = decode_channel(channel, &path)?;
		let expected_key = channel_unique_key(&channel);
		if key != &expected_key {
			return Err(DecodeError::new(
				&path,
				format!("channel stored under `{}`", expected_key),
				&Value::String(key.clone()),
			))
		}
		old_channels.insert(key.clone(), channel);
	}

	Ok(RaidenState {
		address: root.required("address", "an address")?,
		version,
		chain_id: root.required("chainId", "a chain id")?,
		registry: root.required("registry", "an address")?,
		block_number: root.required("blockNumber", "a block number")?,
		config: root.optional("config", "a config object")?.unwrap_or_default(),
		channels,
		old_channels,
		token2token_network: root
			.required("token2tokenNetwork", "a token to token network address map")?,
		transport: root.optional("transport", "a transport object")?.unwrap_or_default(),
		sent: decode_transfers(&root.object("sent")?)?,
		received: decode_transfers(&root.object("received")?)?,
		iou: root.optional("iou", "an IOU map")?.unwrap_or_default(),
		pending_txs: root.optional("pendingTxs", "an array of transactions")?.unwrap_or_default(),
	})
}

fn decode_transfers(
	fields: &Fields,
) -> Result<HashMap<SecretHash, TransferState>, DecodeError> {
	let mut transfers = HashMap::new();
	for (key, transfer) in fields.object {
		let path = fields.path(key);
		let secrethash: SecretHash =
			decode(&Value::String(key.clone()), &path, "a secrethash key")?;
		transfers.insert(secrethash, decode(transfer, &path, "a transfer")?);
	}
	Ok(transfers)
}

fn decode_channel(value: &Value, path: &str) -> Result<ChannelState, DecodeError> {
	let fields = Fields::of(value, path, "a Channel object")?;

	let id: ChannelIdentifier = fields.required("id", "a channel id")?;
	let state: ChannelStatus = fields.required("state", "a channel state")?;
	let token_network: Address = fields.required("tokenNetwork", "an address")?;
	let close_participant: Option<Address> =
		fields.optional("closeParticipant", "an address")?;
	if state == ChannelStatus::Open && close_participant.is_some() {
		return Err(DecodeError::new(
			&fields.path("closeParticipant"),
			"no close participant on an open channel",
			fields.value("closeParticipant")?,
		))
	}

	let own = decode_end(fields.value("own")?, &fields.path("own"))?;
	let partner = decode_end(fields.value("partner")?, &fields.path("partner"))?;
	for (end, end_path) in [(&own, fields.path("own")), (&partner, fields.path("partner"))] {
		check_balance_proof_channel(&end.balance_proof, id, &token_network, &end_path)?;
	}

	Ok(ChannelState {
		id,
		settle_timeout: fields.required("settleTimeout", "a settle timeout")?,
		open_block: fields.required("openBlock", "a block number")?,
		close_block: fields.optional::<BlockNumber>("closeBlock", "a block number")?,
		close_participant,
		state,
		token: fields.required("token", "an address")?,
		token_network,
		own,
		partner,
	})
}

fn check_balance_proof_channel(
	balance_proof: &BalanceProofState,
	id: ChannelIdentifier,
	token_network: &Address,
	end_path: &str,
) -> Result<(), DecodeError> {
	let path = join(end_path, "balanceProof");
	if balance_proof.channel_id != U256::from(id) {
		return Err(DecodeError::new(
			&join(&path, "channelId"),
			format!("channel id {}", id),
			&Value::String(balance_proof.channel_id.to_string()),
		))
	}
	if &balance_proof.token_network_address != token_network {
		return Err(DecodeError::new(
			&join(&path, "tokenNetworkAddress"),
			format!("token network {}", to_checksum_address(token_network)),
			&Value::String(to_checksum_address(&balance_proof.token_network_address)),
		))
	}
	Ok(())
}

fn decode_end(value: &Value, path: &str) -> Result<ChannelEndState, DecodeError> {
	let fields = Fields::of(value, path, "a ChannelEnd object")?;

	let mut locks: Vec<Lock> = vec![];
	let mut secrethashes = HashSet::new();
	for (lock_path, lock) in fields.array("locks")? {
		let lock: Lock = decode(lock, &lock_path, "a Lock")?;
		if !secrethashes.insert(lock.secrethash) {
			return Err(DecodeError::new(
				&join(&lock_path, "secrethash"),
				"a secrethash unique among the end's locks",
				&Value::String(format!("{:#x}", lock.secrethash)),
			))
		}
		locks.push(lock);
	}

	let mut pending_withdraws: Vec<WithdrawRequest> = vec![];
	for (request_path, request) in fields.array("pendingWithdraws")? {
		pending_withdraws.push(decode(request, &request_path, "a WithdrawRequest")?);
	}

	let balance_proof: BalanceProofState = fields.required("balanceProof", "a BalanceProof")?;
	let next_nonce = fields.required::<UInt>("nextNonce", "an unsigned integer")?.0;
	let expected_next_nonce = balance_proof.nonce.checked_add(U256::one());
	if expected_next_nonce != Some(next_nonce) {
		return Err(DecodeError::new(
			&fields.path("nextNonce"),
			format!("balanceProof.nonce + 1 (nonce is {})", balance_proof.nonce),
			fields.value("nextNonce")?,
		))
	}

	Ok(ChannelEndState {
		address: fields.required("address", "an address")?,
		deposit: fields.required::<UInt>("deposit", "an unsigned integer")?.0,
		withdraw: fields.required::<UInt>("withdraw", "an unsigned integer")?.0,
		locks,
		balance_proof,
		pending_withdraws,
		next_nonce,
	})
}

/// Serializes a state into its persisted document form.
pub fn encode_raiden_state(state: &RaidenState) -> Result<Value, serde_json::Error> {
	serde_json::to_value(state)
}
