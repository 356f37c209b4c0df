use web3::types::{
	Address,
	Bytes,
	H256,
};

use crate::{
	codec,
	machine::raiden,
	tests::factories::{
		apply,
		channel,
		next_balance_proof,
		raiden_state_with_channel,
		secret_and_lock,
		withdraw_request,
		ChannelFixture,
		SETTLE_TIMEOUT,
	},
	types::{
		ActionChannelClose,
		ActionChannelWithdraw,
		ActionLockExpired,
		ActionTransferLock,
		ActionTransferUnlock,
		Block,
		ChannelSettleable,
		ChannelStatus,
		ContractReceiveChannelClosed,
		ContractReceiveChannelDeposit,
		ContractReceiveChannelOpened,
		ContractReceiveChannelSettled,
		ContractReceiveChannelWithdraw,
		Event,
		ReceiveLockExpired,
		ReceiveLockedTransfer,
		ReceiveUnlock,
		ReceiveWithdrawRequest,
		TokenAmount,
		WithdrawRequestExpired,
		U256,
		U64,
	},
	views,
};

#[test]
fn test_channel_opened_starts_with_zero_balance_proofs() {
	let fixture = ChannelFixture::random();
	let raiden_state = raiden_state_with_channel(&fixture, 100, 50);
	let channel_state = channel(&raiden_state, &fixture);

	assert_eq!(channel_state.state, ChannelStatus::Open);
	assert_eq!(channel_state.own.address, raiden_state.address);
	assert_eq!(channel_state.partner.address, fixture.partner);
	assert_eq!(channel_state.own.deposit, TokenAmount::from(100));
	assert_eq!(channel_state.partner.deposit, TokenAmount::from(50));
	for end_state in [&channel_state.own, &channel_state.partner] {
		assert_eq!(end_state.balance_proof.nonce, U256::zero());
		assert_eq!(end_state.next_nonce, U256::one());
		assert!(end_state.locks.is_empty());
	}
	assert_eq!(raiden_state.token2token_network.get(&fixture.token), Some(&fixture.token_network));
}

#[test]
fn test_channel_opened_twice_is_rejected() {
	let fixture = ChannelFixture::random();
	let raiden_state = raiden_state_with_channel(&fixture, 100, 50);

	let state_change = ContractReceiveChannelOpened {
		token: fixture.token,
		token_network_address: fixture.token_network,
		partner: fixture.partner,
		channel_identifier: U64::from(18u64),
		settle_timeout: U64::from(SETTLE_TIMEOUT),
		block_number: U64::from(95u64),
	};
	let result = raiden::state_transition(raiden_state, state_change.into());
	assert!(result.is_err());
}

#[test]
fn test_deposit_never_decreases() {
	let fixture = ChannelFixture::random();
	let raiden_state = raiden_state_with_channel(&fixture, 100, 50);

	let raiden_state = apply(
		&raiden_state,
		ContractReceiveChannelDeposit {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			participant: fixture.partner,
			total_deposit: TokenAmount::from(10),
		},
	);
	assert_eq!(channel(&raiden_state, &fixture).partner.deposit, TokenAmount::from(50));
}

#[test]
fn test_locked_transfer_updates_our_end() {
	let fixture = ChannelFixture::random();
	let raiden_state = raiden_state_with_channel(&fixture, 100, 0);
	let own = channel(&raiden_state, &fixture).own.clone();

	let (_, lock) = secret_and_lock(1, 30, 200);
	let balance_proof = next_balance_proof(&own, &[lock.clone()], TokenAmount::zero());
	let raiden_state = apply(
		&raiden_state,
		ActionTransferLock {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			lock: lock.clone(),
			balance_proof: balance_proof.clone(),
		},
	);

	let own = &channel(&raiden_state, &fixture).own;
	assert_eq!(own.locks, vec![lock]);
	assert_eq!(own.balance_proof, balance_proof);
	assert_eq!(own.next_nonce, U256::from(2));
	assert_eq!(views::get_amount_locked(own), TokenAmount::from(30));
}

#[test]
fn test_locked_transfer_with_reused_nonce_is_rejected() {
	let fixture = ChannelFixture::random();
	let raiden_state = raiden_state_with_channel(&fixture, 100, 0);
	let own = channel(&raiden_state, &fixture).own.clone();

	let (_, first_lock) = secret_and_lock(1, 10, 200);
	let balance_proof = next_balance_proof(&own, &[first_lock.clone()], TokenAmount::zero());
	let raiden_state = apply(
		&raiden_state,
		ActionTransferLock {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			lock: first_lock.clone(),
			balance_proof: balance_proof.clone(),
		},
	);

	let (_, second_lock) = secret_and_lock(2, 10, 200);
	let mut reused = next_balance_proof(
		&channel(&raiden_state, &fixture).own,
		&[first_lock, second_lock.clone()],
		TokenAmount::zero(),
	);
	reused.nonce = balance_proof.nonce;

	let result = raiden::state_transition(
		raiden_state,
		ActionTransferLock {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			lock: second_lock,
			balance_proof: reused,
		}
		.into(),
	);
	let error = result.err().expect("Nonce reuse should fail");
	assert!(error.msg.contains("Invalid nonce"));
}

#[test]
fn test_locked_transfer_with_last_nonce_is_rejected() {
	let fixture = ChannelFixture::random();
	let mut raiden_state = raiden_state_with_channel(&fixture, 100, 0);
	let key = views::channel_key(&fixture.partner, &fixture.token_network);
	{
		let own = &mut raiden_state.channels.get_mut(&key).expect("Channel should exist").own;
		own.balance_proof.nonce = U256::MAX - U256::one();
		own.next_nonce = U256::MAX;
	}
	let encoded = codec::encode_raiden_state(&raiden_state).expect("State should encode");
	codec::decode_raiden_state(&encoded).expect("State should decode");

	let own = channel(&raiden_state, &fixture).own.clone();
	let (_, lock) = secret_and_lock(4, 10, 200);
	let balance_proof = next_balance_proof(&own, &[lock.clone()], TokenAmount::zero());
	assert_eq!(balance_proof.nonce, U256::MAX);

	let result = raiden::state_transition(
		raiden_state,
		ActionTransferLock {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			lock,
			balance_proof,
		}
		.into(),
	);
	let error = result.err().expect("Exhausted nonce should fail");
	assert!(error.msg.contains("no successor"));
}

#[test]
fn test_locked_transfer_with_wrong_locksroot_is_rejected() {
	let fixture = ChannelFixture::random();
	let raiden_state = raiden_state_with_channel(&fixture, 0, 100);
	let partner_end = channel(&raiden_state, &fixture).partner.clone();

	let (_, lock) = secret_and_lock(3, 10, 200);
	let mut balance_proof = next_balance_proof(&partner_end, &[lock.clone()], TokenAmount::zero());
	balance_proof.locksroot = H256::random();

	let result = raiden::state_transition(
		raiden_state,
		ReceiveLockedTransfer {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			lock,
			balance_proof,
		}
		.into(),
	);
	let error = result.err().expect("Wrong locksroot should fail");
	assert!(error.msg.contains("locksroot"));
}

#[test]
fn test_locked_transfer_above_capacity_is_rejected() {
	let fixture = ChannelFixture::random();
	let raiden_state = raiden_state_with_channel(&fixture, 100, 20);
	let partner_end = channel(&raiden_state, &fixture).partner.clone();

	let (_, lock) = secret_and_lock(4, 21, 200);
	let balance_proof = next_balance_proof(&partner_end, &[lock.clone()], TokenAmount::zero());

	let result = raiden::state_transition(
		raiden_state,
		ReceiveLockedTransfer {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			lock,
			balance_proof,
		}
		.into(),
	);
	assert!(result.is_err());
}

#[test]
fn test_unlock_moves_locked_amount_to_transferred() {
	let fixture = ChannelFixture::random();
	let raiden_state = raiden_state_with_channel(&fixture, 0, 100);
	let partner_end = channel(&raiden_state, &fixture).partner.clone();

	let (secret, lock) = secret_and_lock(5, 40, 200);
	let raiden_state = apply(
		&raiden_state,
		ReceiveLockedTransfer {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			lock: lock.clone(),
			balance_proof: next_balance_proof(&partner_end, &[lock], TokenAmount::zero()),
		},
	);

	let partner_end = channel(&raiden_state, &fixture).partner.clone();
	let raiden_state = apply(
		&raiden_state,
		ReceiveUnlock {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			secret,
			balance_proof: next_balance_proof(&partner_end, &[], TokenAmount::from(40)),
		},
	);

	let channel_state = channel(&raiden_state, &fixture);
	assert!(channel_state.partner.locks.is_empty());
	assert_eq!(channel_state.partner.balance_proof.transferred_amount, TokenAmount::from(40));
	assert_eq!(channel_state.partner.balance_proof.locked_amount, TokenAmount::zero());
	assert_eq!(channel_state.partner.next_nonce, U256::from(3));
	assert_eq!(
		views::channel_balance(&channel_state.own, &channel_state.partner),
		TokenAmount::from(40)
	);
}

#[test]
fn test_unlock_with_unknown_secret_is_rejected() {
	let fixture = ChannelFixture::random();
	let raiden_state = raiden_state_with_channel(&fixture, 100, 0);
	let own = channel(&raiden_state, &fixture).own.clone();

	let (_, lock) = secret_and_lock(6, 40, 200);
	let raiden_state = apply(
		&raiden_state,
		ActionTransferLock {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			lock: lock.clone(),
			balance_proof: next_balance_proof(&own, &[lock], TokenAmount::zero()),
		},
	);

	let own = channel(&raiden_state, &fixture).own.clone();
	let result = raiden::state_transition(
		raiden_state,
		ActionTransferUnlock {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			secret: Bytes(vec![99; 32]),
			balance_proof: next_balance_proof(&own, &[], TokenAmount::from(40)),
		}
		.into(),
	);
	assert!(result.is_err());
}

#[test]
fn test_lock_expired_only_after_expiration() {
	let fixture = ChannelFixture::random();
	let raiden_state = raiden_state_with_channel(&fixture, 100, 0);
	let own = channel(&raiden_state, &fixture).own.clone();

	let (_, lock) = secret_and_lock(7, 25, 150);
	let raiden_state = apply(
		&raiden_state,
		ActionTransferLock {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			lock: lock.clone(),
			balance_proof: next_balance_proof(&own, &[lock.clone()], TokenAmount::zero()),
		},
	);
	let own = channel(&raiden_state, &fixture).own.clone();
	let expire = ActionLockExpired {
		token_network_address: fixture.token_network,
		partner: fixture.partner,
		secrethash: lock.secrethash,
		balance_proof: next_balance_proof(&own, &[], TokenAmount::zero()),
	};

	let early = raiden::state_transition(raiden_state.clone(), expire.clone().into());
	assert!(early.is_err());

	let raiden_state = apply(&raiden_state, Block { block_number: U64::from(151u64) });
	let raiden_state = apply(&raiden_state, expire);
	let own = &channel(&raiden_state, &fixture).own;
	assert!(own.locks.is_empty());
	assert_eq!(own.balance_proof.locked_amount, TokenAmount::zero());
	assert_eq!(own.balance_proof.transferred_amount, TokenAmount::zero());
}

#[test]
fn test_partner_lock_expired() {
	let fixture = ChannelFixture::random();
	let raiden_state = raiden_state_with_channel(&fixture, 0, 100);
	let partner_end = channel(&raiden_state, &fixture).partner.clone();

	let (_, lock) = secret_and_lock(8, 25, 120);
	let raiden_state = apply(
		&raiden_state,
		ReceiveLockedTransfer {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			lock: lock.clone(),
			balance_proof: next_balance_proof(&partner_end, &[lock.clone()], TokenAmount::zero()),
		},
	);
	let raiden_state = apply(&raiden_state, Block { block_number: U64::from(121u64) });

	let partner_end = channel(&raiden_state, &fixture).partner.clone();
	let raiden_state = apply(
		&raiden_state,
		ReceiveLockExpired {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			secrethash: lock.secrethash,
			balance_proof: next_balance_proof(&partner_end, &[], TokenAmount::zero()),
		},
	);
	assert!(channel(&raiden_state, &fixture).partner.locks.is_empty());
}

#[test]
fn test_withdraw_request_is_pending_until_expired() {
	let fixture = ChannelFixture::random();
	let raiden_state = raiden_state_with_channel(&fixture, 100, 0);
	let channel_state = channel(&raiden_state, &fixture).clone();

	let request = withdraw_request(&channel_state, &channel_state.own, 60, 130);
	let raiden_state = apply(
		&raiden_state,
		ActionChannelWithdraw {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			request: request.clone(),
		},
	);
	let own = &channel(&raiden_state, &fixture).own;
	assert_eq!(own.pending_withdraws, vec![request.clone()]);
	assert_eq!(own.next_nonce, U256::one());

	let result = raiden::state_transition(
		raiden_state.clone(),
		Block { block_number: U64::from(131u64) }.into(),
	)
	.expect("Block should succeed");
	assert!(channel(&result.new_state, &fixture).own.pending_withdraws.is_empty());
	assert_eq!(
		result.events,
		vec![Event::from(WithdrawRequestExpired {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			participant: raiden_state.address,
			total_withdraw: TokenAmount::from(60),
			expiration: U64::from(130u64),
		})]
	);
}

#[test]
fn test_withdraw_request_above_withdrawable_is_rejected() {
	let fixture = ChannelFixture::random();
	let raiden_state = raiden_state_with_channel(&fixture, 100, 100);
	let channel_state = channel(&raiden_state, &fixture).clone();

	let request = withdraw_request(&channel_state, &channel_state.partner, 101, 130);
	let result = raiden::state_transition(
		raiden_state,
		ReceiveWithdrawRequest {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			request,
		}
		.into(),
	);
	assert!(result.is_err());
}

#[test]
fn test_withdraw_request_with_stale_nonce_is_rejected() {
	let fixture = ChannelFixture::random();
	let raiden_state = raiden_state_with_channel(&fixture, 100, 100);
	let channel_state = channel(&raiden_state, &fixture).clone();

	let mut request = withdraw_request(&channel_state, &channel_state.partner, 50, 130);
	request.nonce = U256::zero();
	let result = raiden::state_transition(
		raiden_state,
		ReceiveWithdrawRequest {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			request,
		}
		.into(),
	);
	assert!(result.is_err());
}

#[test]
fn test_onchain_withdraw_prunes_pending_requests() {
	let fixture = ChannelFixture::random();
	let raiden_state = raiden_state_with_channel(&fixture, 100, 0);
	let channel_state = channel(&raiden_state, &fixture).clone();

	let request = withdraw_request(&channel_state, &channel_state.own, 60, 300);
	let raiden_state = apply(
		&raiden_state,
		ActionChannelWithdraw {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			request,
		},
	);
	let our_address = raiden_state.address;
	let raiden_state = apply(
		&raiden_state,
		ContractReceiveChannelWithdraw {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			participant: our_address,
			total_withdraw: TokenAmount::from(60),
		},
	);

	let own = &channel(&raiden_state, &fixture).own;
	assert!(own.pending_withdraws.is_empty());
	assert_eq!(own.withdraw, TokenAmount::from(60));
}

#[test]
fn test_channel_close_settle_lifecycle() {
	let fixture = ChannelFixture::random();
	let raiden_state = raiden_state_with_channel(&fixture, 100, 0);

	let raiden_state = apply(
		&raiden_state,
		ActionChannelClose { token_network_address: fixture.token_network, partner: fixture.partner },
	);
	assert_eq!(channel(&raiden_state, &fixture).state, ChannelStatus::Closing);

	let closer = raiden_state.address;
	let raiden_state = apply(
		&raiden_state,
		ContractReceiveChannelClosed {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			participant: closer,
			block_number: U64::from(110u64),
		},
	);
	let channel_state = channel(&raiden_state, &fixture);
	assert_eq!(channel_state.state, ChannelStatus::Closed);
	assert_eq!(channel_state.close_block, Some(U64::from(110u64)));
	assert_eq!(channel_state.close_participant, Some(closer));

	let still_closed = apply(&raiden_state, Block { block_number: U64::from(610u64) });
	assert_eq!(channel(&still_closed, &fixture).state, ChannelStatus::Closed);

	let result = raiden::state_transition(
		raiden_state.clone(),
		Block { block_number: U64::from(611u64) }.into(),
	)
	.expect("Block should succeed");
	assert_eq!(
		result.events,
		vec![Event::from(ChannelSettleable {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			channel_identifier: fixture.channel_identifier,
			block_number: U64::from(611u64),
		})]
	);
	assert_eq!(channel(&result.new_state, &fixture).state, ChannelStatus::Settleable);

	let raiden_state = apply(
		&result.new_state,
		ContractReceiveChannelSettled {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			block_number: U64::from(620u64),
		},
	);
	assert!(raiden_state.channels.is_empty());
	let unique_key = format!(
		"17#{}",
		views::channel_key(&fixture.partner, &fixture.token_network)
	);
	let old_channel = raiden_state.old_channels.get(&unique_key).expect("Should be in history");
	assert_eq!(old_channel.state, ChannelStatus::Settled);
}

#[test]
fn test_settle_of_open_channel_is_rejected() {
	let fixture = ChannelFixture::random();
	let raiden_state = raiden_state_with_channel(&fixture, 100, 0);

	let result = raiden::state_transition(
		raiden_state,
		ContractReceiveChannelSettled {
			token_network_address: fixture.token_network,
			partner: fixture.partner,
			block_number: U64::from(620u64),
		}
		.into(),
	);
	assert!(result.is_err());
}

#[test]
fn test_state_change_for_unknown_channel_is_rejected() {
	let fixture = ChannelFixture::random();
	let raiden_state = raiden_state_with_channel(&fixture, 100, 0);

	let result = raiden::state_transition(
		raiden_state,
		ActionChannelClose { token_network_address: fixture.token_network, partner: Address::random() }
			.into(),
	);
	assert!(result.is_err());
}
