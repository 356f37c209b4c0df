#![warn(clippy::missing_docs_in_private_items)]

use raiden_primitives::{
	hashing,
	types::{
		Locksroot,
		SecretHash,
	},
};

use crate::types::{
	ChannelEndState,
	Lock,
};

/// The end's locks with `lock` appended, `None` if its secrethash is already locked.
pub(crate) fn compute_locks_with(end_state: &ChannelEndState, lock: &Lock) -> Option<Vec<Lock>> {
	if end_state.get_lock(&lock.secrethash).is_some() {
		return None
	}

	let mut locks = end_state.locks.clone();
	locks.push(lock.clone());
	Some(locks)
}

/// The end's locks without the one for `secrethash`, `None` if there is no such lock.
pub(crate) fn compute_locks_without(
	end_state: &ChannelEndState,
	secrethash: &SecretHash,
) -> Option<(Lock, Vec<Lock>)> {
	let lock = end_state.get_lock(secrethash)?.clone();
	let locks = end_state.locks.iter().filter(|l| &l.secrethash != secrethash).cloned().collect();
	Some((lock, locks))
}

pub fn compute_locksroot(locks: &[Lock]) -> Locksroot {
	let encoded: Vec<_> = locks.iter().map(Lock::encode).collect();
	hashing::compute_locksroot(&encoded)
}
