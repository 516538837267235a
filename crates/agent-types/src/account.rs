//! Account records.
//!
//! `AccountRecord` is the read-only input (key and proxy) for one account.
//! `AccountState` is the progress the workflows mutate and the service persists.

use crate::SecretString;
use alloy::primitives::TxHash;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Input record for one funding account.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountRecord {
	pub private_key: SecretString,
	/// Proxy URL, with or without scheme.
	#[serde(default)]
	pub proxy: Option<String>,
}

/// Mutable per-account progress. Only the owning flow touches it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
	/// Unix timestamp of the last successful faucet drip.
	#[serde(default)]
	pub last_drip_ts: u64,
	#[serde(default)]
	pub drip: bool,
	#[serde(default)]
	pub swap: bool,
	#[serde(default)]
	pub mint: bool,
	/// Broadcast hashes that were still pending when their flow gave up, by action.
	#[serde(default)]
	pub pending_txs: HashMap<String, TxHash>,
}

impl AccountState {
	/// One-line progress summary for logs.
	pub fn summary(&self) -> String {
		let mark = |done: bool| if done { "done" } else { "-" };
		format!(
			"drip: {}, swap: {}, mint: {}",
			mark(self.drip),
			mark(self.swap),
			mark(self.mint)
		)
	}
}
