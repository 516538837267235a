//! Faucet claim API.

use crate::FlowError;
use alloy::primitives::Address;
use async_trait::async_trait;
use serde::Deserialize;

/// Marker the faucet puts in its message when it broadcast a drip.
pub const CLAIM_SUCCESS_MARKER: &str = "Txhash";

#[derive(Debug, Clone, Deserialize)]
pub struct ClaimResponse {
	#[serde(default)]
	pub msg: String,
}

impl ClaimResponse {
	pub fn is_success(&self) -> bool {
		self.msg.contains(CLAIM_SUCCESS_MARKER)
	}
}

/// Faucet gate protected by a challenge token.
#[async_trait]
pub trait FaucetApi: Send + Sync {
	/// Requests a drip to `address`, authorized by a solved challenge.
	async fn claim(&self, address: Address, token: &str) -> Result<ClaimResponse, FlowError>;
}
