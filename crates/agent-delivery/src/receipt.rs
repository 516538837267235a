//! Receipt polling and confirmation.

use crate::{ChainInterface, DeliveryError};
use agent_types::{truncate_id, tx_link, ReceiptOutcome, TransactionReceipt};
use alloy::primitives::TxHash;
use std::sync::Arc;
use std::time::Duration;

/// Waits for receipts within a fixed budget.
///
/// The budget is counted in polling intervals rather than wall time, so a slow
/// node stretches the real wait but never adds polls.
pub struct ReceiptPoller {
	chain: Arc<dyn ChainInterface>,
	explorer_url: String,
	max_wait_seconds: u64,
	poll_interval_seconds: u64,
}

impl ReceiptPoller {
	pub fn new(
		chain: Arc<dyn ChainInterface>,
		explorer_url: impl Into<String>,
		max_wait_seconds: u64,
		poll_interval_seconds: u64,
	) -> Self {
		Self {
			chain,
			explorer_url: explorer_url.into(),
			max_wait_seconds,
			poll_interval_seconds: poll_interval_seconds.max(1),
		}
	}

	/// Single lookup. Errors other than "not found" propagate.
	pub async fn poll(&self, hash: &TxHash) -> Result<ReceiptOutcome, DeliveryError> {
		Ok(ReceiptOutcome::classify(self.chain.get_receipt(hash).await?))
	}

	/// Polls until the transaction is mined or the wait budget is spent.
	pub async fn confirm(&self, hash: &TxHash, action: &str) -> Result<TransactionReceipt, DeliveryError> {
		let link = tx_link(&self.explorer_url, hash);
		let mut waited = 0;

		while waited < self.max_wait_seconds {
			match self.poll(hash).await? {
				ReceiptOutcome::Success(receipt) => {
					tracing::info!(
						tx_hash = %truncate_id(&hash.to_string()),
						block = receipt.block_number,
						"{} - Confirmed: {}", action, link
					);
					return Ok(receipt);
				}
				ReceiptOutcome::Reverted(_) => {
					tracing::error!(tx_hash = %truncate_id(&hash.to_string()), "Transaction reverted");
					return Err(DeliveryError::Reverted {
						action: action.to_string(),
						link,
					});
				}
				ReceiptOutcome::NotYetMined => {}
			}
			tokio::time::sleep(Duration::from_secs(self.poll_interval_seconds)).await;
			waited += self.poll_interval_seconds;
		}

		tracing::warn!(
			tx_hash = %truncate_id(&hash.to_string()),
			waited_seconds = waited,
			"No receipt within wait budget"
		);
		Err(DeliveryError::Pending {
			action: action.to_string(),
			link,
		})
	}
}
