//! Signing and broadcast.

use crate::{ChainInterface, DeliveryError};
use agent_account::AccountInterface;
use agent_types::{truncate_id, SubmittedTransaction, Transaction};
use std::sync::Arc;

/// Signs populated transactions with the account key and broadcasts them.
pub struct TransactionSubmitter {
	chain: Arc<dyn ChainInterface>,
	account: Arc<dyn AccountInterface>,
}

impl TransactionSubmitter {
	pub fn new(chain: Arc<dyn ChainInterface>, account: Arc<dyn AccountInterface>) -> Self {
		Self { chain, account }
	}

	pub async fn submit(&self, tx: Transaction) -> Result<SubmittedTransaction, DeliveryError> {
		let raw = self.account.sign_transaction(&tx).await?;
		let hash = self.chain.send_raw_transaction(&raw).await?;

		tracing::info!(
			tx_hash = %truncate_id(&hash.to_string()),
			nonce = tx.nonce,
			"Submitted transaction"
		);
		Ok(SubmittedTransaction { hash, request: tx })
	}
}
