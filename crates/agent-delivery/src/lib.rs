//! Transaction delivery for the testnet agent.
//!
//! This crate owns the transaction lifecycle: fee computation, nonce and gas
//! filling, signing, broadcast, and receipt confirmation. The node itself is
//! reached only through [`ChainInterface`], a narrow set of read/write
//! operations implemented over alloy in [`implementations::evm::alloy`].

use agent_account::{AccountError, AccountInterface};
use agent_types::{
	truncate_id, ContractCall, ReceiptOutcome, RetryPolicy, Retryable, SubmittedTransaction,
	Transaction, TransactionReceipt,
};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::instrument;

pub mod builder;
pub mod fee;
pub mod receipt;
pub mod submitter;

pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use builder::{apply_gas_margin, TransactionBuilder};
pub use fee::FeeEstimator;
pub use receipt::ReceiptPoller;
pub use submitter::TransactionSubmitter;

/// Errors that can occur during transaction delivery operations.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// Error that occurs during node communication.
	#[error("Network error: {0}")]
	Network(String),
	/// Gas estimation failed; carries the node's message verbatim.
	#[error("Tx simulation failed: {0}")]
	Simulation(String),
	/// Error that occurs when the account cannot sign.
	#[error(transparent)]
	Signing(#[from] AccountError),
	/// The transaction was mined but failed.
	#[error("Failed tx: {link}")]
	Reverted { action: String, link: String },
	/// No receipt appeared within the wait budget. The transaction may still be mined.
	#[error("{action} - Pending tx: {link}")]
	Pending { action: String, link: String },
	/// The node answered with data the agent cannot interpret.
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
}

impl DeliveryError {
	/// True for a simulation failure that reports a revert.
	///
	/// Re-running the same call against the same state reverts again.
	pub fn is_deterministic_revert(&self) -> bool {
		match self {
			DeliveryError::Simulation(message) => {
				let message = message.to_lowercase();
				message.contains("revert")
			}
			_ => false,
		}
	}
}

impl Retryable for DeliveryError {
	fn is_retryable(&self) -> bool {
		!self.is_deterministic_revert() && !matches!(self, DeliveryError::Signing(_))
	}
}

/// Node operations required by the transaction engine.
///
/// Implementations report gas estimation failures as
/// [`DeliveryError::Simulation`] with the node's message, and a receipt that
/// does not exist yet as `Ok(None)`.
#[async_trait]
pub trait ChainInterface: Send + Sync {
	fn chain_id(&self) -> u64;

	/// Suggested priority fee (tip) per gas, in wei.
	async fn max_priority_fee(&self) -> Result<u128, DeliveryError>;

	/// Base fee per gas of the latest block, in wei.
	async fn base_fee(&self) -> Result<u128, DeliveryError>;

	/// Transaction count of `address` at the latest block.
	async fn get_nonce(&self, address: Address) -> Result<u64, DeliveryError>;

	/// Simulates `tx` and returns the gas it would use.
	async fn estimate_gas(&self, tx: &Transaction) -> Result<u64, DeliveryError>;

	/// Broadcasts a signed, encoded transaction.
	async fn send_raw_transaction(&self, raw: &Bytes) -> Result<TxHash, DeliveryError>;

	async fn get_receipt(&self, hash: &TxHash) -> Result<Option<TransactionReceipt>, DeliveryError>;

	/// Native balance of `address`, in wei.
	async fn get_balance(&self, address: Address) -> Result<U256, DeliveryError>;

	/// Executes a read-only call and returns the raw result.
	async fn call(&self, call: &ContractCall, from: Address) -> Result<Bytes, DeliveryError>;
}

/// Builds, submits and confirms transactions for one account.
///
/// Build and submit run under the retry policy; confirmation runs once.
/// Hashes that were broadcast but never confirmed are remembered per action
/// and checked before the action is submitted again.
pub struct DeliveryService {
	builder: TransactionBuilder,
	submitter: TransactionSubmitter,
	receipts: ReceiptPoller,
	address: Address,
	retry: RetryPolicy,
	pending: Mutex<HashMap<String, TxHash>>,
}

impl DeliveryService {
	pub fn new(
		chain: Arc<dyn ChainInterface>,
		account: Arc<dyn AccountInterface>,
		receipts: ReceiptPoller,
		retry: RetryPolicy,
	) -> Self {
		Self {
			builder: TransactionBuilder::new(chain.clone()),
			address: account.address(),
			submitter: TransactionSubmitter::new(chain, account),
			receipts,
			retry,
			pending: Mutex::new(HashMap::new()),
		}
	}

	/// Seeds the pending hashes left over from an earlier run.
	pub fn with_pending(mut self, pending: HashMap<String, TxHash>) -> Self {
		self.pending = Mutex::new(pending);
		self
	}

	pub fn address(&self) -> Address {
		self.address
	}

	/// Pending hashes by action, for persistence.
	pub async fn pending_snapshot(&self) -> HashMap<String, TxHash> {
		self.pending.lock().await.clone()
	}

	/// Executes `call` on chain and waits for its receipt.
	#[instrument(skip_all, fields(action = %action, to = %call.to))]
	pub async fn execute(
		&self,
		action: &str,
		call: &ContractCall,
	) -> Result<TransactionReceipt, DeliveryError> {
		if let Some(receipt) = self.settle_pending(action).await? {
			return Ok(receipt);
		}

		let submitted = self
			.retry
			.run(action, || self.build_and_submit(call))
			.await?;

		self.pending
			.lock()
			.await
			.insert(action.to_string(), submitted.hash);

		// The hash is kept until a receipt has been seen.
		let result = self.receipts.confirm(&submitted.hash, action).await;
		if matches!(result, Ok(_) | Err(DeliveryError::Reverted { .. })) {
			self.pending.lock().await.remove(action);
		}
		result
	}

	/// Builds and broadcasts one attempt with a fresh fee quote and nonce.
	pub async fn build_and_submit(
		&self,
		call: &ContractCall,
	) -> Result<SubmittedTransaction, DeliveryError> {
		let tx = self.builder.build(self.address, call).await?;
		self.submitter.submit(tx).await
	}

	/// Resolves a hash left pending by an earlier attempt of `action`.
	///
	/// A mined success is returned instead of submitting again. Otherwise the
	/// action is rebuilt; the nonce is read at the latest block, so while the
	/// earlier transaction is unmined the rebuilt one reuses its nonce and at
	/// most one of them can be included.
	async fn settle_pending(
		&self,
		action: &str,
	) -> Result<Option<TransactionReceipt>, DeliveryError> {
		let Some(hash) = self.pending.lock().await.get(action).copied() else {
			return Ok(None);
		};

		match self.receipts.poll(&hash).await? {
			ReceiptOutcome::Success(receipt) => {
				tracing::info!(
					tx_hash = %truncate_id(&hash.to_string()),
					"Earlier transaction already mined"
				);
				self.pending.lock().await.remove(action);
				Ok(Some(receipt))
			}
			ReceiptOutcome::Reverted(_) => {
				self.pending.lock().await.remove(action);
				Ok(None)
			}
			ReceiptOutcome::NotYetMined => {
				tracing::debug!(
					tx_hash = %truncate_id(&hash.to_string()),
					"Earlier transaction still pending, resubmitting"
				);
				Ok(None)
			}
		}
	}
}
