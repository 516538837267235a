//! Transaction population.

use crate::{ChainInterface, DeliveryError, FeeEstimator};
use agent_types::{ContractCall, Transaction};
use alloy::primitives::Address;
use std::sync::Arc;

/// Applies the 20% safety margin to a gas estimate, rounding up.
pub fn apply_gas_margin(estimate: u64) -> u64 {
	let padded = (estimate as u128 * 6).div_ceil(5);
	padded.min(u64::MAX as u128) as u64
}

/// Turns a call descriptor into a complete, signable transaction.
///
/// Every build reads a fresh fee quote and a fresh nonce, so a rebuilt
/// transaction never reuses stale values from an earlier attempt.
pub struct TransactionBuilder {
	chain: Arc<dyn ChainInterface>,
	fees: FeeEstimator,
}

impl TransactionBuilder {
	pub fn new(chain: Arc<dyn ChainInterface>) -> Self {
		Self {
			fees: FeeEstimator::new(chain.clone()),
			chain,
		}
	}

	pub async fn build(&self, from: Address, call: &ContractCall) -> Result<Transaction, DeliveryError> {
		let fees = self.fees.estimate().await?;
		let nonce = self.chain.get_nonce(from).await?;

		let mut tx = Transaction {
			chain_id: self.chain.chain_id(),
			from,
			to: call.to,
			data: call.data.clone(),
			value: call.value,
			nonce,
			gas_limit: 0,
			max_fee_per_gas: fees.max_fee_per_gas,
			max_priority_fee_per_gas: fees.priority_fee,
		};

		let estimate = self.chain.estimate_gas(&tx).await.map_err(|e| {
			tracing::warn!(to = %call.to, error = %e, "Gas estimation failed");
			match e {
				DeliveryError::Simulation(_) => e,
				other => DeliveryError::Simulation(other.to_string()),
			}
		})?;
		tx.gas_limit = apply_gas_margin(estimate);

		tracing::debug!(
			nonce = tx.nonce,
			gas_estimate = estimate,
			gas_limit = tx.gas_limit,
			"Built transaction"
		);
		Ok(tx)
	}
}
