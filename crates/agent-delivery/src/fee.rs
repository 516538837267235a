//! EIP-1559 fee computation.

use crate::{ChainInterface, DeliveryError};
use agent_types::FeeQuote;
use std::sync::Arc;

/// Derives a fee quote from the node's current suggestions.
///
/// The priority fee is twice the suggested tip, and the fee cap adds twice the
/// latest base fee on top of it. Arithmetic saturates instead of wrapping.
pub struct FeeEstimator {
	chain: Arc<dyn ChainInterface>,
}

impl FeeEstimator {
	pub fn new(chain: Arc<dyn ChainInterface>) -> Self {
		Self { chain }
	}

	/// Fetches a fresh tip and base fee and computes the quote.
	pub async fn estimate(&self) -> Result<FeeQuote, DeliveryError> {
		let suggested = self.chain.max_priority_fee().await?;
		let base_fee = self.chain.base_fee().await?;
		let quote = Self::quote(suggested, base_fee);

		tracing::debug!(
			suggested_tip = suggested,
			base_fee = base_fee,
			priority_fee = quote.priority_fee,
			max_fee_per_gas = quote.max_fee_per_gas,
			"Computed fee quote"
		);
		Ok(quote)
	}

	pub fn quote(suggested_priority_fee: u128, base_fee: u128) -> FeeQuote {
		let priority_fee = suggested_priority_fee.saturating_mul(2);
		FeeQuote {
			priority_fee,
			max_fee_per_gas: priority_fee.saturating_add(base_fee.saturating_mul(2)),
		}
	}
}
