use super::{display_amount, AccountWorkflow};
use crate::amount::randomized_amount;
use crate::contracts::batch_swap_call;
use crate::dex::min_amount_out;
use crate::FlowError;
use agent_types::TransactionReceipt;
use alloy::primitives::U256;
use tracing::instrument;

impl AccountWorkflow {
	/// Swaps a random share of the native balance into the quote token.
	///
	/// Below the minimum balance one drip is requested, waiting for the tokens,
	/// before the balance is checked again.
	#[instrument(skip_all, fields(account = %self.label))]
	pub async fn swap(&self) -> Result<TransactionReceipt, FlowError> {
		tracing::info!("Starting swap");
		self.retry
			.run("swap", || self.try_swap())
			.await
			.map_err(|e| e.in_action("swap"))
	}

	async fn try_swap(&self) -> Result<TransactionReceipt, FlowError> {
		let swap = &self.config.swap;
		let min_balance = U256::from(swap.min_balance_wei);

		let mut balance = self.chain.get_balance(self.address).await?;
		if balance < min_balance {
			tracing::info!(balance = %display_amount(balance), "Not enough native balance, trying to drip");
			self.drip(true).await?;
			balance = self.chain.get_balance(self.address).await?;
		}
		if balance < min_balance {
			return Err(FlowError::InsufficientBalance {
				asset: "native".into(),
				balance: display_amount(balance),
			});
		}

		let amount = randomized_amount(&mut rand::thread_rng(), balance, swap.fraction, swap.precision)?;
		tracing::info!(amount = %display_amount(amount), "Swapping native to quote token");

		let steps = self
			.dex
			.route(swap.wrapped_native, swap.quote_token, amount)
			.await?;
		let min_out = min_amount_out(&steps)?;

		let call = batch_swap_call(swap.router, swap.pool, amount, swap.quote_token, min_out);
		let receipt = self.delivery.execute("Swap", &call).await?;

		self.state.lock().await.swap = true;
		tracing::info!("Swap done");
		Ok(receipt)
	}
}

#[cfg(test)]
mod tests {
	use crate::contracts::batch_swap_call;
	use crate::flows::fixtures::{Harness, ONE_TOKEN};
	use agent_types::{current_timestamp, AccountState};
	use alloy::primitives::U256;

	#[tokio::test(start_paused = true)]
	async fn test_swap_submits_batch_swap() {
		let harness = Harness::new();
		harness.chain.push_balance(U256::from(ONE_TOKEN));
		harness.dex.set_amount_out("1000000");
		harness.chain.push_receipt_status(1);
		let workflow = harness.workflow(AccountState::default());

		workflow.swap().await.unwrap();

		let simulated = harness.chain.simulated();
		assert_eq!(simulated.len(), 1);
		let tx = &simulated[0];
		let swap = &harness.config.swap;

		assert_eq!(tx.to, swap.router);
		assert!(tx.value >= U256::from(ONE_TOKEN / 10));
		assert!(tx.value <= U256::from(ONE_TOKEN * 4 / 10 + ONE_TOKEN / 1000));
		let expected = batch_swap_call(swap.router, swap.pool, tx.value, swap.quote_token, U256::from(900_000));
		assert_eq!(tx.data, expected.data);

		let routes = harness.dex.routes();
		assert_eq!(routes, vec![(swap.wrapped_native, swap.quote_token, tx.value)]);
		assert!(workflow.state().await.swap);
		assert_eq!(harness.faucet.claims(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn test_low_balance_drips_once_then_fails() {
		let harness = Harness::new();
		let workflow = harness.workflow(AccountState::default());

		let err = workflow.swap().await.unwrap_err();

		assert!(err.to_string().starts_with("Failed to swap: Not enough native balance"));
		// Later attempts find the drip within its cooldown.
		assert_eq!(harness.faucet.claims(), 1);
		assert!(harness.chain.sent().is_empty());
	}

	#[tokio::test(start_paused = true)]
	async fn test_low_balance_recovers_after_drip() {
		let harness = Harness::new();
		harness.chain.push_balance(U256::ZERO);
		harness.chain.push_balance(U256::from(ONE_TOKEN));
		harness.chain.push_receipt_status(1);
		let workflow = harness.workflow(AccountState {
			last_drip_ts: current_timestamp() - 5000,
			..Default::default()
		});

		workflow.swap().await.unwrap();

		assert_eq!(harness.faucet.claims(), 1);
		assert_eq!(harness.chain.sent().len(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn test_reverted_swap_is_retried() {
		let harness = Harness::new();
		harness.chain.push_balance(U256::from(ONE_TOKEN));
		harness.chain.push_receipt_status(0);
		harness.chain.push_receipt_status(1);
		let workflow = harness.workflow(AccountState::default());

		workflow.swap().await.unwrap();

		assert_eq!(harness.chain.sent().len(), 2);
		assert_eq!(harness.dex.routes().len(), 2);
	}
}
