use super::{display_amount, AccountWorkflow};
use crate::amount::randomized_amount;
use crate::contracts::{allowance_call, approve_max_call, decode_uint, mint_call};
use crate::FlowError;
use agent_types::TransactionReceipt;
use alloy::primitives::{Address, U256};
use tracing::instrument;

impl AccountWorkflow {
	/// Mints the stablecoin against a random share of the collateral balance.
	///
	/// Without collateral the swap flow runs first.
	#[instrument(skip_all, fields(account = %self.label))]
	pub async fn mint(&self) -> Result<TransactionReceipt, FlowError> {
		tracing::info!("Starting mint");
		self.retry
			.run("mint", || self.try_mint())
			.await
			.map_err(|e| e.in_action("mint"))
	}

	async fn try_mint(&self) -> Result<TransactionReceipt, FlowError> {
		let mint = &self.config.mint;

		let mut balance = self.token_balance(mint.collateral).await?;
		if balance.is_zero() {
			tracing::info!("No collateral in wallet, starting swap");
			self.swap().await?;
			balance = self.token_balance(mint.collateral).await?;
		}
		if balance.is_zero() {
			return Err(FlowError::InsufficientBalance {
				asset: "collateral".into(),
				balance: display_amount(balance),
			});
		}

		let amount = randomized_amount(&mut rand::thread_rng(), balance, mint.fraction, mint.precision)?;
		tracing::info!(amount = %display_amount(amount), "Minting against collateral");

		self.approve_if_needed(mint.collateral, mint.honey, amount)
			.await?;

		let call = mint_call(mint.honey, self.address, mint.collateral, amount);
		let receipt = self.delivery.execute("Mint", &call).await?;

		self.state.lock().await.mint = true;
		tracing::info!("Mint done");
		Ok(receipt)
	}

	/// Grants `spender` an unlimited allowance when the current one is below `amount`.
	pub async fn approve_if_needed(
		&self,
		token: Address,
		spender: Address,
		amount: U256,
	) -> Result<(), FlowError> {
		let data = self
			.chain
			.call(&allowance_call(token, self.address, spender), self.address)
			.await?;
		if decode_uint(&data)? >= amount {
			return Ok(());
		}

		self.delivery
			.execute("Approve", &approve_max_call(token, spender))
			.await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use crate::contracts::{IERC20, IHoney};
	use crate::flows::fixtures::{uint_word, Harness, ONE_TOKEN};
	use agent_types::AccountState;
	use alloy::primitives::U256;
	use alloy::sol_types::SolCall;

	#[tokio::test(start_paused = true)]
	async fn test_mint_with_existing_allowance() {
		let harness = Harness::new();
		let collateral = harness.config.mint.collateral;
		harness.chain.set_call_response(collateral, IERC20::balanceOfCall::SELECTOR, uint_word(U256::from(ONE_TOKEN)));
		harness.chain.set_call_response(collateral, IERC20::allowanceCall::SELECTOR, uint_word(U256::MAX));
		harness.chain.push_receipt_status(1);
		let workflow = harness.workflow(AccountState::default());

		workflow.mint().await.unwrap();

		let simulated = harness.chain.simulated();
		assert_eq!(simulated.len(), 1);
		assert_eq!(simulated[0].to, harness.config.mint.honey);
		assert_eq!(&simulated[0].data[..4], &IHoney::mintCall::SELECTOR);
		assert!(workflow.state().await.mint);

		let allowance = harness
			.chain
			.calls()
			.into_iter()
			.find(|call| call.data.starts_with(&IERC20::allowanceCall::SELECTOR))
			.unwrap();
		assert_eq!(allowance.to, collateral);
		let query = IERC20::allowanceCall::abi_decode(&allowance.data).unwrap();
		assert_eq!(query.owner, workflow.address());
		assert_eq!(query.spender, harness.config.mint.honey);
	}

	#[tokio::test(start_paused = true)]
	async fn test_low_allowance_approves_first() {
		let harness = Harness::new();
		let collateral = harness.config.mint.collateral;
		harness.chain.set_call_response(collateral, IERC20::balanceOfCall::SELECTOR, uint_word(U256::from(ONE_TOKEN)));
		harness.chain.set_call_response(collateral, IERC20::allowanceCall::SELECTOR, uint_word(U256::ZERO));
		harness.chain.push_receipt_status(1);
		harness.chain.push_receipt_status(1);
		let workflow = harness.workflow(AccountState::default());

		workflow.mint().await.unwrap();

		let simulated = harness.chain.simulated();
		assert_eq!(simulated.len(), 2);
		assert_eq!(simulated[0].to, collateral);
		assert_eq!(&simulated[0].data[..4], &IERC20::approveCall::SELECTOR);
		assert_eq!(&simulated[1].data[..4], &IHoney::mintCall::SELECTOR);
	}

	#[tokio::test(start_paused = true)]
	async fn test_no_collateral_swaps_first() {
		let harness = Harness::new();
		let collateral = harness.config.mint.collateral;
		harness.chain.set_call_response(collateral, IERC20::balanceOfCall::SELECTOR, uint_word(U256::ZERO));
		harness.chain.set_call_response(collateral, IERC20::balanceOfCall::SELECTOR, uint_word(U256::from(ONE_TOKEN)));
		harness.chain.set_call_response(collateral, IERC20::allowanceCall::SELECTOR, uint_word(U256::MAX));
		harness.chain.push_balance(U256::from(ONE_TOKEN));
		harness.chain.push_receipt_status(1);
		harness.chain.push_receipt_status(1);
		let workflow = harness.workflow(AccountState::default());

		workflow.mint().await.unwrap();

		let simulated = harness.chain.simulated();
		assert_eq!(simulated.len(), 2);
		assert_eq!(simulated[0].to, harness.config.swap.router);
		assert_eq!(simulated[1].to, harness.config.mint.honey);
		let state = workflow.state().await;
		assert!(state.swap && state.mint);
	}

	#[tokio::test(start_paused = true)]
	async fn test_deterministic_revert_is_not_retried() {
		let harness = Harness::new();
		let collateral = harness.config.mint.collateral;
		harness.chain.set_call_response(collateral, IERC20::balanceOfCall::SELECTOR, uint_word(U256::from(ONE_TOKEN)));
		harness.chain.set_call_response(collateral, IERC20::allowanceCall::SELECTOR, uint_word(U256::MAX));
		harness.chain.set_gas_error("execution reverted: collateral paused");
		let workflow = harness.workflow(AccountState::default());

		let err = workflow.mint().await.unwrap_err();

		assert_eq!(
			err.to_string(),
			"Failed to mint: Tx simulation failed: execution reverted: collateral paused"
		);
		assert_eq!(harness.chain.simulated().len(), 1);
	}
}
