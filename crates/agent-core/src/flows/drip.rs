use super::{display_amount, AccountWorkflow};
use crate::FlowError;
use agent_captcha::ChallengeRequest;
use agent_types::current_timestamp;
use std::time::Duration;
use tracing::instrument;

/// Interval between balance checks while waiting for dripped tokens.
const TOKEN_POLL_SECONDS: u64 = 20;

impl AccountWorkflow {
	/// Requests native tokens from the faucet.
	///
	/// Skipped without any network call while the previous successful drip is
	/// within the cooldown window. With `wait_for_tokens`, the native balance is
	/// polled until it is positive or the transaction wait budget is spent.
	#[instrument(skip_all, fields(account = %self.label))]
	pub async fn drip(&self, wait_for_tokens: bool) -> Result<(), FlowError> {
		self.retry
			.run("drip", || self.try_drip(wait_for_tokens))
			.await
			.map_err(|e| e.in_action("drip"))
	}

	async fn try_drip(&self, wait_for_tokens: bool) -> Result<(), FlowError> {
		let faucet = &self.config.faucet;
		let last_drip = self.state.lock().await.last_drip_ts;
		if current_timestamp() < last_drip.saturating_add(faucet.cooldown_seconds) {
			tracing::info!(
				cooldown_seconds = faucet.cooldown_seconds,
				"Last drip is within the cooldown, not requesting more now"
			);
			return Ok(());
		}

		let challenge = ChallengeRequest::new(
			faucet.task.clone(),
			faucet.site_url.clone(),
			faucet.site_key.clone(),
		)
		.with_proxy(self.proxy.clone());
		let token = self.captcha.solve(&challenge).await?;

		let response = self.faucet.claim(self.address, &token).await?;
		if !response.is_success() {
			return Err(FlowError::Faucet(format!(
				"unexpected claim response: {}",
				response.msg
			)));
		}
		tracing::info!(message = %response.msg, "Drip done");

		{
			let mut state = self.state.lock().await;
			state.drip = true;
			state.last_drip_ts = current_timestamp();
		}

		if wait_for_tokens {
			self.wait_for_tokens().await?;
		}
		Ok(())
	}

	/// Polls the native balance until it is positive. Returns whether it became positive.
	async fn wait_for_tokens(&self) -> Result<bool, FlowError> {
		let budget = self.config.network.wait_tx_seconds;
		tracing::info!(budget_seconds = budget, "Waiting for tokens");

		let mut waited = 0;
		while waited < budget {
			tokio::time::sleep(Duration::from_secs(TOKEN_POLL_SECONDS)).await;
			waited += TOKEN_POLL_SECONDS;

			let balance = self.chain.get_balance(self.address).await?;
			if !balance.is_zero() {
				tracing::info!(balance = %display_amount(balance), "Tokens received");
				return Ok(true);
			}
			tracing::debug!(waited_seconds = waited, "Still zero tokens");
		}

		tracing::info!("Finished waiting for tokens");
		Ok(false)
	}
}
