//! Per-account workflow.
//!
//! Each top-level action runs under the retry policy and reports failures as
//! `Failed to <action>: <cause>`. Actions nest: a swap may drip first and a
//! mint may swap first, each nested action keeping its own retry budget.

use crate::contracts::{balance_of_call, decode_uint};
use crate::{DexApi, FaucetApi, FlowError};
use agent_account::AccountInterface;
use agent_captcha::CaptchaTaskClient;
use agent_config::{Action, Config};
use agent_delivery::{ChainInterface, DeliveryService, ReceiptPoller};
use agent_types::{format_token_amount, AccountState, RetryPolicy};
use alloy::primitives::{Address, U256};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::instrument;

mod drip;
mod mint;
mod swap;

#[cfg(test)]
pub(crate) mod fixtures;

/// Collaborators shared by the workflow of one account.
pub struct WorkflowServices {
	pub chain: Arc<dyn ChainInterface>,
	pub captcha: Arc<CaptchaTaskClient>,
	pub faucet: Arc<dyn FaucetApi>,
	pub dex: Arc<dyn DexApi>,
}

/// Drives one account through its configured actions.
pub struct AccountWorkflow {
	label: String,
	address: Address,
	proxy: Option<String>,
	config: Arc<Config>,
	chain: Arc<dyn ChainInterface>,
	captcha: Arc<CaptchaTaskClient>,
	faucet: Arc<dyn FaucetApi>,
	dex: Arc<dyn DexApi>,
	delivery: DeliveryService,
	retry: RetryPolicy,
	state: Mutex<AccountState>,
}

impl AccountWorkflow {
	pub fn new(
		label: impl Into<String>,
		config: Arc<Config>,
		account: Arc<dyn AccountInterface>,
		proxy: Option<String>,
		state: AccountState,
		services: WorkflowServices,
	) -> Self {
		let retry = RetryPolicy::default();
		let receipts = ReceiptPoller::new(
			services.chain.clone(),
			config.network.explorer_url.clone(),
			config.network.wait_tx_seconds,
			config.network.receipt_poll_seconds,
		);
		let delivery = DeliveryService::new(services.chain.clone(), account.clone(), receipts, retry)
			.with_pending(state.pending_txs.clone());

		Self {
			label: label.into(),
			address: account.address(),
			proxy: proxy.filter(|p| !p.trim().is_empty()),
			config,
			chain: services.chain,
			captcha: services.captcha,
			faucet: services.faucet,
			dex: services.dex,
			delivery,
			retry,
			state: Mutex::new(state),
		}
	}

	pub fn label(&self) -> &str {
		&self.label
	}

	pub fn address(&self) -> Address {
		self.address
	}

	pub async fn state(&self) -> AccountState {
		self.state.lock().await.clone()
	}

	/// Runs `actions` in order. A failed action is logged and the next one still runs.
	#[instrument(skip_all, fields(account = %self.label))]
	pub async fn run(&self, actions: &[Action]) -> Vec<FlowError> {
		let mut failures = Vec::new();
		for action in actions {
			let result = match action {
				Action::Drip => self.drip(self.config.faucet.wait_for_tokens).await,
				Action::Swap => self.swap().await.map(|_| ()),
				Action::Mint => self.mint().await.map(|_| ()),
			};
			if let Err(e) = result {
				tracing::error!(error = %e, "Action failed");
				failures.push(e);
			}
		}
		failures
	}

	/// Final state, including hashes still awaiting confirmation.
	pub async fn into_state(self) -> AccountState {
		let pending = self.delivery.pending_snapshot().await;
		let mut state = self.state.into_inner();
		state.pending_txs = pending;
		state
	}

	async fn token_balance(&self, token: Address) -> Result<U256, FlowError> {
		let data = self
			.chain
			.call(&balance_of_call(token, self.address), self.address)
			.await?;
		decode_uint(&data)
	}
}

fn display_amount(amount: U256) -> String {
	format_token_amount(&amount.to_string(), crate::amount::TOKEN_DECIMALS as u8)
}
