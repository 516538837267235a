//! Shared test harness for the account flows.

use super::{AccountWorkflow, WorkflowServices};
use crate::{ClaimResponse, DexApi, FaucetApi, FlowError, RouteStep};
use agent_captcha::testing::MockCaptchaApi;
use agent_captcha::{CaptchaTaskClient, TaskResultResponse};
use agent_config::Config;
use agent_delivery::testing::{MockAccount, MockChain};
use agent_types::{AccountState, RetryPolicy};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};

pub const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

const CONFIG: &str = r#"
[agent]
id = "flow-tests"
accounts_file = "accounts.json"
state_file = "state.json"

[network]
rpc_url = "http://localhost:8545"
chain_id = 80085
explorer_url = "https://artio.beratrail.io"

[captcha.capsolver]
api_key = "cs-key"

[faucet]
api_url = "https://faucet.test"
site_url = "https://artio.faucet.berachain.com"
site_key = "site-key"

[swap]
dex_url = "https://dex.test"
router = "0x0d5862FDbdd12490f9b4De54c236cff63B038074"
pool = "0x7D5b5C1937ff1b18B45AbC64aeAB68663a7a58Ab"
wrapped_native = "0x5806E416dA447b267cEA759358cF22Cc41FAE80F"
quote_token = "0x6581e59A1C8dA66eD0D313a0d4029DcE2F746Cc5"

[mint]
honey = "0x09ec711b81cD27A6466EC40960F2f8D85BB129D9"
collateral = "0x6581e59A1C8dA66eD0D313a0d4029DcE2F746Cc5"
"#;

/// ABI word for a `uint256` return value.
pub fn uint_word(value: U256) -> Vec<u8> {
	value.to_be_bytes::<32>().to_vec()
}

pub struct MockFaucet {
	message: Mutex<String>,
	tokens: Mutex<Vec<String>>,
}

impl MockFaucet {
	pub fn respond_with(&self, message: &str) {
		*self.message.lock().unwrap() = message.to_string();
	}

	pub fn claims(&self) -> usize {
		self.tokens.lock().unwrap().len()
	}

	pub fn last_token(&self) -> Option<String> {
		self.tokens.lock().unwrap().last().cloned()
	}
}

#[async_trait]
impl FaucetApi for MockFaucet {
	async fn claim(&self, _address: Address, token: &str) -> Result<ClaimResponse, FlowError> {
		self.tokens.lock().unwrap().push(token.to_string());
		Ok(ClaimResponse {
			msg: self.message.lock().unwrap().clone(),
		})
	}
}

pub struct MockDex {
	amount_out: Mutex<String>,
	routes: Mutex<Vec<(Address, Address, U256)>>,
}

impl MockDex {
	pub fn set_amount_out(&self, amount: &str) {
		*self.amount_out.lock().unwrap() = amount.to_string();
	}

	pub fn routes(&self) -> Vec<(Address, Address, U256)> {
		self.routes.lock().unwrap().clone()
	}
}

#[async_trait]
impl DexApi for MockDex {
	async fn route(
		&self,
		base_asset: Address,
		quote_asset: Address,
		amount: U256,
	) -> Result<Vec<RouteStep>, FlowError> {
		self.routes
			.lock()
			.unwrap()
			.push((base_asset, quote_asset, amount));
		Ok(vec![RouteStep {
			amount_out: json!(self.amount_out.lock().unwrap().clone()),
		}])
	}
}

pub struct Harness {
	pub config: Arc<Config>,
	pub chain: Arc<MockChain>,
	pub captcha: Arc<MockCaptchaApi>,
	pub faucet: Arc<MockFaucet>,
	pub dex: Arc<MockDex>,
}

impl Harness {
	pub fn new() -> Self {
		let captcha = Arc::new(MockCaptchaApi::new());
		for _ in 0..10 {
			captcha.push_result(TaskResultResponse::ready("captcha-token"));
		}

		Self {
			config: Arc::new(CONFIG.parse().unwrap()),
			chain: Arc::new(MockChain::new()),
			captcha,
			faucet: Arc::new(MockFaucet {
				message: Mutex::new("Txhash: 0x5b7e".into()),
				tokens: Mutex::new(Vec::new()),
			}),
			dex: Arc::new(MockDex {
				amount_out: Mutex::new("1000".into()),
				routes: Mutex::new(Vec::new()),
			}),
		}
	}

	pub fn workflow(&self, state: AccountState) -> AccountWorkflow {
		let captcha = CaptchaTaskClient::new(
			self.captcha.clone(),
			self.config.captcha.clone(),
			RetryPolicy::default(),
		);

		AccountWorkflow::new(
			"1",
			self.config.clone(),
			Arc::new(MockAccount::default()),
			Some("user:pw@10.0.0.1:8080".into()),
			state,
			WorkflowServices {
				chain: self.chain.clone(),
				captcha: Arc::new(captcha),
				faucet: self.faucet.clone(),
				dex: self.dex.clone(),
			},
		)
	}
}
