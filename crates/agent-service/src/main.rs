//! Main entry point for the testnet agent.
//!
//! Loads the configuration and the account list, runs the configured actions
//! for every account with bounded concurrency, and saves each account's
//! progress for the next run.

use agent_account::create_account;
use agent_captcha::implementations::http::HttpCaptchaApi;
use agent_captcha::CaptchaTaskClient;
use agent_config::Config;
use agent_core::implementations::dex::HttpDexApi;
use agent_core::implementations::faucet::HttpFaucetApi;
use agent_core::{AccountWorkflow, WorkflowServices};
use agent_delivery::implementations::evm::alloy::AlloyChain;
use agent_delivery::ChainInterface;
use agent_types::{AccountRecord, RetryPolicy};
use clap::Parser;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;

mod state;

/// Command-line arguments for the agent.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let config = Arc::new(Config::from_file(&args.config).await?);
	tracing::info!("Loaded configuration [{}]", config.agent.id);

	let accounts = state::load_accounts(&config.agent.accounts_file).await?;
	let mut progress = state::load_state(&config.agent.state_file).await?;
	tracing::info!(accounts = accounts.len(), "Loaded accounts");

	let chain: Arc<dyn ChainInterface> = Arc::new(AlloyChain::new(
		&config.network.rpc_url,
		config.network.chain_id,
	)?);
	let captcha = Arc::new(CaptchaTaskClient::new(
		Arc::new(HttpCaptchaApi::new()?),
		config.captcha.clone(),
		RetryPolicy::default(),
	));
	let dex = Arc::new(HttpDexApi::new(
		&config.swap.dex_url,
		config.swap.app_url.as_deref(),
	)?);

	let mut workflows = Vec::with_capacity(accounts.len());
	for (index, record) in accounts.into_iter().enumerate() {
		let AccountRecord { private_key, proxy } = record;
		let account: Arc<dyn agent_account::AccountInterface> =
			Arc::from(create_account(&private_key)?);
		let address = account.address().to_string();
		let faucet = Arc::new(HttpFaucetApi::new(
			&config.faucet.api_url,
			proxy.as_deref(),
		)?);

		workflows.push((
			address.clone(),
			AccountWorkflow::new(
				(index + 1).to_string(),
				config.clone(),
				account,
				proxy,
				progress.remove(&address).unwrap_or_default(),
				WorkflowServices {
					chain: chain.clone(),
					captcha: captcha.clone(),
					faucet,
					dex: dex.clone(),
				},
			),
		));
	}

	let actions = config.agent.actions.clone();
	let results: Vec<_> = stream::iter(workflows)
		.map(|(address, workflow)| {
			let actions = &actions;
			async move {
				let failures = workflow.run(actions).await;
				let label = workflow.label().to_string();
				(address, label, failures.len(), workflow.into_state().await)
			}
		})
		.buffer_unordered(config.agent.concurrency)
		.collect()
		.await;

	let mut failed = 0;
	for (address, label, failures, account_state) in results {
		tracing::info!(
			account = %label,
			address = %address,
			failures,
			"{}",
			account_state.summary()
		);
		if failures > 0 {
			failed += 1;
		}
		progress.insert(address, account_state);
	}

	state::save_state(&config.agent.state_file, &progress).await?;
	tracing::info!(failed, "Finished run");
	Ok(())
}
