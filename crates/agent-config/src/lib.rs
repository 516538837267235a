//! Configuration module for the testnet agent.
//!
//! Configuration is a single TOML file. `${VAR}` and `${VAR:-default}`
//! placeholders are substituted from the environment before parsing, so API
//! keys never need to be written to disk. The parsed [`Config`] is built once
//! at start-up and passed by reference to every component.

use agent_types::{CaptchaProvider, SecretString, TaskKind};
use alloy::primitives::Address;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message only, not the whole input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	pub agent: AgentConfig,
	pub network: NetworkConfig,
	#[serde(default)]
	pub captcha: CaptchaConfig,
	pub faucet: FaucetConfig,
	pub swap: SwapConfig,
	pub mint: MintConfig,
}

/// Actions an account can run, in the order they are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
	Drip,
	Swap,
	Mint,
}

/// Run-level settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
	pub id: String,
	/// JSON file with the account records (private key and proxy).
	pub accounts_file: PathBuf,
	/// JSON file where per-account progress is persisted.
	pub state_file: PathBuf,
	/// Number of accounts processed at the same time.
	#[serde(default = "default_concurrency")]
	pub concurrency: usize,
	#[serde(default = "default_actions")]
	pub actions: Vec<Action>,
}

fn default_concurrency() -> usize {
	1
}

fn default_actions() -> Vec<Action> {
	vec![Action::Drip, Action::Swap, Action::Mint]
}

/// Chain connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
	pub rpc_url: String,
	pub chain_id: u64,
	pub explorer_url: String,
	/// Wait budget for receipts and for faucet tokens to arrive.
	#[serde(default = "default_wait_tx_seconds")]
	pub wait_tx_seconds: u64,
	#[serde(default = "default_receipt_poll_seconds")]
	pub receipt_poll_seconds: u64,
}

fn default_wait_tx_seconds() -> u64 {
	180
}

fn default_receipt_poll_seconds() -> u64 {
	1
}

/// Credentials of a single captcha vendor. A blank key means "not configured".
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VendorCredential {
	#[serde(default)]
	pub api_key: SecretString,
	/// Overrides the vendor's public endpoint.
	#[serde(default)]
	pub api_url: Option<String>,
}

/// Captcha vendor credentials.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CaptchaConfig {
	#[serde(default)]
	pub capsolver: VendorCredential,
	#[serde(default)]
	pub two_captcha: VendorCredential,
	#[serde(default)]
	pub cap_monster: VendorCredential,
	/// User agent reported for reCAPTCHA v2 tasks.
	#[serde(default = "default_user_agent")]
	pub user_agent: String,
}

fn default_user_agent() -> String {
	"Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
	 Chrome/120.0.0.0 Safari/537.36"
		.to_string()
}

impl CaptchaConfig {
	pub fn credential(&self, provider: CaptchaProvider) -> &VendorCredential {
		match provider {
			CaptchaProvider::CapSolver => &self.capsolver,
			CaptchaProvider::TwoCaptcha => &self.two_captcha,
			CaptchaProvider::CapMonster => &self.cap_monster,
		}
	}

	/// Endpoint for `provider`, falling back to the vendor's public URL.
	pub fn api_url(&self, provider: CaptchaProvider) -> String {
		self.credential(provider)
			.api_url
			.clone()
			.unwrap_or_else(|| provider.profile().default_api_url.to_string())
			.trim_end_matches('/')
			.to_string()
	}
}

/// Faucet gate settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FaucetConfig {
	/// Faucet API base URL (`/api/claim` is appended).
	pub api_url: String,
	/// Page the challenge is shown on.
	pub site_url: String,
	pub site_key: String,
	#[serde(default = "default_faucet_task")]
	pub task: TaskKind,
	#[serde(default = "default_cooldown_seconds")]
	pub cooldown_seconds: u64,
	/// Wait for the dripped tokens to show up after a standalone drip.
	#[serde(default)]
	pub wait_for_tokens: bool,
}

fn default_faucet_task() -> TaskKind {
	TaskKind::RecaptchaV2
}

fn default_cooldown_seconds() -> u64 {
	1200
}

/// Native-to-token swap settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SwapConfig {
	/// DEX route API base URL.
	pub dex_url: String,
	/// DEX web app, sent as `Origin` and `Referer` on route requests.
	#[serde(default)]
	pub app_url: Option<String>,
	pub router: Address,
	pub pool: Address,
	pub wrapped_native: Address,
	/// Token received by the swap, later used as mint collateral.
	pub quote_token: Address,
	#[serde(default = "default_min_balance_wei")]
	pub min_balance_wei: u64,
	/// Share of the balance to swap, drawn uniformly from this range.
	#[serde(default = "default_swap_fraction")]
	pub fraction: (f64, f64),
	/// Decimal places the amount is rounded to, drawn uniformly (inclusive).
	#[serde(default = "default_swap_precision")]
	pub precision: (u32, u32),
}

fn default_min_balance_wei() -> u64 {
	10_000_000_000_000_000
}

fn default_swap_fraction() -> (f64, f64) {
	(0.1, 0.4)
}

fn default_swap_precision() -> (u32, u32) {
	(3, 4)
}

/// Stablecoin mint settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MintConfig {
	pub honey: Address,
	pub collateral: Address,
	#[serde(default = "default_mint_fraction")]
	pub fraction: (f64, f64),
	#[serde(default = "default_mint_precision")]
	pub precision: (u32, u32),
}

fn default_mint_fraction() -> (f64, f64) {
	(0.1, 0.9)
}

fn default_mint_precision() -> (u32, u32) {
	(0, 2)
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of `VAR_NAME`, or with `default` for
/// `${VAR_NAME:-default}` when the variable is unset. Input is capped at 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut resolved = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)))
				}
			},
		};

		resolved.push_str(&input[last_end..full_match.start()]);
		resolved.push_str(&value);
		last_end = full_match.end();
	}
	resolved.push_str(&input[last_end..]);

	Ok(resolved)
}

fn validate_fraction(section: &str, (min, max): (f64, f64)) -> Result<(), ConfigError> {
	if !(min > 0.0 && min <= max && max <= 1.0) {
		return Err(ConfigError::Validation(format!(
			"{}.fraction must satisfy 0 < min <= max <= 1, got [{}, {}]",
			section, min, max
		)));
	}
	Ok(())
}

fn validate_precision(section: &str, (min, max): (u32, u32)) -> Result<(), ConfigError> {
	if min > max || max > 18 {
		return Err(ConfigError::Validation(format!(
			"{}.precision must satisfy min <= max <= 18, got [{}, {}]",
			section, min, max
		)));
	}
	Ok(())
}

impl Config {
	/// Loads configuration from a file, resolving environment variables.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = tokio::fs::read_to_string(path.as_ref()).await?;
		content.parse()
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.agent.id.is_empty() {
			return Err(ConfigError::Validation("Agent ID cannot be empty".into()));
		}
		if self.agent.concurrency == 0 {
			return Err(ConfigError::Validation(
				"agent.concurrency must be at least 1".into(),
			));
		}

		if self.network.rpc_url.trim().is_empty() {
			return Err(ConfigError::Validation(
				"network.rpc_url cannot be empty".into(),
			));
		}
		if self.network.chain_id == 0 {
			return Err(ConfigError::Validation(
				"network.chain_id must be non-zero".into(),
			));
		}
		if self.network.wait_tx_seconds == 0 || self.network.receipt_poll_seconds == 0 {
			return Err(ConfigError::Validation(
				"network.wait_tx_seconds and network.receipt_poll_seconds must be positive".into(),
			));
		}

		if self.faucet.site_key.is_empty() {
			return Err(ConfigError::Validation(
				"faucet.site_key cannot be empty".into(),
			));
		}

		validate_fraction("swap", self.swap.fraction)?;
		validate_precision("swap", self.swap.precision)?;
		validate_fraction("mint", self.mint.fraction)?;
		validate_precision("mint", self.mint.precision)?;

		Ok(())
	}
}

/// Parses a TOML string: resolves environment variables, deserializes and validates.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	const BASE_CONFIG: &str = r#"
[agent]
id = "artio-runner"
accounts_file = "accounts.json"
state_file = "state.json"

[network]
rpc_url = "https://artio.rpc.berachain.com"
chain_id = 80085
explorer_url = "https://artio.beratrail.io"

[captcha.two_captcha]
api_key = "${TEST_TWO_CAPTCHA_KEY:-two-key}"

[faucet]
api_url = "https://artio-80085-faucet-api-cf.berachain.com"
site_url = "https://artio.faucet.berachain.com"
site_key = "6LfOA04pAAAAAL9ttkwIz40hC63_7IsaU2MgcwVH"

[swap]
dex_url = "https://artio-80085-dex-router.berachain.com"
router = "0x0d5862FDbdd12490f9b4De54c236cff63B038074"
pool = "0x36af4fbab8ebe58b4effe0cf7e4ef7e9c39a6ab3"
wrapped_native = "0x5806E416dA447b267cEA759358cF22Cc41FAE80F"
quote_token = "0x6581e59A1C8dA66eD0D313a0d4029DcE2F746Cc5"

[mint]
honey = "0x09ec711b81cD27A6466EC40960F2f8D85BB129D9"
collateral = "0x6581e59A1C8dA66eD0D313a0d4029DcE2F746Cc5"
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("TEST_AGENT_HOST", "localhost");
		std::env::set_var("TEST_AGENT_PORT", "8545");

		let result = resolve_env_vars("url = \"http://${TEST_AGENT_HOST}:${TEST_AGENT_PORT}\"");
		assert_eq!(result.unwrap(), "url = \"http://localhost:8545\"");

		std::env::remove_var("TEST_AGENT_HOST");
		std::env::remove_var("TEST_AGENT_PORT");
	}

	#[test]
	fn test_missing_env_var_error() {
		let result = resolve_env_vars("key = \"${TEST_AGENT_MISSING_VAR}\"");
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("TEST_AGENT_MISSING_VAR"));
	}

	#[test]
	fn test_defaults_applied() {
		let config: Config = BASE_CONFIG.parse().unwrap();

		assert_eq!(config.agent.concurrency, 1);
		assert_eq!(
			config.agent.actions,
			vec![Action::Drip, Action::Swap, Action::Mint]
		);
		assert_eq!(config.network.wait_tx_seconds, 180);
		assert_eq!(config.network.receipt_poll_seconds, 1);
		assert_eq!(config.faucet.cooldown_seconds, 1200);
		assert!(!config.faucet.wait_for_tokens);
		assert_eq!(config.faucet.task, TaskKind::RecaptchaV2);
		assert_eq!(config.swap.fraction, (0.1, 0.4));
		assert_eq!(config.swap.precision, (3, 4));
		assert_eq!(config.swap.min_balance_wei, 10_000_000_000_000_000);
		assert_eq!(config.mint.fraction, (0.1, 0.9));
		assert_eq!(config.mint.precision, (0, 2));
	}

	#[test]
	fn test_vendor_credentials() {
		let config: Config = BASE_CONFIG.parse().unwrap();

		assert!(!config
			.captcha
			.credential(CaptchaProvider::CapSolver)
			.api_key
			.is_configured());
		assert_eq!(
			config
				.captcha
				.credential(CaptchaProvider::TwoCaptcha)
				.api_key
				.expose_secret(),
			"two-key"
		);
		assert_eq!(
			config.captcha.api_url(CaptchaProvider::CapMonster),
			"https://api.capmonster.cloud"
		);
	}

	#[test]
	fn test_v3_task_kind() {
		let toml = BASE_CONFIG.replace(
			"[swap]",
			"[faucet.task]\nkind = \"recaptcha_v3\"\npage_action = \"drip\"\n\n[swap]",
		);
		let config: Config = toml.parse().unwrap();
		assert_eq!(
			config.faucet.task,
			TaskKind::RecaptchaV3 {
				page_action: "drip".into()
			}
		);
	}

	#[test]
	fn test_inverted_fraction_rejected() {
		let toml = BASE_CONFIG.replace(
			"[mint]",
			"fraction = [0.5, 0.2]\n\n[mint]",
		);
		let err = toml.parse::<Config>().unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
		assert!(err.to_string().contains("swap.fraction"));
	}

	#[test]
	fn test_empty_rpc_url_rejected() {
		let toml = BASE_CONFIG.replace("https://artio.rpc.berachain.com", "");
		assert!(matches!(
			toml.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));
	}

	#[tokio::test]
	async fn test_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(BASE_CONFIG.as_bytes()).unwrap();

		let config = Config::from_file(file.path()).await.unwrap();
		assert_eq!(config.agent.id, "artio-runner");
		assert_eq!(config.network.chain_id, 80085);
	}

	#[test]
	fn test_example_config_parses() {
		let config: Config = include_str!("../../../config/example.toml").parse().unwrap();

		assert_eq!(config.agent.concurrency, 2);
		assert_eq!(config.swap.app_url.as_deref(), Some("https://artio.bex.berachain.com"));
		assert_eq!(config.mint.precision, (0, 2));
	}
}
