//! Account workflows for the testnet agent.
//!
//! A workflow drives one funding account through the faucet drip, the native
//! to token swap and the stablecoin mint. Challenge solving comes from
//! `agent-captcha` and on-chain execution from `agent-delivery`; this crate
//! holds the flow logic plus the faucet and DEX HTTP clients.

use agent_captcha::CaptchaError;
use agent_delivery::DeliveryError;
use agent_types::Retryable;
use thiserror::Error;

pub mod amount;
pub mod contracts;
pub mod dex;
pub mod faucet;
pub mod flows;

pub mod implementations {
	pub mod dex;
	pub mod faucet;
}

pub use dex::{DexApi, RouteStep};
pub use faucet::{ClaimResponse, FaucetApi};
pub use flows::{AccountWorkflow, WorkflowServices};

/// Errors that can occur while running an account flow.
#[derive(Debug, Error)]
pub enum FlowError {
	#[error(transparent)]
	Captcha(#[from] CaptchaError),
	#[error(transparent)]
	Delivery(#[from] DeliveryError),
	#[error("Faucet error: {0}")]
	Faucet(String),
	#[error("DEX error: {0}")]
	Dex(String),
	#[error("Not enough {asset} balance: {balance}")]
	InsufficientBalance { asset: String, balance: String },
	#[error("Invalid amount: {0}")]
	Amount(String),
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
	/// A failed top-level action, named for the logs.
	#[error("Failed to {action}: {source}")]
	Action {
		action: &'static str,
		source: Box<FlowError>,
	},
}

impl FlowError {
	pub fn in_action(self, action: &'static str) -> Self {
		FlowError::Action {
			action,
			source: Box::new(self),
		}
	}
}

impl Retryable for FlowError {
	fn is_retryable(&self) -> bool {
		match self {
			FlowError::Captcha(e) => e.is_retryable(),
			FlowError::Delivery(e) => e.is_retryable(),
			FlowError::Action { source, .. } => source.is_retryable(),
			_ => true,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_action_wrapping() {
		let err = FlowError::InsufficientBalance {
			asset: "native".into(),
			balance: "0.001".into(),
		}
		.in_action("swap");
		assert_eq!(err.to_string(), "Failed to swap: Not enough native balance: 0.001");
	}

	#[test]
	fn test_retryability_follows_source() {
		let config = FlowError::from(CaptchaError::Configuration("none".into())).in_action("drip");
		assert!(!config.is_retryable());

		let revert = FlowError::from(DeliveryError::Simulation("execution reverted".into()));
		assert!(!revert.in_action("mint").is_retryable());

		assert!(FlowError::Faucet("rate limited".into()).is_retryable());
	}
}
