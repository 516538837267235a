//! DEX route quoting.

use crate::FlowError;
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct RouteStep {
	/// Integer amount, sent as a string or a number depending on the route size.
	#[serde(rename = "amountOut")]
	pub amount_out: Value,
}

impl RouteStep {
	pub fn amount_out(&self) -> Result<U256, FlowError> {
		let text = match &self.amount_out {
			Value::String(text) => text.clone(),
			Value::Number(number) => number.to_string(),
			other => return Err(FlowError::Dex(format!("invalid amountOut: {}", other))),
		};
		U256::from_str(&text).map_err(|e| FlowError::Dex(format!("invalid amountOut {}: {}", text, e)))
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteResponse {
	#[serde(default)]
	pub steps: Vec<RouteStep>,
}

/// Route quotes for a given-in swap of `amount` base asset into quote asset.
#[async_trait]
pub trait DexApi: Send + Sync {
	async fn route(
		&self,
		base_asset: Address,
		quote_asset: Address,
		amount: U256,
	) -> Result<Vec<RouteStep>, FlowError>;
}

/// Minimum accepted output: 90% of the last hop's quoted output.
pub fn min_amount_out(steps: &[RouteStep]) -> Result<U256, FlowError> {
	let last = steps
		.last()
		.ok_or_else(|| FlowError::Dex("route has no steps".into()))?;
	last.amount_out()?
		.checked_mul(U256::from(9))
		.map(|scaled| scaled / U256::from(10))
		.ok_or_else(|| FlowError::Dex("route amountOut overflows".into()))
}
