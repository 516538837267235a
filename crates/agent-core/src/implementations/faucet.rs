//! Faucet claims over HTTPS.

use crate::{ClaimResponse, FaucetApi, FlowError};
use agent_captcha::proxy::normalize_proxy_url;
use alloy::primitives::Address;
use async_trait::async_trait;
use std::time::Duration;

/// Faucet client for one account, sending through the account's proxy if any.
pub struct HttpFaucetApi {
	client: reqwest::Client,
	api_url: String,
}

impl HttpFaucetApi {
	pub fn new(api_url: &str, proxy: Option<&str>) -> Result<Self, FlowError> {
		let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(30));
		if let Some(proxy) = proxy {
			let proxy = reqwest::Proxy::all(normalize_proxy_url(proxy))
				.map_err(|e| FlowError::Faucet(format!("Invalid proxy: {}", e)))?;
			builder = builder.proxy(proxy);
		}
		let client = builder
			.build()
			.map_err(|e| FlowError::Faucet(format!("Failed to build HTTP client: {}", e)))?;

		Ok(Self {
			client,
			api_url: api_url.trim_end_matches('/').to_string(),
		})
	}
}

#[async_trait]
impl FaucetApi for HttpFaucetApi {
	async fn claim(&self, address: Address, token: &str) -> Result<ClaimResponse, FlowError> {
		let url = format!("{}/api/claim", self.api_url);
		let address = address.to_string();

		let response = self
			.client
			.post(&url)
			.query(&[("address", address.as_str())])
			.bearer_auth(token)
			.json(&serde_json::json!({ "address": address }))
			.send()
			.await
			.map_err(|e| FlowError::Faucet(format!("claim request failed: {}", e)))?;

		let status = response.status();
		if status != reqwest::StatusCode::OK {
			let body = response.text().await.unwrap_or_default();
			return Err(FlowError::Faucet(format!("claim returned {}: {}", status, body)));
		}

		response
			.json::<ClaimResponse>()
			.await
			.map_err(|e| FlowError::InvalidResponse(format!("claim response: {}", e)))
	}
}
