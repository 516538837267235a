//! DEX route API over HTTPS.

use crate::dex::RouteResponse;
use crate::{DexApi, FlowError, RouteStep};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER};
use std::time::Duration;

pub struct HttpDexApi {
	client: reqwest::Client,
	dex_url: String,
}

impl HttpDexApi {
	/// `app_url`, when set, is sent as the request origin.
	pub fn new(dex_url: &str, app_url: Option<&str>) -> Result<Self, FlowError> {
		let mut headers = HeaderMap::new();
		if let Some(app_url) = app_url {
			let origin = app_url.trim_end_matches('/');
			let origin_value = HeaderValue::from_str(origin)
				.map_err(|e| FlowError::Dex(format!("invalid app_url: {}", e)))?;
			let referer_value = HeaderValue::from_str(&format!("{}/", origin))
				.map_err(|e| FlowError::Dex(format!("invalid app_url: {}", e)))?;
			headers.insert(ORIGIN, origin_value);
			headers.insert(REFERER, referer_value);
		}

		let client = reqwest::Client::builder()
			.default_headers(headers)
			.timeout(Duration::from_secs(30))
			.build()
			.map_err(|e| FlowError::Dex(format!("Failed to build HTTP client: {}", e)))?;

		Ok(Self {
			client,
			dex_url: dex_url.trim_end_matches('/').to_string(),
		})
	}
}

#[async_trait]
impl DexApi for HttpDexApi {
	async fn route(
		&self,
		base_asset: Address,
		quote_asset: Address,
		amount: U256,
	) -> Result<Vec<RouteStep>, FlowError> {
		let url = format!("{}/dex/route", self.dex_url);
		let query = [
			("quoteAsset", quote_asset.to_string()),
			("baseAsset", base_asset.to_string()),
			("amount", amount.to_string()),
			("swap_type", "given_in".to_string()),
		];

		let response = self
			.client
			.get(&url)
			.query(&query)
			.send()
			.await
			.map_err(|e| FlowError::Dex(format!("route request failed: {}", e)))?;

		let status = response.status();
		if status != reqwest::StatusCode::OK {
			return Err(FlowError::Dex(format!("route returned {}", status)));
		}

		let route = response
			.json::<RouteResponse>()
			.await
			.map_err(|e| FlowError::InvalidResponse(format!("route response: {}", e)))?;
		Ok(route.steps)
	}
}
