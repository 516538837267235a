//! Vendor API over HTTPS.

use crate::{
	CaptchaApi, CaptchaError, CreateTaskRequest, CreateTaskResponse, TaskResultRequest,
	TaskResultResponse,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// `createTask` / `getTaskResult` client shared by all vendors.
pub struct HttpCaptchaApi {
	client: reqwest::Client,
}

impl HttpCaptchaApi {
	pub fn new() -> Result<Self, CaptchaError> {
		let client = reqwest::Client::builder()
			.pool_idle_timeout(Duration::from_secs(90))
			.timeout(Duration::from_secs(30))
			.build()
			.map_err(|e| CaptchaError::Network(format!("Failed to build HTTP client: {}", e)))?;
		Ok(Self { client })
	}

	async fn post<B, R>(&self, url: String, body: &B) -> Result<R, CaptchaError>
	where
		B: Serialize + Sync,
		R: DeserializeOwned,
	{
		let response = self
			.client
			.post(&url)
			.json(body)
			.send()
			.await
			.map_err(|e| CaptchaError::Network(format!("{}: {}", url, e)))?;

		let status = response.status();
		if !status.is_success() {
			return Err(CaptchaError::Network(format!("{} returned {}", url, status)));
		}

		response
			.json::<R>()
			.await
			.map_err(|e| CaptchaError::InvalidResponse(format!("{}: {}", url, e)))
	}
}

#[async_trait]
impl CaptchaApi for HttpCaptchaApi {
	async fn create_task(
		&self,
		api_url: &str,
		request: &CreateTaskRequest,
	) -> Result<CreateTaskResponse, CaptchaError> {
		self.post(format!("{}/createTask", api_url), request).await
	}

	async fn get_task_result(
		&self,
		api_url: &str,
		request: &TaskResultRequest,
	) -> Result<TaskResultResponse, CaptchaError> {
		self.post(format!("{}/getTaskResult", api_url), request)
			.await
	}
}
