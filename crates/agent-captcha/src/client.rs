//! Challenge solving state machine.

use crate::{
	parse_proxy, select_provider, CaptchaApi, CaptchaError, CreateTaskRequest, TaskPayload,
	TaskResultRequest,
};
use agent_config::CaptchaConfig;
use agent_types::{truncate_id, CaptchaTask, RetryPolicy, TaskKind, TaskStatus};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

const POLL_INTERVAL_SECONDS: u64 = 10;
const MAX_WAIT_SECONDS: u64 = 180;
const V3_MIN_SCORE: f64 = 0.9;

/// One challenge to solve.
#[derive(Debug, Clone)]
pub struct ChallengeRequest {
	pub kind: TaskKind,
	pub website_url: String,
	pub website_key: String,
	/// Proxy URL the vendor should solve through, with or without scheme.
	pub proxy: Option<String>,
	/// Extra task properties passed through to the vendor unchanged.
	pub extra: Map<String, Value>,
}

impl ChallengeRequest {
	pub fn new(kind: TaskKind, website_url: impl Into<String>, website_key: impl Into<String>) -> Self {
		Self {
			kind,
			website_url: website_url.into(),
			website_key: website_key.into(),
			proxy: None,
			extra: Map::new(),
		}
	}

	pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
		self.proxy = proxy.filter(|p| !p.trim().is_empty());
		self
	}
}

/// Solves challenges with the first configured vendor.
pub struct CaptchaTaskClient {
	api: Arc<dyn CaptchaApi>,
	config: CaptchaConfig,
	retry: RetryPolicy,
}

impl CaptchaTaskClient {
	pub fn new(api: Arc<dyn CaptchaApi>, config: CaptchaConfig, retry: RetryPolicy) -> Self {
		Self { api, config, retry }
	}

	/// Builds the vendor task for `request` as sent to the selected vendor.
	pub fn build_payload(&self, request: &ChallengeRequest, kind: &TaskKind) -> Result<TaskPayload, CaptchaError> {
		let mut payload = TaskPayload {
			task_type: kind.task_type().to_string(),
			website_url: request.website_url.clone(),
			website_key: request.website_key.clone(),
			user_agent: None,
			page_action: None,
			min_score: None,
			proxy: None,
			extra: request.extra.clone(),
		};

		match kind {
			TaskKind::RecaptchaV2 => payload.user_agent = Some(self.config.user_agent.clone()),
			TaskKind::RecaptchaV3 { page_action } | TaskKind::RecaptchaV3Proxyless { page_action } => {
				payload.page_action = Some(page_action.clone());
				payload.min_score = Some(V3_MIN_SCORE);
			}
		}

		if let Some(proxy) = &request.proxy {
			if !kind.is_proxyless() {
				payload.proxy = Some(parse_proxy(proxy)?);
			}
		}

		Ok(payload)
	}

	/// Solves one challenge and returns the response token.
	#[instrument(skip_all, fields(site = %request.website_url))]
	pub async fn solve(&self, request: &ChallengeRequest) -> Result<String, CaptchaError> {
		let provider = select_provider(&self.config)?;
		let api_url = self.config.api_url(provider);
		let client_key = self
			.config
			.credential(provider)
			.api_key
			.expose_secret()
			.to_string();

		let kind = request.kind.effective_for(provider);
		let create = CreateTaskRequest {
			client_key: client_key.clone(),
			task: self.build_payload(request, &kind)?,
		};

		let task_id = self
			.retry
			.run("createTask", || self.create_task(&api_url, &create))
			.await?;
		let mut task = CaptchaTask::new(provider, task_id);

		tracing::info!(
			provider = %provider,
			task_type = kind.task_type(),
			task_id = %truncate_id(&task.task_id),
			"Created captcha task"
		);

		let poll = TaskResultRequest {
			client_key,
			task_id: task.task_id.clone(),
		};
		let mut waited = 0;

		while waited < MAX_WAIT_SECONDS {
			tokio::time::sleep(Duration::from_secs(POLL_INTERVAL_SECONDS)).await;
			waited += POLL_INTERVAL_SECONDS;

			let result = self.api.get_task_result(&api_url, &poll).await?;
			if let Some(err) = result.error() {
				task.status = TaskStatus::Failed;
				tracing::warn!(task_id = %truncate_id(&task.task_id), error = %err, "Captcha task failed");
				return Err(err);
			}

			if let Some(solution) = result.solution {
				task.status = TaskStatus::Ready;
				let token = solution.g_recaptcha_response.ok_or_else(|| {
					CaptchaError::InvalidResponse("solution has no gRecaptchaResponse".into())
				})?;
				tracing::info!(
					task_id = %truncate_id(&task.task_id),
					waited_seconds = waited,
					"Captcha solved"
				);
				task.solution = Some(token.clone());
				return Ok(token);
			}

			task.status = TaskStatus::Processing;
			tracing::debug!(task_id = %truncate_id(&task.task_id), status = ?result.status, "Captcha not ready");
		}

		Err(CaptchaError::Timeout {
			provider,
			task_id: task.task_id,
			seconds: MAX_WAIT_SECONDS,
		})
	}

	async fn create_task(&self, api_url: &str, request: &CreateTaskRequest) -> Result<String, CaptchaError> {
		self.api.create_task(api_url, request).await?.into_task_id()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::MockCaptchaApi;
	use crate::{CreateTaskResponse, TaskResultResponse};
	use agent_config::VendorCredential;
	use serde_json::json;

	fn config(capsolver: &str, two_captcha: &str) -> CaptchaConfig {
		CaptchaConfig {
			capsolver: VendorCredential {
				api_key: capsolver.into(),
				api_url: None,
			},
			two_captcha: VendorCredential {
				api_key: two_captcha.into(),
				api_url: Some("https://2captcha.test/".into()),
			},
			user_agent: "agent-ua".into(),
			..Default::default()
		}
	}

	fn client(api: Arc<MockCaptchaApi>, config: CaptchaConfig) -> CaptchaTaskClient {
		CaptchaTaskClient::new(api, config, RetryPolicy::default())
	}

	fn v3() -> ChallengeRequest {
		ChallengeRequest::new(
			TaskKind::RecaptchaV3 {
				page_action: "drip".into(),
			},
			"https://faucet.test",
			"site-key",
		)
		.with_proxy(Some("user:pw@10.0.0.1:8080".into()))
	}

	#[tokio::test(start_paused = true)]
	async fn test_create_then_three_polls() {
		let api = Arc::new(MockCaptchaApi::new());
		api.push_result(TaskResultResponse::processing());
		api.push_result(TaskResultResponse::processing());
		api.push_result(TaskResultResponse::ready("token-123"));

		let token = client(api.clone(), config("cs-key", ""))
			.solve(&v3())
			.await
			.unwrap();

		assert_eq!(token, "token-123");
		assert_eq!(api.create_calls(), 1);
		assert_eq!(api.result_calls(), 3);
	}

	#[tokio::test(start_paused = true)]
	async fn test_solution_ends_polling_regardless_of_status() {
		let api = Arc::new(MockCaptchaApi::new());
		let mut odd = TaskResultResponse::ready("early");
		odd.status = Some("processing".into());
		api.push_result(odd);

		let token = client(api.clone(), config("cs-key", ""))
			.solve(&v3())
			.await
			.unwrap();
		assert_eq!(token, "early");
		assert_eq!(api.result_calls(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn test_times_out_after_eighteen_polls() {
		let api = Arc::new(MockCaptchaApi::new());

		let err = client(api.clone(), config("cs-key", ""))
			.solve(&v3())
			.await
			.unwrap_err();

		assert!(matches!(err, CaptchaError::Timeout { seconds: 180, .. }));
		assert_eq!(api.result_calls(), 18);
	}

	#[tokio::test(start_paused = true)]
	async fn test_result_error_fails_immediately() {
		let api = Arc::new(MockCaptchaApi::new());
		api.push_result(TaskResultResponse {
			error_id: 12,
			error_code: Some("ERROR_CAPTCHA_UNSOLVABLE".into()),
			..Default::default()
		});

		let err = client(api.clone(), config("cs-key", ""))
			.solve(&v3())
			.await
			.unwrap_err();
		assert!(matches!(err, CaptchaError::Vendor { ref code, .. } if code == "ERROR_CAPTCHA_UNSOLVABLE"));
		assert_eq!(api.result_calls(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn test_create_task_is_retried() {
		let api = Arc::new(MockCaptchaApi::new());
		api.push_create(CreateTaskResponse {
			error_id: 1,
			error_code: Some("ERROR_NO_SLOT_AVAILABLE".into()),
			..Default::default()
		});
		api.push_result(TaskResultResponse::ready("t"));

		client(api.clone(), config("cs-key", ""))
			.solve(&v3())
			.await
			.unwrap();
		assert_eq!(api.create_calls(), 2);
	}

	#[tokio::test]
	async fn test_no_vendor_configured() {
		let api = Arc::new(MockCaptchaApi::new());
		let err = client(api.clone(), config("", "")).solve(&v3()).await.unwrap_err();

		assert!(matches!(err, CaptchaError::Configuration(_)));
		assert_eq!(api.create_calls(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn test_proxied_v3_payload_for_capsolver() {
		let api = Arc::new(MockCaptchaApi::new());
		api.push_result(TaskResultResponse::ready("t"));

		client(api.clone(), config("cs-key", "tc-key"))
			.solve(&v3())
			.await
			.unwrap();

		let (url, request) = api.last_create().unwrap();
		assert_eq!(url, "https://api.capsolver.com");
		let task = serde_json::to_value(&request.task).unwrap();
		assert_eq!(task["type"], json!("RecaptchaV3Task"));
		assert_eq!(task["pageAction"], json!("drip"));
		assert_eq!(task["minScore"], json!(0.9));
		assert_eq!(task["proxyAddress"], json!("10.0.0.1"));
		assert_eq!(task["proxyPort"], json!(8080));
		assert_eq!(request.client_key, "cs-key");
	}

	#[tokio::test(start_paused = true)]
	async fn test_v3_without_capability_is_proxyless() {
		let api = Arc::new(MockCaptchaApi::new());
		api.push_result(TaskResultResponse::ready("t"));

		client(api.clone(), config("", "tc-key"))
			.solve(&v3())
			.await
			.unwrap();

		let (url, request) = api.last_create().unwrap();
		assert_eq!(url, "https://2captcha.test");
		let task = serde_json::to_value(&request.task).unwrap();
		assert_eq!(task["type"], json!("RecaptchaV3TaskProxyless"));
		assert!(task.get("proxyType").is_none());
		assert!(task.get("proxyLogin").is_none());
	}

	#[test]
	fn test_v2_payload_carries_user_agent() {
		let api = Arc::new(MockCaptchaApi::new());
		let client = client(api, config("cs-key", ""));
		let mut request = ChallengeRequest::new(TaskKind::RecaptchaV2, "https://faucet.test", "k");
		request.extra.insert("isInvisible".into(), json!(true));

		let payload = client.build_payload(&request, &TaskKind::RecaptchaV2).unwrap();
		let task = serde_json::to_value(&payload).unwrap();

		assert_eq!(task["type"], json!("RecaptchaV2Task"));
		assert_eq!(task["userAgent"], json!("agent-ua"));
		assert_eq!(task["isInvisible"], json!(true));
		assert!(task.get("minScore").is_none());
	}
}
