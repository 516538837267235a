//! Captcha solving through third-party vendor APIs.
//!
//! All supported vendors speak the same two-call protocol: `createTask`
//! registers a challenge and `getTaskResult` is polled until a token is
//! available. Vendor differences are data in `agent_types::VENDORS`.

use agent_types::{CaptchaProvider, Retryable};
use async_trait::async_trait;
use thiserror::Error;

pub mod client;
pub mod proxy;
pub mod selector;
pub mod types;

pub mod implementations {
	pub mod http;
}

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{CaptchaTaskClient, ChallengeRequest};
pub use proxy::parse_proxy;
pub use selector::select_provider;
pub use types::{
	CreateTaskRequest, CreateTaskResponse, ProxyFields, Solution, TaskPayload, TaskResultRequest,
	TaskResultResponse,
};

/// Errors that can occur while solving a challenge.
#[derive(Debug, Error)]
pub enum CaptchaError {
	/// No vendor has a credential configured.
	#[error("Configuration error: {0}")]
	Configuration(String),
	/// The vendor answered with a non-zero `errorId`.
	#[error("Captcha vendor error {code}: {description}")]
	Vendor { code: String, description: String },
	/// No solution within the polling budget.
	#[error("Captcha task {task_id} at {provider} not solved within {seconds}s")]
	Timeout {
		provider: CaptchaProvider,
		task_id: String,
		seconds: u64,
	},
	#[error("Network error: {0}")]
	Network(String),
	#[error("Invalid proxy: {0}")]
	InvalidProxy(String),
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
}

impl Retryable for CaptchaError {
	fn is_retryable(&self) -> bool {
		!matches!(
			self,
			CaptchaError::Configuration(_) | CaptchaError::InvalidProxy(_)
		)
	}
}

/// Vendor task API.
///
/// `api_url` is the vendor base URL without a trailing slash.
#[async_trait]
pub trait CaptchaApi: Send + Sync {
	async fn create_task(
		&self,
		api_url: &str,
		request: &CreateTaskRequest,
	) -> Result<CreateTaskResponse, CaptchaError>;

	async fn get_task_result(
		&self,
		api_url: &str,
		request: &TaskResultRequest,
	) -> Result<TaskResultResponse, CaptchaError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_retryable_classification() {
		assert!(!CaptchaError::Configuration("none".into()).is_retryable());
		assert!(!CaptchaError::InvalidProxy("bad".into()).is_retryable());
		assert!(CaptchaError::Network("reset".into()).is_retryable());
		assert!(CaptchaError::Vendor {
			code: "ERROR_NO_SLOT_AVAILABLE".into(),
			description: "busy".into()
		}
		.is_retryable());
	}
}
