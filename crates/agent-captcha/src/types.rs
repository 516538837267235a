//! Vendor wire format.

use crate::CaptchaError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Proxy fields attached to proxied tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyFields {
	pub proxy_type: String,
	pub proxy_address: String,
	pub proxy_port: u16,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub proxy_login: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub proxy_password: Option<String>,
}

/// The `task` object of a `createTask` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
	#[serde(rename = "type")]
	pub task_type: String,
	#[serde(rename = "websiteURL")]
	pub website_url: String,
	pub website_key: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user_agent: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page_action: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min_score: Option<f64>,
	#[serde(flatten)]
	pub proxy: Option<ProxyFields>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
	pub client_key: String,
	pub task: TaskPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskResponse {
	#[serde(default)]
	pub error_id: u32,
	/// Numeric for some vendors, a string for others.
	#[serde(default)]
	pub task_id: Option<Value>,
	#[serde(default)]
	pub error_code: Option<String>,
	#[serde(default)]
	pub error_description: Option<String>,
}

impl CreateTaskResponse {
	/// Returns the task id, or the vendor error the response reports.
	pub fn into_task_id(self) -> Result<String, CaptchaError> {
		if self.error_id != 0 {
			return Err(vendor_error(self.error_code, self.error_description));
		}
		match self.task_id {
			Some(Value::String(id)) if !id.is_empty() => Ok(id),
			Some(Value::Number(id)) => Ok(id.to_string()),
			_ => Err(CaptchaError::InvalidResponse(
				"createTask response has no taskId".into(),
			)),
		}
	}
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResultRequest {
	pub client_key: String,
	pub task_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
	#[serde(default)]
	pub g_recaptcha_response: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResultResponse {
	#[serde(default)]
	pub error_id: u32,
	#[serde(default)]
	pub error_code: Option<String>,
	#[serde(default)]
	pub error_description: Option<String>,
	#[serde(default)]
	pub status: Option<String>,
	#[serde(default)]
	pub solution: Option<Solution>,
}

impl TaskResultResponse {
	pub fn processing() -> Self {
		Self {
			status: Some("processing".into()),
			..Default::default()
		}
	}

	pub fn ready(token: &str) -> Self {
		Self {
			status: Some("ready".into()),
			solution: Some(Solution {
				g_recaptcha_response: Some(token.to_string()),
			}),
			..Default::default()
		}
	}

	pub fn error(&self) -> Option<CaptchaError> {
		(self.error_id != 0)
			.then(|| vendor_error(self.error_code.clone(), self.error_description.clone()))
	}
}

fn vendor_error(code: Option<String>, description: Option<String>) -> CaptchaError {
	CaptchaError::Vendor {
		code: code.unwrap_or_else(|| "UNKNOWN".into()),
		description: description.unwrap_or_default(),
	}
}
