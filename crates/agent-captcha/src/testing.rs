//! Scripted vendor API for tests.
//!
//! `createTask` answers with a task id and `getTaskResult` with "processing"
//! unless a response was queued.

use crate::{
	CaptchaApi, CaptchaError, CreateTaskRequest, CreateTaskResponse, TaskResultRequest,
	TaskResultResponse,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Default)]
struct State {
	creates: VecDeque<CreateTaskResponse>,
	results: VecDeque<TaskResultResponse>,
	create_requests: Vec<(String, CreateTaskRequest)>,
	result_calls: usize,
}

#[derive(Default)]
pub struct MockCaptchaApi {
	state: Mutex<State>,
}

impl MockCaptchaApi {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push_create(&self, response: CreateTaskResponse) {
		self.state.lock().unwrap().creates.push_back(response);
	}

	pub fn push_result(&self, response: TaskResultResponse) {
		self.state.lock().unwrap().results.push_back(response);
	}

	pub fn create_calls(&self) -> usize {
		self.state.lock().unwrap().create_requests.len()
	}

	pub fn result_calls(&self) -> usize {
		self.state.lock().unwrap().result_calls
	}

	/// Vendor URL and body of the most recent `createTask`.
	pub fn last_create(&self) -> Option<(String, CreateTaskRequest)> {
		self.state.lock().unwrap().create_requests.last().cloned()
	}
}

#[async_trait]
impl CaptchaApi for MockCaptchaApi {
	async fn create_task(
		&self,
		api_url: &str,
		request: &CreateTaskRequest,
	) -> Result<CreateTaskResponse, CaptchaError> {
		let mut state = self.state.lock().unwrap();
		state
			.create_requests
			.push((api_url.to_string(), request.clone()));
		Ok(state.creates.pop_front().unwrap_or_else(|| CreateTaskResponse {
			task_id: Some("task-1".into()),
			..Default::default()
		}))
	}

	async fn get_task_result(
		&self,
		_api_url: &str,
		_request: &TaskResultRequest,
	) -> Result<TaskResultResponse, CaptchaError> {
		let mut state = self.state.lock().unwrap();
		state.result_calls += 1;
		Ok(state
			.results
			.pop_front()
			.unwrap_or_else(TaskResultResponse::processing))
	}
}
