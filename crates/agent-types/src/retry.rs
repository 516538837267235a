//! Bounded retry policy.
//!
//! Every network-facing operation of the agent runs inside [`RetryPolicy::run`].
//! The wrapped operation is re-invoked from scratch after a failure, without a
//! delay, until it succeeds or the attempt budget is spent. The policy does not
//! track partial external effects: callers are responsible for making the
//! wrapped operation safe to repeat.

use std::fmt::Display;
use std::future::Future;

/// Total attempts made by the default policy.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Errors that can declare themselves not worth retrying.
///
/// Errors are retryable unless they say otherwise.
pub trait Retryable {
	fn is_retryable(&self) -> bool {
		true
	}
}

/// Configuration for retry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	max_attempts: u32,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_attempts: DEFAULT_MAX_ATTEMPTS,
		}
	}
}

impl RetryPolicy {
	/// Creates a policy making at most `max_attempts` attempts (at least one).
	pub fn new(max_attempts: u32) -> Self {
		Self {
			max_attempts: max_attempts.max(1),
		}
	}

	/// A policy that runs the operation exactly once.
	pub fn once() -> Self {
		Self::new(1)
	}

	pub fn max_attempts(&self) -> u32 {
		self.max_attempts
	}

	/// Runs `operation` until it succeeds or attempts are exhausted.
	///
	/// Returns the first success. On exhaustion, or on an error that is not
	/// retryable, the most recent error is returned as is.
	pub async fn run<F, Fut, T, E>(&self, label: &str, mut operation: F) -> Result<T, E>
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<T, E>>,
		E: Retryable + Display,
	{
		let mut attempt = 0u32;

		loop {
			attempt += 1;

			match operation().await {
				Ok(value) => return Ok(value),
				Err(error) => {
					if !error.is_retryable() {
						tracing::debug!(label, attempt, error = %error, "Not retrying");
						return Err(error);
					}
					if attempt >= self.max_attempts {
						return Err(error);
					}
					tracing::warn!(
						label,
						attempt,
						max_attempts = self.max_attempts,
						error = %error,
						"Attempt failed, retrying"
					);
				}
			}
		}
	}
}
