//! Captcha vendor and task types.
//!
//! Vendors form a small closed set. Their differences (endpoint and whether a
//! proxied reCAPTCHA v3 task is accepted) live in a static table rather than in
//! per-vendor code paths.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Captcha solving vendors, listed in selection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptchaProvider {
	CapSolver,
	TwoCaptcha,
	CapMonster,
}

/// Static capabilities of a vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorProfile {
	pub provider: CaptchaProvider,
	pub name: &'static str,
	pub default_api_url: &'static str,
	/// Whether `RecaptchaV3Task` with proxy fields is accepted.
	pub proxied_v3: bool,
}

/// Vendor lookup table in priority order.
pub const VENDORS: [VendorProfile; 3] = [
	VendorProfile {
		provider: CaptchaProvider::CapSolver,
		name: "capsolver",
		default_api_url: "https://api.capsolver.com",
		proxied_v3: true,
	},
	VendorProfile {
		provider: CaptchaProvider::TwoCaptcha,
		name: "2captcha",
		default_api_url: "https://api.2captcha.com",
		proxied_v3: false,
	},
	VendorProfile {
		provider: CaptchaProvider::CapMonster,
		name: "capmonster",
		default_api_url: "https://api.capmonster.cloud",
		proxied_v3: false,
	},
];

impl CaptchaProvider {
	/// Vendors in the order they are considered by provider selection.
	pub fn by_priority() -> impl Iterator<Item = CaptchaProvider> {
		VENDORS.iter().map(|profile| profile.provider)
	}

	pub fn profile(&self) -> &'static VendorProfile {
		// VENDORS holds exactly one entry per variant.
		match self {
			CaptchaProvider::CapSolver => &VENDORS[0],
			CaptchaProvider::TwoCaptcha => &VENDORS[1],
			CaptchaProvider::CapMonster => &VENDORS[2],
		}
	}
}

impl fmt::Display for CaptchaProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.profile().name)
	}
}

/// Kind of challenge to solve.
///
/// Kinds only differ in payload shape and in whether proxy fields are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskKind {
	RecaptchaV2,
	RecaptchaV3 { page_action: String },
	RecaptchaV3Proxyless { page_action: String },
}

impl TaskKind {
	/// Vendor API task type name.
	pub fn task_type(&self) -> &'static str {
		match self {
			TaskKind::RecaptchaV2 => "RecaptchaV2Task",
			TaskKind::RecaptchaV3 { .. } => "RecaptchaV3Task",
			TaskKind::RecaptchaV3Proxyless { .. } => "RecaptchaV3TaskProxyless",
		}
	}

	pub fn is_proxyless(&self) -> bool {
		matches!(self, TaskKind::RecaptchaV3Proxyless { .. })
	}

	/// Returns the kind actually submitted to `provider`.
	///
	/// Vendors without proxied v3 support receive the proxyless variant even
	/// when the caller asked for the proxied one.
	pub fn effective_for(&self, provider: CaptchaProvider) -> TaskKind {
		match self {
			TaskKind::RecaptchaV3 { page_action } if !provider.profile().proxied_v3 => {
				TaskKind::RecaptchaV3Proxyless {
					page_action: page_action.clone(),
				}
			}
			other => other.clone(),
		}
	}
}

/// Lifecycle of a vendor task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
	Created,
	Processing,
	Ready,
	Failed,
}

/// A vendor-tracked unit of work for one solve call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptchaTask {
	pub provider: CaptchaProvider,
	pub task_id: String,
	pub status: TaskStatus,
	pub solution: Option<String>,
}

impl CaptchaTask {
	pub fn new(provider: CaptchaProvider, task_id: String) -> Self {
		Self {
			provider,
			task_id,
			status: TaskStatus::Created,
			solution: None,
		}
	}
}
