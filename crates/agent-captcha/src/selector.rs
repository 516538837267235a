//! Vendor selection.

use crate::CaptchaError;
use agent_config::CaptchaConfig;
use agent_types::CaptchaProvider;

/// Picks the highest-priority vendor that has a credential.
///
/// Called for every solve so a credential change takes effect on the next task.
pub fn select_provider(config: &CaptchaConfig) -> Result<CaptchaProvider, CaptchaError> {
	CaptchaProvider::by_priority()
		.find(|provider| config.credential(*provider).api_key.is_configured())
		.ok_or_else(|| CaptchaError::Configuration("no captcha vendor API key configured".into()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use agent_config::VendorCredential;

	fn credential(key: &str) -> VendorCredential {
		VendorCredential {
			api_key: key.into(),
			api_url: None,
		}
	}

	#[test]
	fn test_highest_priority_wins() {
		let config = CaptchaConfig {
			capsolver: credential("cs"),
			cap_monster: credential("cm"),
			..Default::default()
		};
		assert_eq!(select_provider(&config).unwrap(), CaptchaProvider::CapSolver);
	}

	#[test]
	fn test_falls_through_blank_keys() {
		let config = CaptchaConfig {
			capsolver: credential("  "),
			cap_monster: credential("cm"),
			..Default::default()
		};
		assert_eq!(select_provider(&config).unwrap(), CaptchaProvider::CapMonster);
	}

	#[test]
	fn test_none_configured() {
		let err = select_provider(&CaptchaConfig::default()).unwrap_err();
		assert!(matches!(err, CaptchaError::Configuration(_)));
	}
}
