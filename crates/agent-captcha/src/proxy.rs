//! Proxy string handling.

use crate::{CaptchaError, ProxyFields};
use url::Url;

/// Adds the `http://` scheme to proxy strings written without one.
pub fn normalize_proxy_url(raw: &str) -> String {
	let raw = raw.trim();
	if raw.contains("://") {
		raw.to_string()
	} else {
		format!("http://{}", raw)
	}
}

/// Splits a proxy URL into the fields vendors expect.
pub fn parse_proxy(raw: &str) -> Result<ProxyFields, CaptchaError> {
	let url = Url::parse(&normalize_proxy_url(raw))
		.map_err(|e| CaptchaError::InvalidProxy(format!("{}: {}", redact(raw), e)))?;

	let host = url
		.host_str()
		.filter(|host| !host.is_empty())
		.ok_or_else(|| CaptchaError::InvalidProxy(format!("{}: missing host", redact(raw))))?;
	let port = url
		.port_or_known_default()
		.ok_or_else(|| CaptchaError::InvalidProxy(format!("{}: missing port", redact(raw))))?;

	Ok(ProxyFields {
		proxy_type: url.scheme().to_string(),
		proxy_address: host.to_string(),
		proxy_port: port,
		proxy_login: Some(url.username())
			.filter(|login| !login.is_empty())
			.map(str::to_string),
		proxy_password: url.password().map(str::to_string),
	})
}

/// Strips credentials from a proxy string for error messages.
fn redact(raw: &str) -> &str {
	raw.rsplit('@').next().unwrap_or(raw)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_scheme_is_added() {
		assert_eq!(normalize_proxy_url("1.2.3.4:8080"), "http://1.2.3.4:8080");
		assert_eq!(
			normalize_proxy_url("socks5://1.2.3.4:1080"),
			"socks5://1.2.3.4:1080"
		);
	}

	#[test]
	fn test_parse_with_credentials() {
		let fields = parse_proxy("user:secret@10.1.2.3:3128").unwrap();
		assert_eq!(fields.proxy_type, "http");
		assert_eq!(fields.proxy_address, "10.1.2.3");
		assert_eq!(fields.proxy_port, 3128);
		assert_eq!(fields.proxy_login.as_deref(), Some("user"));
		assert_eq!(fields.proxy_password.as_deref(), Some("secret"));
	}

	#[test]
	fn test_parse_without_credentials() {
		let fields = parse_proxy("socks5://proxy.local:1080").unwrap();
		assert_eq!(fields.proxy_type, "socks5");
		assert!(fields.proxy_login.is_none());
		assert!(fields.proxy_password.is_none());
	}

	#[test]
	fn test_invalid_proxy_hides_credentials() {
		let err = parse_proxy("user:secret@").unwrap_err();
		assert!(matches!(err, CaptchaError::InvalidProxy(_)));
		assert!(!err.to_string().contains("secret"));
	}
}
