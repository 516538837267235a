//! String formatting utilities for logs and error messages.

use alloy::primitives::TxHash;

/// Truncates an identifier to its first 8 characters for display.
pub fn truncate_id(id: &str) -> String {
	match id.char_indices().nth(8) {
		Some((cut, _)) => format!("{}..", &id[..cut]),
		None => id.to_string(),
	}
}

/// Block explorer link for a transaction.
pub fn tx_link(explorer_url: &str, hash: &TxHash) -> String {
	format!("{}/tx/{}", explorer_url.trim_end_matches('/'), hash)
}

/// Formats a raw on-chain amount with `decimals` decimal places.
///
/// Trailing zeros of the fractional part are dropped: `1500000` with 6
/// decimals gives `"1.5"`.
pub fn format_token_amount(amount: &str, decimals: u8) -> String {
	if decimals == 0 {
		return amount.to_string();
	}

	let places = decimals as usize;
	let (integer_part, decimal_part) = if amount.len() <= places {
		("0".to_string(), format!("{:0>width$}", amount, width = places))
	} else {
		let split = amount.len() - places;
		(amount[..split].to_string(), amount[split..].to_string())
	};

	let decimal_trimmed = decimal_part.trim_end_matches('0');
	if decimal_trimmed.is_empty() {
		integer_part
	} else {
		format!("{}.{}", integer_part, decimal_trimmed)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_truncate_id() {
		assert_eq!(truncate_id("12345678"), "12345678");
		assert_eq!(truncate_id("0x1234567890abcdef"), "0x123456..");
	}

	#[test]
	fn test_truncate_id_multibyte() {
		assert_eq!(truncate_id("задача-123456"), "задача-1..");
		assert_eq!(truncate_id("ключ"), "ключ");
	}

	#[test]
	fn test_tx_link() {
		let hash = TxHash::repeat_byte(0x01);
		let link = tx_link("https://artio.beratrail.io/", &hash);
		assert!(link.starts_with("https://artio.beratrail.io/tx/0x0101"));
	}

	#[test]
	fn test_format_token_amount() {
		assert_eq!(format_token_amount("1000000000000000000", 18), "1");
		assert_eq!(format_token_amount("10000000000000000", 18), "0.01");
		assert_eq!(format_token_amount("1500000", 6), "1.5");
		assert_eq!(format_token_amount("42", 0), "42");
	}
}
