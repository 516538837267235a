//! Randomized amount selection.
//!
//! Amounts are a random share of a balance, rounded to a random number of
//! decimal places in token units, so repeated runs do not produce identical
//! transactions.

use crate::FlowError;
use alloy::primitives::U256;
use rand::Rng;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Decimals of the native currency and of the collateral token.
pub const TOKEN_DECIMALS: u32 = 18;

/// Picks a share of `balance` within `fraction`, rounded to `precision` places.
pub fn randomized_amount<R: Rng + ?Sized>(
	rng: &mut R,
	balance: U256,
	fraction: (f64, f64),
	precision: (u32, u32),
) -> Result<U256, FlowError> {
	let share = rng.gen_range(fraction.0..=fraction.1);
	let places = rng.gen_range(precision.0..=precision.1);
	scale_amount(balance, share, places)
}

/// `balance × share`, rounded half-to-even to `places` decimal token units.
///
/// The result never exceeds `balance` and is never zero.
pub fn scale_amount(balance: U256, share: f64, places: u32) -> Result<U256, FlowError> {
	let raw = u128::try_from(balance)
		.map_err(|_| FlowError::Amount(format!("balance {} is too large", balance)))?;
	let raw = i128::try_from(raw)
		.map_err(|_| FlowError::Amount(format!("balance {} is too large", balance)))?;
	let tokens = Decimal::try_from_i128_with_scale(raw, TOKEN_DECIMALS)
		.map_err(|e| FlowError::Amount(format!("balance {}: {}", balance, e)))?;
	let share = Decimal::from_f64(share)
		.ok_or_else(|| FlowError::Amount(format!("invalid share {}", share)))?;

	let amount = tokens
		.checked_mul(share)
		.ok_or_else(|| FlowError::Amount("amount overflow".into()))?
		.round_dp(places);
	let units = amount
		.checked_mul(Decimal::from(10u64.pow(TOKEN_DECIMALS)))
		.and_then(|units| units.trunc().to_u128())
		.ok_or_else(|| FlowError::Amount("amount overflow".into()))?;

	if units == 0 {
		return Err(FlowError::Amount(format!(
			"{} of {} rounds to zero at {} decimals",
			share, tokens, places
		)));
	}
	Ok(U256::from(units).min(balance))
}
