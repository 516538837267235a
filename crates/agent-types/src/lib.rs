//! Common types module for the testnet agent.
//!
//! This module defines the data types shared by the captcha, delivery and
//! workflow crates. Keeping them in one place lets every crate agree on the
//! shape of a transaction, a receipt or a vendor without depending on each other.

/// Per-account progress records persisted between runs.
pub mod account;
/// Captcha vendor and task kind definitions.
pub mod captcha;
/// Transaction lifecycle types for blockchain interactions.
pub mod delivery;
/// Bounded retry policy shared by every network operation.
pub mod retry;
/// Zeroizing string wrapper for keys and API tokens.
pub mod secret_string;
/// Utility functions for formatting and timestamps.
pub mod utils;

pub use account::*;
pub use captcha::*;
pub use delivery::*;
pub use retry::{RetryPolicy, Retryable, DEFAULT_MAX_ATTEMPTS};
pub use secret_string::SecretString;
pub use utils::{current_timestamp, format_token_amount, truncate_id, tx_link};
