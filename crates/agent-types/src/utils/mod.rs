//! Utility functions for formatting and time.

pub mod formatting;
pub mod helpers;

pub use formatting::{format_token_amount, truncate_id, tx_link};
pub use helpers::current_timestamp;
