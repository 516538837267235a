//! Account management for the testnet agent.
//!
//! An account owns one private key and produces signed raw transactions for
//! the delivery pipeline. Workflows only see the [`AccountInterface`] trait,
//! which keeps key handling out of the transaction engine.

use agent_types::{SecretString, Transaction};
use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;
use thiserror::Error;

pub mod implementations {
	pub mod local;
}

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// Error that occurs when signing operations fail.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	/// Error that occurs when a cryptographic key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
}

/// Interface for signing accounts.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// Address controlled by this account.
	fn address(&self) -> Address;

	/// Signs a fully populated transaction.
	///
	/// Returns the EIP-2718 encoded signed transaction, ready for broadcast.
	async fn sign_transaction(&self, tx: &Transaction) -> Result<Bytes, AccountError>;
}

/// Creates the account implementation for a private key.
pub fn create_account(private_key: &SecretString) -> Result<Box<dyn AccountInterface>, AccountError> {
	Ok(Box::new(implementations::local::LocalAccount::from_secret(
		private_key,
	)?))
}
