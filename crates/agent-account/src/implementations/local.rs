//! Local private-key account.

use crate::{AccountError, AccountInterface};
use agent_types::{SecretString, Transaction};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::{Ethereum, EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;

/// Account backed by an in-memory private key.
pub struct LocalAccount {
	address: Address,
	wallet: EthereumWallet,
}

impl LocalAccount {
	/// Parses a hex private key, with or without 0x prefix.
	pub fn from_secret(private_key: &SecretString) -> Result<Self, AccountError> {
		let signer: PrivateKeySigner = private_key.with_exposed(|key| {
			key.parse()
				.map_err(|_| AccountError::InvalidKey("Invalid private key format".to_string()))
		})?;

		Ok(Self {
			address: signer.address(),
			wallet: EthereumWallet::from(signer),
		})
	}
}

#[async_trait]
impl AccountInterface for LocalAccount {
	fn address(&self) -> Address {
		self.address
	}

	async fn sign_transaction(&self, tx: &Transaction) -> Result<Bytes, AccountError> {
		let request: TransactionRequest = tx.clone().into();

		let envelope =
			<TransactionRequest as TransactionBuilder<Ethereum>>::build(request, &self.wallet)
				.await
				.map_err(|e| AccountError::SigningFailed(e.to_string()))?;

		Ok(envelope.encoded_2718().into())
	}
}
