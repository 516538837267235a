//! JSON-RPC chain access over alloy.

use crate::{ChainInterface, DeliveryError};
use agent_types::{ContractCall, Transaction, TransactionReceipt};
use alloy::eips::BlockNumberOrTag;
use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use url::Url;

/// Chain access through an HTTP JSON-RPC endpoint.
pub struct AlloyChain {
	provider: DynProvider,
	chain_id: u64,
}

impl AlloyChain {
	pub fn new(rpc_url: &str, chain_id: u64) -> Result<Self, DeliveryError> {
		let url: Url = rpc_url
			.parse()
			.map_err(|e| DeliveryError::Network(format!("Invalid RPC URL {}: {}", rpc_url, e)))?;
		let provider = ProviderBuilder::new().connect_http(url).erased();

		Ok(Self { provider, chain_id })
	}
}

fn network_error(context: &str, e: impl std::fmt::Display) -> DeliveryError {
	DeliveryError::Network(format!("{}: {}", context, e))
}

#[async_trait]
impl ChainInterface for AlloyChain {
	fn chain_id(&self) -> u64 {
		self.chain_id
	}

	async fn max_priority_fee(&self) -> Result<u128, DeliveryError> {
		self.provider
			.get_max_priority_fee_per_gas()
			.await
			.map_err(|e| network_error("Failed to get priority fee", e))
	}

	async fn base_fee(&self) -> Result<u128, DeliveryError> {
		let block = self
			.provider
			.get_block_by_number(BlockNumberOrTag::Latest)
			.await
			.map_err(|e| network_error("Failed to get latest block", e))?
			.ok_or_else(|| DeliveryError::InvalidResponse("Latest block not available".into()))?;

		block
			.header
			.base_fee_per_gas
			.map(u128::from)
			.ok_or_else(|| DeliveryError::InvalidResponse("Latest block has no base fee".into()))
	}

	async fn get_nonce(&self, address: Address) -> Result<u64, DeliveryError> {
		self.provider
			.get_transaction_count(address)
			.latest()
			.await
			.map_err(|e| network_error("Failed to get nonce", e))
	}

	async fn estimate_gas(&self, tx: &Transaction) -> Result<u64, DeliveryError> {
		let request: TransactionRequest = tx.clone().into();
		self.provider
			.estimate_gas(request)
			.await
			.map_err(|e| DeliveryError::Simulation(e.to_string()))
	}

	async fn send_raw_transaction(&self, raw: &Bytes) -> Result<TxHash, DeliveryError> {
		let pending = self
			.provider
			.send_raw_transaction(raw.as_ref())
			.await
			.map_err(|e| network_error("Failed to send transaction", e))?;
		Ok(*pending.tx_hash())
	}

	async fn get_receipt(&self, hash: &TxHash) -> Result<Option<TransactionReceipt>, DeliveryError> {
		let receipt = self
			.provider
			.get_transaction_receipt(*hash)
			.await
			.map_err(|e| network_error("Failed to get receipt", e))?;

		Ok(receipt.map(|receipt| TransactionReceipt {
			hash: receipt.transaction_hash,
			block_number: receipt.block_number.unwrap_or_default(),
			status: u64::from(receipt.status()),
		}))
	}

	async fn get_balance(&self, address: Address) -> Result<U256, DeliveryError> {
		self.provider
			.get_balance(address)
			.await
			.map_err(|e| network_error("Failed to get balance", e))
	}

	async fn call(&self, call: &ContractCall, from: Address) -> Result<Bytes, DeliveryError> {
		let request = TransactionRequest::default()
			.from(from)
			.to(call.to)
			.value(call.value)
			.input(call.data.clone().into());

		self.provider
			.call(request)
			.await
			.map_err(|e| network_error("Contract call failed", e))
	}
}
