//! Transaction lifecycle types.
//!
//! These types follow a transaction from the call descriptor a workflow wants
//! to execute, through the fully populated request and its broadcast hash, to
//! the classified receipt.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use serde::{Deserialize, Serialize};

/// Target contract call descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
	pub to: Address,
	pub data: Bytes,
	pub value: U256,
}

impl ContractCall {
	pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
		Self {
			to,
			data: data.into(),
			value: U256::ZERO,
		}
	}

	pub fn with_value(mut self, value: U256) -> Self {
		self.value = value;
		self
	}
}

/// EIP-1559 fee pair, derived fresh for every build attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
	pub priority_fee: u128,
	pub max_fee_per_gas: u128,
}

/// A fully populated transaction request.
///
/// A gas limit of zero is the placeholder used while the call is simulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
	pub chain_id: u64,
	pub from: Address,
	pub to: Address,
	pub data: Bytes,
	pub value: U256,
	pub nonce: u64,
	pub gas_limit: u64,
	pub max_fee_per_gas: u128,
	pub max_priority_fee_per_gas: u128,
}

impl From<Transaction> for TransactionRequest {
	fn from(tx: Transaction) -> Self {
		let mut request = TransactionRequest::default()
			.from(tx.from)
			.to(tx.to)
			.value(tx.value)
			.input(tx.data.into())
			.nonce(tx.nonce)
			.max_fee_per_gas(tx.max_fee_per_gas)
			.max_priority_fee_per_gas(tx.max_priority_fee_per_gas);
		request.chain_id = Some(tx.chain_id);
		if tx.gas_limit > 0 {
			request = request.gas_limit(tx.gas_limit);
		}
		request
	}
}

/// A broadcast transaction. The hash is its durable identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTransaction {
	pub hash: TxHash,
	pub request: Transaction,
}

/// Transaction receipt as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	pub hash: TxHash,
	pub block_number: u64,
	/// Raw status field; 1 means the transaction executed successfully.
	pub status: u64,
}

impl TransactionReceipt {
	pub fn success(&self) -> bool {
		self.status == 1
	}
}

/// Result of a single receipt poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptOutcome {
	NotYetMined,
	Success(TransactionReceipt),
	Reverted(TransactionReceipt),
}

impl ReceiptOutcome {
	/// Classifies an optional receipt purely by its status field.
	pub fn classify(receipt: Option<TransactionReceipt>) -> Self {
		match receipt {
			None => ReceiptOutcome::NotYetMined,
			Some(receipt) if receipt.success() => ReceiptOutcome::Success(receipt),
			Some(receipt) => ReceiptOutcome::Reverted(receipt),
		}
	}
}
