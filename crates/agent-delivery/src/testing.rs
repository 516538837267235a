//! Scripted in-memory chain and account for tests.
//!
//! Receipts are consumed in order and read as "not found" once the script is
//! exhausted. Balances and call responses repeat their last scripted value.

use crate::{ChainInterface, DeliveryError};
use agent_account::{AccountError, AccountInterface};
use agent_types::{ContractCall, Transaction, TransactionReceipt};
use alloy::primitives::{address, keccak256, Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub const MOCK_CHAIN_ID: u64 = 80085;

#[derive(Default)]
struct State {
	tip: u128,
	base_fee: u128,
	nonce: u64,
	gas: Option<Result<u64, String>>,
	broadcast_failures: u32,
	receipt_failures: u32,
	receipts: VecDeque<Option<u64>>,
	balances: VecDeque<U256>,
	call_responses: HashMap<(Address, [u8; 4]), VecDeque<Bytes>>,
	sent: Vec<Bytes>,
	simulated: Vec<Transaction>,
	calls: Vec<ContractCall>,
	nonce_queries: usize,
	receipt_queries: usize,
	balance_queries: usize,
}

fn next_repeating<T: Clone>(queue: &mut VecDeque<T>) -> Option<T> {
	if queue.len() > 1 {
		queue.pop_front()
	} else {
		queue.front().cloned()
	}
}

pub struct MockChain {
	state: Mutex<State>,
}

impl Default for MockChain {
	fn default() -> Self {
		Self::new()
	}
}

impl MockChain {
	pub fn new() -> Self {
		Self {
			state: Mutex::new(State {
				tip: 1_000_000_000,
				base_fee: 7,
				gas: Some(Ok(21_000)),
				..Default::default()
			}),
		}
	}

	pub fn set_fees(&self, tip: u128, base_fee: u128) {
		let mut state = self.state.lock().unwrap();
		state.tip = tip;
		state.base_fee = base_fee;
	}

	pub fn set_nonce(&self, nonce: u64) {
		self.state.lock().unwrap().nonce = nonce;
	}

	pub fn set_gas_estimate(&self, gas: u64) {
		self.state.lock().unwrap().gas = Some(Ok(gas));
	}

	pub fn set_gas_error(&self, message: &str) {
		self.state.lock().unwrap().gas = Some(Err(message.to_string()));
	}

	pub fn fail_next_broadcasts(&self, count: u32) {
		self.state.lock().unwrap().broadcast_failures = count;
	}

	pub fn fail_next_receipt(&self) {
		self.state.lock().unwrap().receipt_failures += 1;
	}

	/// Queues one receipt lookup result: `None` for not found, otherwise the status.
	pub fn push_receipt(&self, status: Option<u64>) {
		self.state.lock().unwrap().receipts.push_back(status);
	}

	pub fn push_receipt_status(&self, status: u64) {
		self.push_receipt(Some(status));
	}

	pub fn push_balance(&self, balance: U256) {
		self.state.lock().unwrap().balances.push_back(balance);
	}

	pub fn set_call_response(&self, to: Address, selector: [u8; 4], response: impl Into<Bytes>) {
		self.state
			.lock()
			.unwrap()
			.call_responses
			.entry((to, selector))
			.or_default()
			.push_back(response.into());
	}

	pub fn sent(&self) -> Vec<Bytes> {
		self.state.lock().unwrap().sent.clone()
	}

	pub fn simulated(&self) -> Vec<Transaction> {
		self.state.lock().unwrap().simulated.clone()
	}

	pub fn calls(&self) -> Vec<ContractCall> {
		self.state.lock().unwrap().calls.clone()
	}

	pub fn nonce_queries(&self) -> usize {
		self.state.lock().unwrap().nonce_queries
	}

	pub fn receipt_queries(&self) -> usize {
		self.state.lock().unwrap().receipt_queries
	}

	pub fn balance_queries(&self) -> usize {
		self.state.lock().unwrap().balance_queries
	}
}

#[async_trait]
impl ChainInterface for MockChain {
	fn chain_id(&self) -> u64 {
		MOCK_CHAIN_ID
	}

	async fn max_priority_fee(&self) -> Result<u128, DeliveryError> {
		Ok(self.state.lock().unwrap().tip)
	}

	async fn base_fee(&self) -> Result<u128, DeliveryError> {
		Ok(self.state.lock().unwrap().base_fee)
	}

	async fn get_nonce(&self, _address: Address) -> Result<u64, DeliveryError> {
		let mut state = self.state.lock().unwrap();
		state.nonce_queries += 1;
		Ok(state.nonce)
	}

	async fn estimate_gas(&self, tx: &Transaction) -> Result<u64, DeliveryError> {
		let mut state = self.state.lock().unwrap();
		state.simulated.push(tx.clone());
		match state.gas.clone() {
			Some(Ok(gas)) => Ok(gas),
			Some(Err(message)) => Err(DeliveryError::Simulation(message)),
			None => Ok(21_000),
		}
	}

	async fn send_raw_transaction(&self, raw: &Bytes) -> Result<TxHash, DeliveryError> {
		let mut state = self.state.lock().unwrap();
		if state.broadcast_failures > 0 {
			state.broadcast_failures -= 1;
			return Err(DeliveryError::Network("connection reset".into()));
		}
		state.sent.push(raw.clone());
		Ok(keccak256(raw))
	}

	async fn get_receipt(&self, hash: &TxHash) -> Result<Option<TransactionReceipt>, DeliveryError> {
		let mut state = self.state.lock().unwrap();
		state.receipt_queries += 1;
		if state.receipt_failures > 0 {
			state.receipt_failures -= 1;
			return Err(DeliveryError::Network("receipt lookup failed".into()));
		}
		Ok(state.receipts.pop_front().flatten().map(|status| TransactionReceipt {
			hash: *hash,
			block_number: 1,
			status,
		}))
	}

	async fn get_balance(&self, _address: Address) -> Result<U256, DeliveryError> {
		let mut state = self.state.lock().unwrap();
		state.balance_queries += 1;
		Ok(next_repeating(&mut state.balances).unwrap_or(U256::ZERO))
	}

	async fn call(&self, call: &ContractCall, _from: Address) -> Result<Bytes, DeliveryError> {
		let mut state = self.state.lock().unwrap();
		state.calls.push(call.clone());
		let selector: [u8; 4] = call
			.data
			.get(..4)
			.and_then(|s| s.try_into().ok())
			.unwrap_or_default();
		state
			.call_responses
			.get_mut(&(call.to, selector))
			.and_then(next_repeating)
			.ok_or_else(|| DeliveryError::Network(format!("no scripted response for {}", call.to)))
	}
}

/// Account that "signs" by concatenating the nonce and calldata.
pub struct MockAccount {
	address: Address,
}

impl Default for MockAccount {
	fn default() -> Self {
		Self {
			address: address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
		}
	}
}

#[async_trait]
impl AccountInterface for MockAccount {
	fn address(&self) -> Address {
		self.address
	}

	async fn sign_transaction(&self, tx: &Transaction) -> Result<Bytes, AccountError> {
		let mut raw = tx.nonce.to_be_bytes().to_vec();
		raw.extend_from_slice(&tx.data);
		raw.extend_from_slice(&tx.value.to_be_bytes::<32>());
		Ok(raw.into())
	}
}
