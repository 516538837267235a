//! Contract bindings and calldata helpers.

use crate::FlowError;
use agent_types::ContractCall;
use alloy::primitives::{Address, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

/// Swap kind where the input amount is fixed.
pub const SWAP_KIND_GIVEN_IN: u8 = 0;

/// Deadline passed to batch swaps.
pub const SWAP_DEADLINE: u64 = 99_999_999;

sol! {
	interface IERC20 {
		function balanceOf(address owner) external view returns (uint256);
		function allowance(address owner, address spender) external view returns (uint256);
		function approve(address spender, uint256 amount) external returns (bool);
	}

	/// One hop of a DEX batch swap. The zero address as `assetIn` means native currency.
	struct BatchSwapStep {
		address poolId;
		address assetIn;
		uint256 amountIn;
		address assetOut;
		uint256 amountOut;
		bytes userData;
	}

	interface IBexRouter {
		function batchSwap(uint8 kind, BatchSwapStep[] swaps, uint256 deadline)
			external
			payable
			returns (address[] assets, uint256[] amounts);
	}

	interface IHoney {
		function mint(address to, address collateral, uint256 amount) external returns (uint256);
	}
}

pub fn balance_of_call(token: Address, owner: Address) -> ContractCall {
	ContractCall::new(token, IERC20::balanceOfCall { owner }.abi_encode())
}

pub fn allowance_call(token: Address, owner: Address, spender: Address) -> ContractCall {
	ContractCall::new(token, IERC20::allowanceCall { owner, spender }.abi_encode())
}

/// Unlimited approval of `spender`.
pub fn approve_max_call(token: Address, spender: Address) -> ContractCall {
	ContractCall::new(
		token,
		IERC20::approveCall {
			spender,
			amount: U256::MAX,
		}
		.abi_encode(),
	)
}

/// Single-hop native-to-token swap paying `amount_in` as transaction value.
pub fn batch_swap_call(
	router: Address,
	pool: Address,
	amount_in: U256,
	asset_out: Address,
	min_amount_out: U256,
) -> ContractCall {
	let step = BatchSwapStep {
		poolId: pool,
		assetIn: Address::ZERO,
		amountIn: amount_in,
		assetOut: asset_out,
		amountOut: min_amount_out,
		userData: Default::default(),
	};
	let data = IBexRouter::batchSwapCall {
		kind: SWAP_KIND_GIVEN_IN,
		swaps: vec![step],
		deadline: U256::from(SWAP_DEADLINE),
	}
	.abi_encode();

	ContractCall::new(router, data).with_value(amount_in)
}

pub fn mint_call(honey: Address, to: Address, collateral: Address, amount: U256) -> ContractCall {
	ContractCall::new(
		honey,
		IHoney::mintCall {
			to,
			collateral,
			amount,
		}
		.abi_encode(),
	)
}

/// Reads a single `uint256` return value.
pub fn decode_uint(data: &[u8]) -> Result<U256, FlowError> {
	if data.len() < 32 {
		return Err(FlowError::InvalidResponse(format!(
			"expected a uint256 return value, got {} bytes",
			data.len()
		)));
	}
	Ok(U256::from_be_slice(&data[..32]))
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::primitives::address;

	const TOKEN: Address = address!("0x6581e59A1C8dA66eD0D313a0d4029DcE2F746Cc5");
	const OWNER: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

	#[test]
	fn test_balance_of_selector() {
		let call = balance_of_call(TOKEN, OWNER);
		assert_eq!(call.to, TOKEN);
		assert_eq!(&call.data[..4], &[0x70, 0xa0, 0x82, 0x31]);
		assert_eq!(call.data.len(), 36);
	}

	#[test]
	fn test_approve_is_unlimited() {
		let call = approve_max_call(TOKEN, OWNER);
		assert_eq!(&call.data[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
		assert!(call.data[36..68].iter().all(|b| *b == 0xff));
	}

	#[test]
	fn test_swap_carries_value() {
		let amount = U256::from(1_000u64);
		let call = batch_swap_call(OWNER, TOKEN, amount, TOKEN, U256::from(900u64));
		assert_eq!(call.value, amount);
		assert_eq!(&call.data[..4], &IBexRouter::batchSwapCall::SELECTOR);
	}

	#[test]
	fn test_decode_uint() {
		let mut data = vec![0u8; 32];
		data[31] = 42;
		assert_eq!(decode_uint(&data).unwrap(), U256::from(42));
		assert!(decode_uint(&data[..31]).is_err());
	}
}
