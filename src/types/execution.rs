//! Cycle execution types

use alloy::primitives::{Address, B256, U256};
use serde::Serialize;

/// Arguments of a swap-path execution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArbitrageParams {
    pub path: Vec<Address>,
    pub amount_in: U256,
    pub min_profit: U256,
}

/// What the environment reports back for a mined execution.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReceipt {
    pub gas_used: u64,
    pub success: bool,
    pub tx_hash: Option<B256>,
}

/// Before/after state of one cycle attempt, in minor units of the starting token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleResult {
    pub balance_before: U256,
    pub balance_after: Option<U256>,
    pub resource_used: Option<u64>,
    pub reverted: bool,
}

impl CycleResult {
    pub fn completed(balance_before: U256, balance_after: U256, resource_used: u64) -> Self {
        Self {
            balance_before,
            balance_after: Some(balance_after),
            resource_used: Some(resource_used),
            reverted: false,
        }
    }

    pub fn reverted(balance_before: U256) -> Self {
        Self {
            balance_before,
            balance_after: None,
            resource_used: None,
            reverted: true,
        }
    }
}
