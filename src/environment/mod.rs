//! Execution environments that cycles are replayed against
//!
//! The audit engine only talks to the [`ExecutionEnvironment`] capability set. Two adapters
//! are provided: an in-memory constant-product simulator and an RPC adapter that drives
//! mock router/executor contracts on a development node.

pub mod artifacts;
pub mod rpc;
pub mod simulated;

pub use rpc::*;
pub use simulated::*;

use alloy::primitives::{Address, U256};
use crate::{
    errors::EnvResult,
    types::{ArbitrageParams, ExecutionReceipt},
};

#[allow(async_fn_in_trait)]
pub trait ExecutionEnvironment {
    fn name(&self) -> &str;

    /// Account that is funded and sends every transaction.
    fn operator(&self) -> Address;

    /// Contract that runs swap paths and must be approved to pull the input amount.
    fn executor(&self) -> Address;

    async fn create_token(&mut self) -> EnvResult<Address>;

    async fn set_reserve(
        &mut self,
        token_a: Address,
        token_b: Address,
        reserve_a: U256,
        reserve_b: U256,
    ) -> EnvResult<()>;

    async fn mint(&mut self, token: Address, account: Address, amount: U256) -> EnvResult<()>;

    /// Approves `spender` to pull `amount` of `token` from the operator.
    async fn approve(&mut self, token: Address, spender: Address, amount: U256) -> EnvResult<()>;

    async fn execute_arbitrage(&mut self, params: &ArbitrageParams) -> EnvResult<ExecutionReceipt>;

    async fn balance_of(&self, token: Address, account: Address) -> EnvResult<U256>;
}
