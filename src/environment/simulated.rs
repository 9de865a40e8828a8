//! In-memory constant-product environment

use alloy::primitives::{Address, U256, address, keccak256};
use std::collections::{HashMap, HashSet};
use tracing::debug;
use crate::{
    config::DEFAULT_SIMULATED_FEE_BPS,
    errors::{EnvResult, EnvironmentError},
    environment::ExecutionEnvironment,
    types::{ArbitrageParams, ExecutionReceipt},
};

// First default dev-node account
pub const SIMULATED_OPERATOR: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

const FEE_DENOMINATOR: u32 = 10_000;

/// Flat gas schedule: a base charge per execution plus one charge per hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasModel {
    pub base: u64,
    pub per_hop: u64,
}

impl Default for GasModel {
    fn default() -> Self {
        Self {
            base: 48_000,
            per_hop: 51_000,
        }
    }
}

impl GasModel {
    pub fn cost(&self, hops: usize) -> u64 {
        self.base + self.per_hop * hops as u64
    }
}

/// How many requests of each kind the environment has served.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub create_token: usize,
    pub set_reserve: usize,
    pub mint: usize,
    pub approve: usize,
    pub execute: usize,
    pub balance_of: usize,
}

type PairKey = (Address, Address);

pub struct SimulatedEnvironment {
    operator: Address,
    executor: Address,
    nonce: u64,
    fee_bps: u32,
    gas: GasModel,
    tokens: HashSet<Address>,
    balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    // Sorted pair -> (reserve of lower address, reserve of higher address)
    pools: HashMap<PairKey, (U256, U256)>,
    calls: CallCounts,
}

impl Default for SimulatedEnvironment {
    fn default() -> Self {
        Self::new(DEFAULT_SIMULATED_FEE_BPS)
    }
}

impl SimulatedEnvironment {
    pub fn new(fee_bps: u32) -> Self {
        let operator = SIMULATED_OPERATOR;
        Self {
            operator,
            executor: operator.create(0),
            nonce: 1,
            fee_bps: fee_bps.min(FEE_DENOMINATOR),
            gas: GasModel::default(),
            tokens: HashSet::new(),
            balances: HashMap::new(),
            allowances: HashMap::new(),
            pools: HashMap::new(),
            calls: CallCounts::default(),
        }
    }

    pub fn with_gas_model(mut self, gas: GasModel) -> Self {
        self.gas = gas;
        self
    }

    pub fn calls(&self) -> &CallCounts {
        &self.calls
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Current reserves of the pool, ordered as (`token_a`, `token_b`).
    pub fn reserves(&self, token_a: Address, token_b: Address) -> Option<(U256, U256)> {
        let (key, flipped) = pair_key(token_a, token_b);
        self.pools
            .get(&key)
            .map(|&(lo, hi)| if flipped { (hi, lo) } else { (lo, hi) })
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn ensure_token(&self, operation: &'static str, token: Address) -> EnvResult<()> {
        if self.tokens.contains(&token) {
            Ok(())
        } else {
            Err(EnvironmentError::MissingContract { operation, address: token })
        }
    }

    fn balance(&self, token: Address, account: Address) -> U256 {
        self.balances.get(&(token, account)).copied().unwrap_or_default()
    }

    fn amount_out(&self, amount_in: U256, reserve_in: U256, reserve_out: U256) -> Option<U256> {
        if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
            return None;
        }
        let with_fee = amount_in.checked_mul(U256::from(FEE_DENOMINATOR - self.fee_bps))?;
        let numerator = with_fee.checked_mul(reserve_out)?;
        let denominator = reserve_in
            .checked_mul(U256::from(FEE_DENOMINATOR))?
            .checked_add(with_fee)?;
        Some(numerator / denominator)
    }

    fn revert(reason: impl Into<String>) -> EnvironmentError {
        EnvironmentError::Reverted {
            operation: "executeArbitrage",
            reason: reason.into(),
        }
    }
}

fn pair_key(a: Address, b: Address) -> (PairKey, bool) {
    if a <= b { ((a, b), false) } else { ((b, a), true) }
}

impl ExecutionEnvironment for SimulatedEnvironment {
    fn name(&self) -> &str {
        "simulated"
    }

    fn operator(&self) -> Address {
        self.operator
    }

    fn executor(&self) -> Address {
        self.executor
    }

    async fn create_token(&mut self) -> EnvResult<Address> {
        self.calls.create_token += 1;
        let token = self.operator.create(self.nonce);
        self.nonce += 1;
        self.tokens.insert(token);
        debug!("Simulated token deployed at {}", token);
        Ok(token)
    }

    async fn set_reserve(
        &mut self,
        token_a: Address,
        token_b: Address,
        reserve_a: U256,
        reserve_b: U256,
    ) -> EnvResult<()> {
        self.calls.set_reserve += 1;
        self.ensure_token("setReserve", token_a)?;
        self.ensure_token("setReserve", token_b)?;
        let (key, flipped) = pair_key(token_a, token_b);
        let reserves = if flipped { (reserve_b, reserve_a) } else { (reserve_a, reserve_b) };
        self.pools.insert(key, reserves);
        Ok(())
    }

    async fn mint(&mut self, token: Address, account: Address, amount: U256) -> EnvResult<()> {
        self.calls.mint += 1;
        self.ensure_token("mint", token)?;
        let balance = self.balance(token, account);
        let updated = balance.checked_add(amount).ok_or_else(|| EnvironmentError::Reverted {
            operation: "mint",
            reason: "balance overflow".to_string(),
        })?;
        self.balances.insert((token, account), updated);
        Ok(())
    }

    async fn approve(&mut self, token: Address, spender: Address, amount: U256) -> EnvResult<()> {
        self.calls.approve += 1;
        self.ensure_token("approve", token)?;
        self.allowances.insert((token, self.operator, spender), amount);
        Ok(())
    }

    async fn execute_arbitrage(&mut self, params: &ArbitrageParams) -> EnvResult<ExecutionReceipt> {
        self.calls.execute += 1;

        let (start, end) = match (params.path.first(), params.path.last()) {
            (Some(&start), Some(&end)) if params.path.len() >= 2 => (start, end),
            _ => return Err(Self::revert("path too short")),
        };
        for &token in &params.path {
            self.ensure_token("executeArbitrage", token)?;
        }

        let owner = self.operator;
        let allowance = self.allowance(start, owner, self.executor);
        if allowance < params.amount_in {
            return Err(EnvironmentError::InsufficientAllowance { token: start, spender: self.executor });
        }
        if self.balance(start, owner) < params.amount_in {
            return Err(EnvironmentError::InsufficientBalance { token: start, account: owner });
        }

        // Price the whole path against scratch reserves; commit only if the floor holds.
        let mut scratch = self.pools.clone();
        let mut amount = params.amount_in;
        for hop in params.path.windows(2) {
            let (key, flipped) = pair_key(hop[0], hop[1]);
            let (lo, hi) = scratch.get(&key).copied().unwrap_or_default();
            let (reserve_in, reserve_out) = if flipped { (hi, lo) } else { (lo, hi) };

            let out = self
                .amount_out(amount, reserve_in, reserve_out)
                .filter(|out| !out.is_zero())
                .ok_or_else(|| Self::revert(format!("insufficient liquidity {} -> {}", hop[0], hop[1])))?;

            let updated_in = reserve_in + amount;
            let updated_out = reserve_out - out;
            let entry = if flipped { (updated_out, updated_in) } else { (updated_in, updated_out) };
            scratch.insert(key, entry);
            amount = out;
        }

        if amount < params.min_profit {
            return Err(Self::revert(format!(
                "output {} below floor {}",
                amount, params.min_profit
            )));
        }

        self.pools = scratch;
        self.allowances
            .insert((start, owner, self.executor), allowance - params.amount_in);
        let start_balance = self.balance(start, owner);
        self.balances.insert((start, owner), start_balance - params.amount_in);
        let end_balance = self.balance(end, owner);
        self.balances.insert((end, owner), end_balance.saturating_add(amount));

        let hops = params.path.len() - 1;
        let receipt = ExecutionReceipt {
            gas_used: self.gas.cost(hops),
            success: true,
            tx_hash: Some(keccak256((self.calls.execute as u64).to_be_bytes())),
        };
        debug!("Simulated execution: {} hops, out {}, gas {}", hops, amount, receipt.gas_used);
        Ok(receipt)
    }

    async fn balance_of(&self, token: Address, account: Address) -> EnvResult<U256> {
        self.ensure_token("balanceOf", token)?;
        Ok(self.balance(token, account))
    }
}
