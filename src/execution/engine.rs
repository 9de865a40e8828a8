//! Cycle execution against the environment

use alloy::primitives::{Address, U256};
use tracing::{debug, info, warn};
use crate::{
    environment::ExecutionEnvironment,
    errors::{AuditError, AuditResult},
    types::{ArbitrageParams, CycleResult},
};

/// Funds, approves and runs one swap path, capturing the operator's balance around it.
pub struct CycleExecutor;

impl CycleExecutor {
    /// Runs `path` with `amount_in` of its first token and a `min_profit` floor.
    ///
    /// A failed execution call is the expected outcome for cycles whose edge does not
    /// survive slippage and yields a reverted [`CycleResult`]. Failures while funding or
    /// reading balances are errors.
    pub async fn run<E: ExecutionEnvironment>(
        env: &mut E,
        path: &[Address],
        amount_in: U256,
        min_profit: U256,
    ) -> AuditResult<CycleResult> {
        let start = match path {
            [start, _, ..] => *start,
            _ => {
                return Err(AuditError::InvalidPath(format!(
                    "need at least 2 tokens, got {}",
                    path.len()
                )));
            }
        };

        let operator = env.operator();
        let executor = env.executor();

        env.mint(start, operator, amount_in).await?;
        env.approve(start, executor, amount_in).await?;

        let balance_before = env.balance_of(start, operator).await?;

        let params = ArbitrageParams {
            path: path.to_vec(),
            amount_in,
            min_profit,
        };

        info!("🚀 Executing {}-hop cycle with {} in", path.len() - 1, amount_in);
        let receipt = match env.execute_arbitrage(&params).await {
            Ok(receipt) if receipt.success => receipt,
            Ok(receipt) => {
                warn!("Execution mined but failed: {:?}", receipt.tx_hash);
                return Ok(CycleResult::reverted(balance_before));
            }
            Err(e) => {
                warn!("Execution reverted: {}", e);
                return Ok(CycleResult::reverted(balance_before));
            }
        };

        let balance_after = env.balance_of(start, operator).await?;
        debug!(
            "Cycle settled: before {}, after {}, gas {}",
            balance_before, balance_after, receipt.gas_used
        );

        Ok(CycleResult::completed(balance_before, balance_after, receipt.gas_used))
    }
}
