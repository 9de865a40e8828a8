//! Per-hop reserve provisioning from the real pool dataset

use alloy::primitives::U256;
use tracing::{debug, warn};
use crate::{
    environment::ExecutionEnvironment,
    errors::{AuditError, AuditResult},
    pools::PoolIndex,
    registry::TokenRegistry,
    types::TokenId,
    utils::math::normalize,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provisioned {
    /// Reserves were written, ordered as (from, to).
    Set { reserve_from: U256, reserve_to: U256 },
    /// No record for the pair; the environment keeps whatever it had.
    Skipped,
}

/// Mirrors real pool depth into the environment, one hop at a time.
pub struct ReserveSynthesizer<'a> {
    index: &'a PoolIndex,
    default_decimals: u8,
    strict: bool,
}

impl<'a> ReserveSynthesizer<'a> {
    pub fn new(index: &'a PoolIndex, default_decimals: u8, strict: bool) -> Self {
        Self {
            index,
            default_decimals,
            strict,
        }
    }

    /// Writes the reserves of the `from`/`to` pool. Both tokens must already be registered.
    ///
    /// A missing pool is skipped unless the synthesizer is strict, in which case it is
    /// reported as [`AuditError::PoolNotFound`].
    pub async fn provision<E: ExecutionEnvironment>(
        &self,
        env: &mut E,
        registry: &TokenRegistry,
        from: &TokenId,
        to: &TokenId,
    ) -> AuditResult<Provisioned> {
        let Some(pool) = self.index.find(from, to) else {
            if self.strict {
                return Err(AuditError::PoolNotFound {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
            warn!("No pool record for {} -> {}, leaving environment reserves as-is", from, to);
            return Ok(Provisioned::Skipped);
        };

        let oriented = pool.oriented(from, self.default_decimals);
        let reserve_from = normalize(oriented.reserve_in, oriented.decimals_in)?;
        let reserve_to = normalize(oriented.reserve_out, oriented.decimals_out)?;

        let token_from = registry.resolve(from)?;
        let token_to = registry.resolve(to)?;

        env.set_reserve(token_from, token_to, reserve_from, reserve_to).await?;
        debug!(
            "Provisioned {} ({} -> {}): {} / {}",
            pool.label(), from, to, reserve_from, reserve_to
        );

        Ok(Provisioned::Set { reserve_from, reserve_to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{environment::SimulatedEnvironment, types::PoolRecord};

    fn usdc_weth_index() -> PoolIndex {
        let pool: PoolRecord = serde_json::from_value(serde_json::json!({
            "token0": { "id": "0xusdc", "decimals": 6 },
            "token1": { "id": "0xweth" },
            "reserve0": "2000.5",
            "reserve1": "1.25",
        }))
        .unwrap();
        PoolIndex::new(vec![pool])
    }

    async fn registered(env: &mut SimulatedEnvironment, ids: &[&str]) -> TokenRegistry {
        let mut registry = TokenRegistry::new();
        for id in ids {
            registry.get_or_create(env, &TokenId::from(*id)).await.unwrap();
        }
        registry
    }

    #[tokio::test]
    async fn reversed_hop_swaps_reserves_and_decimals() {
        let index = usdc_weth_index();
        let mut env = SimulatedEnvironment::default();
        let registry = registered(&mut env, &["0xusdc", "0xweth"]).await;
        let synthesizer = ReserveSynthesizer::new(&index, 18, false);

        let weth = TokenId::from("0xweth");
        let usdc = TokenId::from("0xusdc");
        let outcome = synthesizer.provision(&mut env, &registry, &weth, &usdc).await.unwrap();

        let expected_weth = U256::from(1_250_000_000_000_000_000u128);
        let expected_usdc = U256::from(2_000_500_000u64);
        assert_eq!(
            outcome,
            Provisioned::Set { reserve_from: expected_weth, reserve_to: expected_usdc }
        );

        let weth_handle = registry.resolve(&weth).unwrap();
        let usdc_handle = registry.resolve(&usdc).unwrap();
        assert_eq!(env.reserves(weth_handle, usdc_handle), Some((expected_weth, expected_usdc)));
    }

    #[tokio::test]
    async fn missing_pool_is_skipped_when_lenient() {
        let index = usdc_weth_index();
        let mut env = SimulatedEnvironment::default();
        let registry = registered(&mut env, &["0xusdc", "0xdai"]).await;
        let synthesizer = ReserveSynthesizer::new(&index, 18, false);

        let outcome = synthesizer
            .provision(&mut env, &registry, &TokenId::from("0xusdc"), &TokenId::from("0xdai"))
            .await
            .unwrap();
        assert_eq!(outcome, Provisioned::Skipped);
        assert_eq!(env.calls().set_reserve, 0);
    }

    #[tokio::test]
    async fn missing_pool_fails_when_strict() {
        let index = usdc_weth_index();
        let mut env = SimulatedEnvironment::default();
        let registry = registered(&mut env, &["0xusdc", "0xdai"]).await;
        let synthesizer = ReserveSynthesizer::new(&index, 18, true);

        let err = synthesizer
            .provision(&mut env, &registry, &TokenId::from("0xusdc"), &TokenId::from("0xdai"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::PoolNotFound { .. }));
    }

    #[tokio::test]
    async fn unregistered_tokens_are_rejected() {
        let index = usdc_weth_index();
        let mut env = SimulatedEnvironment::default();
        let registry = TokenRegistry::new();
        let synthesizer = ReserveSynthesizer::new(&index, 18, false);

        let err = synthesizer
            .provision(&mut env, &registry, &TokenId::from("0xusdc"), &TokenId::from("0xweth"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::UnknownToken(_)));
    }
}
