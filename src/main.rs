//! Cycle Auditor - Main Entry Point
//!
//! Replays candidate arbitrage cycles and reports their verified net profit

use anyhow::{Context, Result};
use cycle_auditor::{
    accounting::ForensicAccountant,
    audit::{AuditOptions, Auditor},
    config::EnvironmentKind,
    environment::{ExecutionEnvironment, RpcEnvironment, SimulatedEnvironment},
    pools::PoolIndex,
    storage, utils, Opportunity, CONFIG,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging
    utils::setup_output_directories()?;
    let _logging_guard = utils::setup_logging()?;

    // Load configuration
    let config = CONFIG.clone();

    info!("🔬 Cycle Auditor v{}", env!("CARGO_PKG_VERSION"));
    info!("📋 Configuration:");
    info!("   Pools: {}", config.pools_file.display());
    info!("   Opportunities: {}", config.opportunities_file.display());
    info!("   Environment: {:?}", config.environment);
    info!("   Gas Price: {} ETH", config.gas_price_eth);
    info!("   Decimals (default/input/profit): {}/{}/{}",
        config.default_decimals, config.input_decimals, config.profit_decimals);
    info!("   Strict pools: {}", config.strict_pools);
    if let Some(max) = config.max_cycles {
        info!("   Max cycles: {}", max);
    }

    let accountant = ForensicAccountant::from_gas_price(&config.gas_price_eth, config.profit_decimals)
        .context("GAS_PRICE_ETH is not a valid decimal")?;

    let pools = PoolIndex::new(storage::load_pools(&config.pools_file)?);
    let opportunities = storage::load_opportunities(&config.opportunities_file)?;
    info!("✅ Indexed {} pool pairs", pools.pair_count());

    if opportunities.is_empty() {
        warn!("No candidate cycles to audit");
    }

    let options = AuditOptions::from_config(&config);
    match config.environment {
        EnvironmentKind::Simulated => {
            let env = SimulatedEnvironment::new(config.simulated_fee_bps);
            audit(env, pools, accountant, options, &opportunities).await
        }
        EnvironmentKind::Rpc => {
            let env = RpcEnvironment::connect(&config).await?;
            audit(env, pools, accountant, options, &opportunities).await
        }
    }
}

async fn audit<E: ExecutionEnvironment>(
    env: E,
    pools: PoolIndex,
    accountant: ForensicAccountant,
    options: AuditOptions,
    opportunities: &[Opportunity],
) -> Result<()> {
    let mut auditor = Auditor::new(env, pools, accountant, options);

    tokio::select! {
        _ = auditor.run(opportunities) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("\n📛 Received shutdown signal (Ctrl+C), summarizing cycles audited so far...");
        }
    }

    let mut summary = auditor.summary().clone();
    if !summary.is_finalized() {
        summary.finalize();
    }
    utils::print_audit_summary(&summary, auditor.error_counts());
    info!("🏁 Audit complete: {} verified reports", auditor.reports().len());

    Ok(())
}
