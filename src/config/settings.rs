//! Audit configuration settings and environment variable handling

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

// Configuration constants
pub const DEFAULT_GAS_PRICE_ETH: Decimal = dec!(0.000000032); // 32 gwei
pub const DEFAULT_DECIMALS: u8 = 18;
pub const MAX_DECIMALS: u8 = 28; // rust_decimal scale limit for report rendering
pub const DEFAULT_SIMULATED_FEE_BPS: u32 = 30;
pub const MAX_SIMULATED_FEE_BPS: u32 = 1_000;

// Display precision
pub const REPORT_PRECISION: usize = 6;
pub const SUMMARY_PRECISION: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentKind {
    Simulated,
    Rpc,
}

impl FromStr for EnvironmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simulated" | "sim" | "memory" => Ok(Self::Simulated),
            "rpc" | "anvil" | "node" => Ok(Self::Rpc),
            other => Err(format!("unknown environment kind: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Inputs
    pub pools_file: PathBuf,
    pub opportunities_file: PathBuf,
    pub max_cycles: Option<usize>,
    // Accounting policy
    pub gas_price_eth: String,
    pub default_decimals: u8,
    pub profit_decimals: u8,
    pub input_decimals: u8,
    pub strict_pools: bool,
    // Execution environment
    pub environment: EnvironmentKind,
    pub rpc_url: Option<String>,
    pub router_artifact: PathBuf,
    pub executor_artifact: PathBuf,
    pub token_artifact: PathBuf,
    pub simulated_fee_bps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pools_file: PathBuf::from("v2pools.json"),
            opportunities_file: PathBuf::from("weth_opportunities.json"),
            max_cycles: None,
            gas_price_eth: DEFAULT_GAS_PRICE_ETH.to_string(),
            default_decimals: DEFAULT_DECIMALS,
            profit_decimals: DEFAULT_DECIMALS,
            input_decimals: DEFAULT_DECIMALS,
            strict_pools: false,
            environment: EnvironmentKind::Simulated,
            rpc_url: None,
            router_artifact: PathBuf::from("artifacts/MockRouter.json"),
            executor_artifact: PathBuf::from("artifacts/ArbitrageBot.json"),
            token_artifact: PathBuf::from("artifacts/MockERC20.json"),
            simulated_fee_bps: DEFAULT_SIMULATED_FEE_BPS,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let defaults = Self::default();
        Self {
            pools_file: env::var("POOLS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.pools_file),
            opportunities_file: env::var("OPPORTUNITIES_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.opportunities_file),
            max_cycles: env::var("MAX_CYCLES")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0),
            // Kept as text; scaled to wei once at startup so malformed values are fatal.
            gas_price_eth: env::var("GAS_PRICE_ETH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.gas_price_eth),
            default_decimals: decimals_var("DEFAULT_DECIMALS"),
            profit_decimals: decimals_var("PROFIT_DECIMALS"),
            input_decimals: decimals_var("INPUT_DECIMALS"),
            strict_pools: env::var("STRICT_POOLS")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            environment: env::var("ENVIRONMENT")
                .ok()
                .and_then(|s| EnvironmentKind::from_str(&s).ok())
                .unwrap_or(defaults.environment),
            rpc_url: env::var("RPC_URL").ok().filter(|s| !s.trim().is_empty()),
            router_artifact: env::var("ROUTER_ARTIFACT")
                .map(PathBuf::from)
                .unwrap_or(defaults.router_artifact),
            executor_artifact: env::var("EXECUTOR_ARTIFACT")
                .map(PathBuf::from)
                .unwrap_or(defaults.executor_artifact),
            token_artifact: env::var("TOKEN_ARTIFACT")
                .map(PathBuf::from)
                .unwrap_or(defaults.token_artifact),
            simulated_fee_bps: env::var("SIMULATED_FEE_BPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SIMULATED_FEE_BPS)
                .min(MAX_SIMULATED_FEE_BPS),
        }
    }
}

fn decimals_var(name: &str) -> u8 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse::<u8>().ok())
        .unwrap_or(DEFAULT_DECIMALS)
        .min(MAX_DECIMALS)
}
