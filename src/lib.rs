//! Cycle Auditor - forensic replay of candidate arbitrage cycles
//!
//! Each candidate cycle is replayed against a controllable liquidity environment
//! seeded with real pool reserves, and its gas-inclusive net profit is measured
//! from the operator's balances rather than taken from the discovery estimate.

pub mod config;
pub mod types;
pub mod errors;
pub mod network;
pub mod environment;
pub mod registry;
pub mod pools;
pub mod execution;
pub mod accounting;
pub mod audit;
pub mod utils;
pub mod storage;

// Re-export commonly used items
pub use config::{Config, CONFIG};
pub use errors::{AuditError, AuditResult, EnvironmentError, EnvResult};
pub use types::*;

// Type alias for our concrete provider
pub type ConcreteProvider = alloy::providers::RootProvider<alloy::transports::BoxTransport>;
