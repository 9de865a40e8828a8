//! Pool dataset loading

use anyhow::Context;
use std::{fs, path::Path};
use tracing::{info, warn};
use crate::{
    errors::{AuditError, AuditResult},
    types::PoolRecord,
};

pub fn load_pools(path: &Path) -> AuditResult<Vec<PoolRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading pool dataset {}", path.display()))
        .map_err(|e| AuditError::fatal("load pools", e))?;
    let pools = parse_pools(&raw)?;
    info!("📂 Loaded {} pools from {}", pools.len(), path.display());
    Ok(pools)
}

pub fn parse_pools(raw: &str) -> AuditResult<Vec<PoolRecord>> {
    let pools: Vec<PoolRecord> = serde_json::from_str(raw)
        .context("pool dataset is not a JSON array of pools")
        .map_err(|e| AuditError::fatal("load pools", e))?;

    let degenerate = pools.iter().filter(|p| p.token0.id == p.token1.id).count();
    if degenerate > 0 {
        warn!("{} pools pair a token with itself; only a hop from a token to itself will use them", degenerate);
    }
    Ok(pools)
}
