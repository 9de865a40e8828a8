//! Candidate cycle loading

use anyhow::Context;
use std::{fs, path::Path};
use tracing::{info, warn};
use crate::{
    errors::{AuditError, AuditResult},
    types::Opportunity,
};

pub fn load_opportunities(path: &Path) -> AuditResult<Vec<Opportunity>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading opportunities {}", path.display()))
        .map_err(|e| AuditError::fatal("load opportunities", e))?;
    let opportunities = parse_opportunities(&raw)?;
    info!("📂 Loaded {} candidate cycles from {}", opportunities.len(), path.display());
    Ok(opportunities)
}

/// Parses the candidate list. Short and open paths are kept and flagged; the auditor
/// decides what happens to them.
pub fn parse_opportunities(raw: &str) -> AuditResult<Vec<Opportunity>> {
    let opportunities: Vec<Opportunity> = serde_json::from_str(raw)
        .context("opportunity list is not a JSON array of cycles")
        .map_err(|e| AuditError::fatal("load opportunities", e))?;

    for (offset, opportunity) in opportunities.iter().enumerate() {
        let index = offset + 1;
        if opportunity.path.len() < 2 {
            warn!("Cycle #{} has a {}-token path and will fail", index, opportunity.path.len());
        } else if !opportunity.is_closed() {
            warn!(
                "Cycle #{} is open ({} -> {}); auditing anyway",
                index,
                opportunity.path[0],
                opportunity.path[opportunity.path.len() - 1]
            );
        }
    }
    Ok(opportunities)
}
