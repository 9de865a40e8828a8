//! Display and printing utilities

use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;
use std::fmt::Display;
use tracing::{error, info, warn};
use crate::{
    audit::CycleOutcome,
    config::{REPORT_PRECISION, SUMMARY_PRECISION},
    errors::AuditResult,
    types::{AuditSummary, CycleReport, ProfitClass},
};

/// Renders an amount rounded half away from zero to `precision` places, falling back to
/// raw minor units when it does not fit a `Decimal`.
fn amount(value: AuditResult<Decimal>, raw: impl Display, precision: usize) -> String {
    match value {
        Ok(value) => {
            let rounded = value.round_dp_with_strategy(precision as u32, RoundingStrategy::MidpointAwayFromZero);
            format!("{:.*}", precision, rounded)
        }
        Err(_) => format!("{raw} wei"),
    }
}

pub fn print_cycle_report(report: &CycleReport) {
    let label = match &report.opportunity_id {
        Some(id) => format!("#{} ({})", report.index, id),
        None => format!("#{}", report.index),
    };

    info!("\n🔬 CYCLE {} VERIFIED", label);
    info!("   Input: {}", report.input_amount);
    if let Some(expected) = &report.expected_profit {
        info!("   Expected Profit: {}", expected);
    }
    info!(
        "   Gross Gain: {} ETH",
        amount(report.gross_gain_eth(), report.gross_gain_wei, REPORT_PRECISION)
    );
    info!("   Gas Used: {}", report.gas_used);
    info!(
        "   Gas Cost: {} ETH",
        amount(report.gas_cost_eth(), report.gas_cost_wei, REPORT_PRECISION)
    );

    let net = amount(report.net_profit_eth(), report.net_profit_wei, REPORT_PRECISION);
    match report.class {
        ProfitClass::Profit => info!("   ✅ Net Profit: {} ETH", net),
        ProfitClass::Loss => warn!("   📉 Net Loss: {} ETH", net),
    }
}

pub fn print_cycle_outcome(index: usize, outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::Verified(report) => print_cycle_report(report),
        CycleOutcome::Reverted => {
            warn!("\n↩️  CYCLE #{} REVERTED (principal not returned, nothing accounted)", index);
        }
        CycleOutcome::Failed { stage, error } => {
            error!("\n❌ CYCLE #{} FAILED during {:?}", index, stage);
            error!("   Error: {}", error);
        }
    }
}

pub fn print_audit_summary(summary: &AuditSummary, error_counts: &HashMap<String, u32>) {
    let runtime = summary
        .finished_at
        .map(|finished| (finished - summary.started_at).num_seconds())
        .unwrap_or_default();

    info!("\n📊 Audit Summary (run {}, {}s)", summary.run_id, runtime);
    info!("   Attempted: {}", summary.attempted);
    info!("   Succeeded: {}", summary.succeeded);
    info!("   Profitable: {}", summary.profitable);
    info!("   Reverted: {}", summary.reverted);
    info!("   Failed: {}", summary.failed);
    info!("   Success rate: {:.1}%", summary.success_rate());
    info!(
        "   💰 Total verified net profit: {} ETH",
        amount(summary.total_net_profit_eth(), summary.total_net_profit_wei, SUMMARY_PRECISION)
    );

    if !error_counts.is_empty() {
        info!("   Failures by kind:");
        let mut kinds: Vec<_> = error_counts.iter().collect();
        kinds.sort();
        for (kind, count) in kinds {
            info!("     {}: {}", kind, count);
        }
    }

    info!("");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AuditError;
    use rust_decimal_macros::dec;

    #[test]
    fn amounts_render_at_fixed_precision() {
        assert_eq!(amount(Ok(dec!(0.0048)), 0, REPORT_PRECISION), "0.004800");
        assert_eq!(amount(Ok(dec!(1.23456789)), 0, SUMMARY_PRECISION), "1.2346");
    }

    #[test]
    fn amounts_round_half_away_from_zero() {
        assert_eq!(amount(Ok(dec!(0.00000050)), 0, REPORT_PRECISION), "0.000001");
        assert_eq!(amount(Ok(dec!(-0.0048125)), 0, REPORT_PRECISION), "-0.004813");
        assert_eq!(amount(Ok(dec!(2.00005)), 0, SUMMARY_PRECISION), "2.0001");
        assert_eq!(amount(Ok(dec!(0.00004)), 0, SUMMARY_PRECISION), "0.0000");
    }

    #[test]
    fn unrepresentable_amounts_fall_back_to_wei() {
        let err = Err(AuditError::Overflow("too wide".to_string()));
        assert_eq!(amount(err, 12345, REPORT_PRECISION), "12345 wei");
    }
}
