//! Per-cycle reports and the run-level audit summary

use alloy::primitives::{I256, U256};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use crate::{errors::AuditResult, utils::math::{to_decimal, to_decimal_unsigned}};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProfitClass {
    Profit,
    Loss,
}

/// Forensic breakdown of a cycle that executed successfully.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub index: usize,
    pub opportunity_id: Option<String>,
    pub input_amount: String,
    pub expected_profit: Option<String>,
    pub gross_gain_wei: I256,
    pub gas_used: u64,
    pub gas_cost_wei: U256,
    pub net_profit_wei: I256,
    pub class: ProfitClass,
    pub profit_decimals: u8,
}

impl CycleReport {
    pub fn is_profitable(&self) -> bool {
        self.class == ProfitClass::Profit
    }

    pub fn gross_gain_eth(&self) -> AuditResult<Decimal> {
        to_decimal(self.gross_gain_wei, self.profit_decimals)
    }

    pub fn gas_cost_eth(&self) -> AuditResult<Decimal> {
        to_decimal_unsigned(self.gas_cost_wei, self.profit_decimals)
    }

    pub fn net_profit_eth(&self) -> AuditResult<Decimal> {
        to_decimal(self.net_profit_wei, self.profit_decimals)
    }
}

/// Running totals for one audit run.
#[derive(Debug, Clone, Serialize)]
pub struct AuditSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub attempted: u64,
    pub succeeded: u64,
    pub profitable: u64,
    pub reverted: u64,
    pub failed: u64,
    pub total_net_profit_wei: I256,
    pub profit_decimals: u8,
}

impl AuditSummary {
    pub fn new(profit_decimals: u8) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            finished_at: None,
            attempted: 0,
            succeeded: 0,
            profitable: 0,
            reverted: 0,
            failed: 0,
            total_net_profit_wei: I256::ZERO,
            profit_decimals,
        }
    }

    /// Folds a successfully executed cycle into the totals. Only profits are summed.
    pub fn record(&mut self, report: &CycleReport) {
        self.succeeded += 1;
        if report.is_profitable() {
            self.profitable += 1;
            self.total_net_profit_wei = self.total_net_profit_wei.saturating_add(report.net_profit_wei);
        }
    }

    pub fn finalize(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn is_finalized(&self) -> bool {
        self.finished_at.is_some()
    }

    pub fn total_net_profit_eth(&self) -> AuditResult<Decimal> {
        to_decimal(self.total_net_profit_wei, self.profit_decimals)
    }

    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.attempted as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn report(net: i64, class: ProfitClass) -> CycleReport {
        CycleReport {
            index: 1,
            opportunity_id: None,
            input_amount: "1".to_string(),
            expected_profit: None,
            gross_gain_wei: I256::try_from(net).unwrap(),
            gas_used: 0,
            gas_cost_wei: U256::ZERO,
            net_profit_wei: I256::try_from(net).unwrap(),
            class,
            profit_decimals: 18,
        }
    }

    #[test]
    fn only_profitable_cycles_add_to_total() {
        let mut summary = AuditSummary::new(18);
        summary.record(&report(5_000_000_000_000_000, ProfitClass::Profit));
        summary.record(&report(-2_000_000_000_000_000, ProfitClass::Loss));

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.profitable, 1);
        assert_eq!(summary.total_net_profit_eth().unwrap(), dec!(0.005));
    }

    #[test]
    fn finalize_stamps_finish_time() {
        let mut summary = AuditSummary::new(18);
        assert!(!summary.is_finalized());
        summary.finalize();
        assert!(summary.is_finalized());
        assert_eq!(summary.success_rate(), 0.0);
    }
}
