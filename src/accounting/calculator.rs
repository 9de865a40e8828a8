//! Gas-inclusive profit accounting for executed cycles

use alloy::primitives::{I256, U256};
use rust_decimal::Decimal;
use std::str::FromStr;
use crate::{
    errors::{AuditError, AuditResult},
    types::{AuditSummary, CycleReport, CycleResult, Opportunity, ProfitClass},
    utils::math::to_signed,
};

#[derive(Debug, Clone)]
pub enum Accounting {
    /// The cycle reverted; nothing to account for.
    Skipped,
    Report(CycleReport),
}

/// Prices gas at a fixed per-unit rate and nets it against the realized gain.
///
/// All arithmetic is in minor units of the profit asset.
#[derive(Debug, Clone)]
pub struct ForensicAccountant {
    gas_price_wei: U256,
    profit_decimals: u8,
}

impl ForensicAccountant {
    pub fn new(gas_price_wei: U256, profit_decimals: u8) -> Self {
        Self {
            gas_price_wei,
            profit_decimals,
        }
    }

    /// Builds an accountant from a per-unit gas price expressed in the profit asset (e.g. ETH).
    ///
    /// The price is always in whole units, so `"1"` means one ETH per gas unit. Digits past
    /// `profit_decimals` are truncated.
    pub fn from_gas_price(gas_price: &str, profit_decimals: u8) -> AuditResult<Self> {
        let price = Decimal::from_str(gas_price.trim())
            .map_err(|e| AuditError::malformed(gas_price, e.to_string()))?;
        if price.is_sign_negative() && !price.is_zero() {
            return Err(AuditError::malformed(gas_price, "gas price cannot be negative"));
        }

        let mantissa = U256::from(price.mantissa().unsigned_abs());
        let scale = price.scale();
        let decimals = u32::from(profit_decimals);
        let ten = U256::from(10u64);
        let wei = if decimals >= scale {
            mantissa
                .checked_mul(ten.pow(U256::from(decimals - scale)))
                .ok_or_else(|| AuditError::Overflow(format!("gas price {gas_price}")))?
        } else {
            mantissa / ten.pow(U256::from(scale - decimals))
        };

        Ok(Self::new(wei, profit_decimals))
    }

    pub fn gas_price_wei(&self) -> U256 {
        self.gas_price_wei
    }

    pub fn profit_decimals(&self) -> u8 {
        self.profit_decimals
    }

    /// Computes the report for one cycle without touching any totals.
    pub fn assess(
        &self,
        index: usize,
        opportunity: &Opportunity,
        result: &CycleResult,
    ) -> AuditResult<Accounting> {
        if result.reverted {
            return Ok(Accounting::Skipped);
        }

        let (balance_after, gas_used) = match (result.balance_after, result.resource_used) {
            (Some(after), Some(gas)) => (after, gas),
            _ => {
                return Err(AuditError::Settlement(
                    "missing balance or gas after execution".to_string(),
                ));
            }
        };

        let gross_gain_wei = to_signed(balance_after)?
            .checked_sub(to_signed(result.balance_before)?)
            .ok_or_else(|| AuditError::Overflow("gross gain".to_string()))?;

        let gas_cost_wei = U256::from(gas_used)
            .checked_mul(self.gas_price_wei)
            .ok_or_else(|| AuditError::Overflow("gas cost".to_string()))?;

        let net_profit_wei = gross_gain_wei
            .checked_sub(to_signed(gas_cost_wei)?)
            .ok_or_else(|| AuditError::Overflow("net profit".to_string()))?;

        let class = if net_profit_wei > I256::ZERO {
            ProfitClass::Profit
        } else {
            ProfitClass::Loss
        };

        Ok(Accounting::Report(CycleReport {
            index,
            opportunity_id: opportunity.id.clone(),
            input_amount: opportunity.input_amount.clone(),
            expected_profit: opportunity.expected_profit.clone(),
            gross_gain_wei,
            gas_used,
            gas_cost_wei,
            net_profit_wei,
            class,
            profit_decimals: self.profit_decimals,
        }))
    }

    /// Assesses the cycle and folds a non-skipped report into `summary`.
    pub fn account(
        &self,
        index: usize,
        opportunity: &Opportunity,
        result: &CycleResult,
        summary: &mut AuditSummary,
    ) -> AuditResult<Accounting> {
        let accounting = self.assess(index, opportunity, result)?;
        if let Accounting::Report(report) = &accounting {
            summary.record(report);
        }
        Ok(accounting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn opportunity() -> Opportunity {
        serde_json::from_value(serde_json::json!({
            "inputAmount": "0.000000000000001",
            "path": ["0xa", "0xb", "0xa"],
        }))
        .unwrap()
    }

    fn accountant() -> ForensicAccountant {
        ForensicAccountant::from_gas_price("0.000000032", 18).unwrap()
    }

    #[test]
    fn gas_price_normalizes_to_wei() {
        assert_eq!(accountant().gas_price_wei(), U256::from(32_000_000_000u64));
    }

    #[test]
    fn whole_number_gas_price_is_in_eth() {
        let one_eth = U256::from(1_000_000_000_000_000_000u64);
        assert_eq!(ForensicAccountant::from_gas_price("1", 18).unwrap().gas_price_wei(), one_eth);
        assert_eq!(ForensicAccountant::from_gas_price("1.0", 18).unwrap().gas_price_wei(), one_eth);
        assert_eq!(
            ForensicAccountant::from_gas_price(" 2 ", 6).unwrap().gas_price_wei(),
            U256::from(2_000_000u64)
        );
    }

    #[test]
    fn gas_price_digits_past_decimals_are_truncated() {
        let accountant = ForensicAccountant::from_gas_price("0.0000019", 6).unwrap();
        assert_eq!(accountant.gas_price_wei(), U256::from(1u64));
    }

    #[test]
    fn malformed_or_negative_gas_price_is_rejected() {
        for bad in ["abc", "", "-0.1"] {
            let err = ForensicAccountant::from_gas_price(bad, 18).unwrap_err();
            assert!(matches!(err, AuditError::MalformedDecimal { .. }), "{bad}");
        }
    }

    #[test]
    fn gas_dominates_small_gains() {
        let result = CycleResult::completed(U256::from(1000), U256::from(1200), 150_000);
        let mut summary = AuditSummary::new(18);

        let Accounting::Report(report) = accountant()
            .account(1, &opportunity(), &result, &mut summary)
            .unwrap()
        else {
            panic!("completed cycle must produce a report");
        };

        assert_eq!(report.gross_gain_wei, I256::try_from(200i64).unwrap());
        assert_eq!(report.gross_gain_eth().unwrap(), dec!(0.0000000000000002));
        assert_eq!(report.gas_cost_eth().unwrap(), dec!(0.0048));
        assert_eq!(
            report.net_profit_eth().unwrap(),
            dec!(0.0000000000000002) - dec!(0.0048)
        );
        assert_eq!(report.class, ProfitClass::Loss);

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.profitable, 0);
        assert_eq!(summary.total_net_profit_wei, I256::ZERO);
    }

    #[test]
    fn profitable_cycle_adds_net_to_total() {
        let before = U256::from(1_000_000_000_000_000_000u64);
        let after = U256::from(1_010_000_000_000_000_000u64);
        let result = CycleResult::completed(before, after, 150_000);
        let mut summary = AuditSummary::new(18);

        let accounting = accountant().account(2, &opportunity(), &result, &mut summary).unwrap();
        let Accounting::Report(report) = accounting else {
            panic!("expected report");
        };

        assert!(report.is_profitable());
        assert_eq!(report.net_profit_eth().unwrap(), dec!(0.0052));
        assert_eq!(summary.total_net_profit_eth().unwrap(), dec!(0.0052));
        assert_eq!(summary.profitable, 1);
    }

    #[test]
    fn zero_net_is_a_loss() {
        let accountant = ForensicAccountant::new(U256::from(1), 18);
        let result = CycleResult::completed(U256::from(100), U256::from(110), 10);
        let Accounting::Report(report) = accountant.assess(1, &opportunity(), &result).unwrap() else {
            panic!("expected report");
        };
        assert_eq!(report.net_profit_wei, I256::ZERO);
        assert_eq!(report.class, ProfitClass::Loss);
    }

    #[test]
    fn negative_gross_is_representable() {
        let result = CycleResult::completed(U256::from(1000), U256::from(400), 0);
        let Accounting::Report(report) = accountant().assess(1, &opportunity(), &result).unwrap() else {
            panic!("expected report");
        };
        assert_eq!(report.gross_gain_wei, I256::try_from(-600i64).unwrap());
        assert_eq!(report.class, ProfitClass::Loss);
    }

    #[test]
    fn reverted_cycles_are_skipped_and_not_counted() {
        let mut summary = AuditSummary::new(18);
        let accounting = accountant()
            .account(1, &opportunity(), &CycleResult::reverted(U256::from(1000)), &mut summary)
            .unwrap();

        assert!(matches!(accounting, Accounting::Skipped));
        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.total_net_profit_wei, I256::ZERO);
    }
}
