//! Drives every candidate cycle through mapping, provisioning, execution and accounting

use alloy::primitives::U256;
use std::collections::HashMap;
use tracing::{debug, error, info, info_span, Instrument};
use crate::{
    accounting::{Accounting, ForensicAccountant},
    config::Config,
    environment::ExecutionEnvironment,
    errors::{AuditError, CycleFailure},
    execution::CycleExecutor,
    pools::{PoolIndex, ReserveSynthesizer},
    registry::TokenRegistry,
    types::{AuditSummary, CycleReport, Opportunity},
    utils::{math::normalize, print_cycle_outcome},
};

/// Stage a cycle was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    Mapping,
    Provisioning,
    Executing,
    Accounting,
}

#[derive(Debug)]
pub enum CycleOutcome {
    Verified(CycleReport),
    /// The environment rejected the path; nothing was accounted.
    Reverted,
    Failed { stage: CycleStage, error: AuditError },
}

impl CycleOutcome {
    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            Self::Verified(report) => Some(report),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditOptions {
    pub default_decimals: u8,
    pub input_decimals: u8,
    pub strict_pools: bool,
    pub max_cycles: Option<usize>,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl AuditOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_decimals: config.default_decimals,
            input_decimals: config.input_decimals,
            strict_pools: config.strict_pools,
            max_cycles: config.max_cycles,
        }
    }
}

/// Owns the token registry and the running summary for one audit run.
pub struct Auditor<E: ExecutionEnvironment> {
    env: E,
    registry: TokenRegistry,
    pools: PoolIndex,
    accountant: ForensicAccountant,
    options: AuditOptions,
    summary: AuditSummary,
    reports: Vec<CycleReport>,
    error_counts: HashMap<String, u32>,
}

impl<E: ExecutionEnvironment> Auditor<E> {
    pub fn new(env: E, pools: PoolIndex, accountant: ForensicAccountant, options: AuditOptions) -> Self {
        let summary = AuditSummary::new(accountant.profit_decimals());
        Self {
            env,
            registry: TokenRegistry::new(),
            pools,
            accountant,
            options,
            summary,
            reports: Vec::new(),
            error_counts: HashMap::new(),
        }
    }

    /// Audits `opportunities` in order and returns the finalized summary.
    ///
    /// Cycle failures are recorded and never stop the run.
    pub async fn run(&mut self, opportunities: &[Opportunity]) -> &AuditSummary {
        let limit = self.options.max_cycles.unwrap_or(opportunities.len());
        info!(
            "🔍 Auditing {} of {} cycles against the {} environment (run {})",
            limit.min(opportunities.len()),
            opportunities.len(),
            self.env.name(),
            self.summary.run_id
        );

        for (offset, opportunity) in opportunities.iter().take(limit).enumerate() {
            let index = offset + 1;
            let outcome = self.audit_cycle(index, opportunity).await;
            print_cycle_outcome(index, &outcome);
        }

        self.summary.finalize();
        &self.summary
    }

    /// Audits a single cycle. `index` is the 1-based position in the input.
    pub async fn audit_cycle(&mut self, index: usize, opportunity: &Opportunity) -> CycleOutcome {
        self.summary.attempted += 1;
        let span = info_span!("cycle", index);

        match self.try_cycle(index, opportunity).instrument(span).await {
            Ok(Some(report)) => {
                self.reports.push(report.clone());
                CycleOutcome::Verified(report)
            }
            Ok(None) => {
                self.summary.reverted += 1;
                CycleOutcome::Reverted
            }
            Err(failure) => {
                error!("{}: {}", failure, failure.error);
                self.summary.failed += 1;
                *self
                    .error_counts
                    .entry(failure.error.kind().to_string())
                    .or_insert(0) += 1;
                CycleOutcome::Failed {
                    stage: failure.stage,
                    error: failure.error,
                }
            }
        }
    }

    async fn try_cycle(
        &mut self,
        index: usize,
        opportunity: &Opportunity,
    ) -> Result<Option<CycleReport>, CycleFailure> {
        let fail = move |stage: CycleStage| move |error: AuditError| CycleFailure { index, stage, error };

        // Mapping
        if opportunity.path.len() < 2 {
            return Err(fail(CycleStage::Mapping)(AuditError::InvalidPath(format!(
                "need at least 2 tokens, got {}",
                opportunity.path.len()
            ))));
        }
        for token in opportunity.distinct_tokens() {
            self.registry
                .get_or_create(&mut self.env, token)
                .await
                .map_err(|e| fail(CycleStage::Mapping)(e.into()))?;
        }

        // Provisioning
        let synthesizer = ReserveSynthesizer::new(
            &self.pools,
            self.options.default_decimals,
            self.options.strict_pools,
        );
        for (from, to) in opportunity.hops() {
            synthesizer
                .provision(&mut self.env, &self.registry, from, to)
                .await
                .map_err(fail(CycleStage::Provisioning))?;
        }

        // Executing
        let path = self
            .registry
            .resolve_path(&opportunity.path)
            .map_err(fail(CycleStage::Executing))?;
        let amount_in = normalize(&opportunity.input_amount, self.options.input_decimals)
            .map_err(fail(CycleStage::Executing))?;
        let min_profit: U256 = amount_in;
        debug!("Input {} normalized to {}", opportunity.input_amount, amount_in);

        let result = CycleExecutor::run(&mut self.env, &path, amount_in, min_profit)
            .await
            .map_err(fail(CycleStage::Executing))?;

        // Accounting
        match self
            .accountant
            .account(index, opportunity, &result, &mut self.summary)
            .map_err(fail(CycleStage::Accounting))?
        {
            Accounting::Report(report) => Ok(Some(report)),
            Accounting::Skipped => Ok(None),
        }
    }

    pub fn summary(&self) -> &AuditSummary {
        &self.summary
    }

    pub fn reports(&self) -> &[CycleReport] {
        &self.reports
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    /// Failed cycles tallied by error kind.
    pub fn error_counts(&self) -> &HashMap<String, u32> {
        &self.error_counts
    }

    pub fn env(&self) -> &E {
        &self.env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{environment::SimulatedEnvironment, types::PoolRecord};

    fn pool(a: &str, b: &str, ra: &str, rb: &str) -> PoolRecord {
        serde_json::from_value(serde_json::json!({
            "token0": { "id": a },
            "token1": { "id": b },
            "reserve0": ra,
            "reserve1": rb,
        }))
        .unwrap()
    }

    fn opportunity(path: &[&str], input: &str) -> Opportunity {
        serde_json::from_value(serde_json::json!({
            "inputAmount": input,
            "path": path,
        }))
        .unwrap()
    }

    fn auditor(pools: Vec<PoolRecord>, strict: bool) -> Auditor<SimulatedEnvironment> {
        let options = AuditOptions {
            strict_pools: strict,
            ..AuditOptions::default()
        };
        let accountant = ForensicAccountant::from_gas_price("0.000000032", 18).unwrap();
        Auditor::new(SimulatedEnvironment::default(), PoolIndex::new(pools), accountant, options)
    }

    #[tokio::test]
    async fn open_two_hop_path_touches_each_component_once() {
        let mut auditor = auditor(
            vec![
                pool("0xa", "0xb", "1000.0", "2000.0"),
                pool("0xb", "0xc", "1000.0", "1000.0"),
            ],
            false,
        );

        let outcome = auditor.audit_cycle(1, &opportunity(&["0xa", "0xb", "0xc"], "1.0")).await;

        assert!(matches!(outcome, CycleOutcome::Verified(_)));
        let calls = auditor.env().calls();
        assert_eq!(calls.create_token, 3);
        assert_eq!(calls.set_reserve, 2);
        assert_eq!(calls.execute, 1);
        assert_eq!(auditor.reports().len(), 1);
        assert_eq!(auditor.summary().succeeded, 1);
    }

    #[tokio::test]
    async fn malformed_input_fails_in_executing_stage() {
        let mut auditor = auditor(vec![pool("0xa", "0xb", "10", "10")], false);

        let outcome = auditor.audit_cycle(1, &opportunity(&["0xa", "0xb", "0xa"], "1.2.3")).await;

        match outcome {
            CycleOutcome::Failed { stage, error } => {
                assert_eq!(stage, CycleStage::Executing);
                assert!(matches!(error, AuditError::MalformedDecimal { .. }));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(auditor.summary().failed, 1);
        assert_eq!(auditor.error_counts().get("malformed_decimal"), Some(&1));
        assert_eq!(auditor.env().calls().execute, 0);
    }

    #[tokio::test]
    async fn strict_mode_fails_provisioning_on_missing_pool() {
        let mut auditor = auditor(vec![pool("0xa", "0xb", "10", "10")], true);

        let outcome = auditor.audit_cycle(1, &opportunity(&["0xa", "0xb", "0xc"], "1")).await;

        assert!(matches!(
            outcome,
            CycleOutcome::Failed { stage: CycleStage::Provisioning, error: AuditError::PoolNotFound { .. } }
        ));
    }

    #[tokio::test]
    async fn single_token_path_fails_before_registration() {
        let mut auditor = auditor(Vec::new(), false);

        let outcome = auditor.audit_cycle(1, &opportunity(&["0xa"], "1")).await;

        assert!(matches!(outcome, CycleOutcome::Failed { stage: CycleStage::Mapping, .. }));
        assert!(auditor.registry().is_empty());
    }

    #[tokio::test]
    async fn max_cycles_limits_the_run() {
        let mut auditor = auditor(vec![pool("0xa", "0xb", "100", "100")], false);
        auditor.options.max_cycles = Some(1);
        let cycles = vec![
            opportunity(&["0xa", "0xb", "0xa"], "1"),
            opportunity(&["0xa", "0xb", "0xa"], "1"),
        ];

        let summary = auditor.run(&cycles).await;

        assert_eq!(summary.attempted, 1);
        assert!(summary.is_finalized());
    }
}
