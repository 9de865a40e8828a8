//! Error types for the audit engine and its execution environments

use alloy::primitives::Address;
use thiserror::Error;

use crate::audit::CycleStage;

/// Failures raised by an execution environment adapter.
#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("{operation} reverted: {reason}")]
    Reverted {
        operation: &'static str,
        reason: String,
    },

    #[error("{operation} transport failure")]
    Transport {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("no contract at {address} for {operation}")]
    MissingContract {
        operation: &'static str,
        address: Address,
    },

    #[error("insufficient balance of {token} for {account}")]
    InsufficientBalance { token: Address, account: Address },

    #[error("insufficient allowance of {token} for spender {spender}")]
    InsufficientAllowance { token: Address, spender: Address },
}

impl EnvironmentError {
    pub fn transport(operation: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self::Transport {
            operation,
            source: source.into(),
        }
    }

    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Reverted { .. })
    }
}

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("malformed decimal {value:?}: {reason}")]
    MalformedDecimal { value: String, reason: String },

    #[error("no pool record for {from} <-> {to}")]
    PoolNotFound { from: String, to: String },

    #[error("token {0} has no synthetic counterpart")]
    UnknownToken(String),

    #[error("invalid cycle path: {0}")]
    InvalidPath(String),

    #[error("amount overflow: {0}")]
    Overflow(String),

    #[error("cycle settlement incomplete: {0}")]
    Settlement(String),

    #[error("environment error")]
    Environment(#[from] EnvironmentError),

    #[error("run aborted: {context}")]
    RunFatal {
        context: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AuditError {
    pub fn malformed(value: &str, reason: impl Into<String>) -> Self {
        Self::MalformedDecimal {
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn fatal(context: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::RunFatal {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Per-cycle errors are absorbed by the orchestrator; everything else aborts the run.
    pub fn is_run_fatal(&self) -> bool {
        matches!(self, Self::RunFatal { .. })
    }

    /// Short label used when tallying failures by kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedDecimal { .. } => "malformed_decimal",
            Self::PoolNotFound { .. } => "pool_not_found",
            Self::UnknownToken(_) => "unknown_token",
            Self::InvalidPath(_) => "invalid_path",
            Self::Overflow(_) => "overflow",
            Self::Settlement(_) => "settlement",
            Self::Environment(_) => "environment",
            Self::RunFatal { .. } => "run_fatal",
        }
    }
}

/// A per-cycle failure tagged with the stage it escaped from.
#[derive(Error, Debug)]
#[error("cycle #{index} failed during {stage:?}")]
pub struct CycleFailure {
    pub index: usize,
    pub stage: CycleStage,
    #[source]
    pub error: AuditError,
}

pub type AuditResult<T> = Result<T, AuditError>;
pub type EnvResult<T> = Result<T, EnvironmentError>;
