//! Real token id to synthetic token mapping

use alloy::primitives::Address;
use std::collections::HashMap;
use tracing::debug;
use crate::{
    environment::ExecutionEnvironment,
    errors::{AuditError, AuditResult, EnvResult},
    types::TokenId,
};

/// Synthetic counterparts of real tokens. Entries are created once and never replaced.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    handles: HashMap<TokenId, Address>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the synthetic token for `real`, deploying one on first sight.
    ///
    /// A failed creation leaves the registry untouched.
    pub async fn get_or_create<E: ExecutionEnvironment>(
        &mut self,
        env: &mut E,
        real: &TokenId,
    ) -> EnvResult<Address> {
        if let Some(&handle) = self.handles.get(real) {
            debug!("Registry hit: {} -> {}", real, handle);
            return Ok(handle);
        }

        let handle = env.create_token().await?;
        debug!("Registered {} as synthetic {}", real, handle);
        self.handles.insert(real.clone(), handle);
        Ok(handle)
    }

    pub fn get(&self, real: &TokenId) -> Option<Address> {
        self.handles.get(real).copied()
    }

    /// Looks up a token that must already be registered.
    pub fn resolve(&self, real: &TokenId) -> AuditResult<Address> {
        self.get(real).ok_or_else(|| AuditError::UnknownToken(real.to_string()))
    }

    /// Translates a real path into its synthetic equivalent.
    pub fn resolve_path(&self, path: &[TokenId]) -> AuditResult<Vec<Address>> {
        path.iter().map(|token| self.resolve(token)).collect()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
