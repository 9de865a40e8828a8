//! Direction-agnostic lookup over the pool dataset

use std::collections::HashMap;
use tracing::warn;
use crate::types::{PoolRecord, TokenId};

type PairKey = (TokenId, TokenId);

fn pair_key(a: &TokenId, b: &TokenId) -> PairKey {
    if a <= b { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) }
}

/// Pool records keyed by their unordered token pair.
#[derive(Debug, Default)]
pub struct PoolIndex {
    pools: Vec<PoolRecord>,
    by_pair: HashMap<PairKey, usize>,
}

impl PoolIndex {
    pub fn new(pools: Vec<PoolRecord>) -> Self {
        let mut by_pair = HashMap::with_capacity(pools.len());
        let mut duplicates = 0usize;

        for (i, pool) in pools.iter().enumerate() {
            let key = pair_key(&pool.token0.id, &pool.token1.id);
            // First record wins, matching a linear scan of the dataset.
            if by_pair.contains_key(&key) {
                duplicates += 1;
            } else {
                by_pair.insert(key, i);
            }
        }

        if duplicates > 0 {
            warn!("⚠️ {} duplicate pool records ignored (first record per pair kept)", duplicates);
        }

        Self { pools, by_pair }
    }

    pub fn find(&self, a: &TokenId, b: &TokenId) -> Option<&PoolRecord> {
        self.by_pair.get(&pair_key(a, b)).map(|&i| &self.pools[i])
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn pair_count(&self) -> usize {
        self.by_pair.len()
    }
}
