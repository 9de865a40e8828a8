//! Candidate arbitrage cycles produced by the discovery stage

use serde::Deserialize;
use serde_json::Value;
use super::TokenId;

#[derive(Debug, Clone, Deserialize)]
pub struct Opportunity {
    #[serde(default, deserialize_with = "id_from_any")]
    pub id: Option<String>,
    #[serde(rename = "inputAmount")]
    pub input_amount: String,
    #[serde(default, rename = "expectedProfit")]
    pub expected_profit: Option<String>,
    pub path: Vec<TokenId>,
}

impl Opportunity {
    pub fn start_token(&self) -> Option<&TokenId> {
        self.path.first()
    }

    pub fn is_closed(&self) -> bool {
        self.path.len() >= 2 && self.path.first() == self.path.last()
    }

    pub fn hop_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Consecutive (from, to) pairs along the path.
    pub fn hops(&self) -> impl Iterator<Item = (&TokenId, &TokenId)> {
        self.path.windows(2).map(|w| (&w[0], &w[1]))
    }

    /// Tokens of the path in first-seen order, without repeats.
    pub fn distinct_tokens(&self) -> Vec<&TokenId> {
        let mut seen = Vec::with_capacity(self.path.len());
        for token in &self.path {
            if !seen.contains(&token) {
                seen.push(token);
            }
        }
        seen
    }
}

fn id_from_any<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}
