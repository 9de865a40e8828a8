//! Pool snapshot records from the real-world dataset

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use super::TokenId;

/// One side of a pool as it appears in the dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolToken {
    pub id: TokenId,
    #[serde(default, deserialize_with = "decimals_from_any")]
    pub decimals: Option<u8>,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// A real-world liquidity snapshot for one unordered token pair.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub token0: PoolToken,
    pub token1: PoolToken,
    #[serde(deserialize_with = "amount_from_any")]
    pub reserve0: String,
    #[serde(deserialize_with = "amount_from_any")]
    pub reserve1: String,
    #[serde(default, rename = "reserveUSD")]
    pub reserve_usd: Option<String>,
}

/// A pool record viewed in the direction of a hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrientedReserves<'a> {
    pub reserve_in: &'a str,
    pub reserve_out: &'a str,
    pub decimals_in: u8,
    pub decimals_out: u8,
}

impl PoolRecord {
    pub fn connects(&self, a: &TokenId, b: &TokenId) -> bool {
        (self.token0.id == *a && self.token1.id == *b) || (self.token0.id == *b && self.token1.id == *a)
    }

    /// Reserves and decimals ordered so the `from` token comes first.
    pub fn oriented(&self, from: &TokenId, default_decimals: u8) -> OrientedReserves<'_> {
        let (input, output, reserve_in, reserve_out) = if self.token0.id == *from {
            (&self.token0, &self.token1, &self.reserve0, &self.reserve1)
        } else {
            (&self.token1, &self.token0, &self.reserve1, &self.reserve0)
        };

        OrientedReserves {
            reserve_in,
            reserve_out,
            decimals_in: input.decimals.unwrap_or(default_decimals),
            decimals_out: output.decimals.unwrap_or(default_decimals),
        }
    }

    pub fn label(&self) -> String {
        match (&self.token0.symbol, &self.token1.symbol) {
            (Some(a), Some(b)) => format!("{a}/{b}"),
            _ => format!("{}/{}", self.token0.id, self.token1.id),
        }
    }
}

fn amount_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!("expected amount, got {other}"))),
    }
}

fn decimals_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .and_then(|d| u8::try_from(d).ok())
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid decimals {n}"))),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<u8>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid decimals {s:?}: {e}"))),
        other => Err(serde::de::Error::custom(format!("expected decimals, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usdc_weth() -> PoolRecord {
        serde_json::from_str(
            r#"{
                "id": "0xb4e16d0168e52d35cacd2c6185b44281ec28c9dc",
                "token0": { "id": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "decimals": "6", "symbol": "USDC" },
                "token1": { "id": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", "symbol": "WETH" },
                "reserve0": "41234567.123456",
                "reserve1": 12345.5,
                "reserveUSD": "82000000"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn parses_subgraph_shape() {
        let pool = usdc_weth();
        assert_eq!(pool.token0.decimals, Some(6));
        assert_eq!(pool.token1.decimals, None);
        assert_eq!(pool.reserve1, "12345.5");
        assert_eq!(pool.label(), "USDC/WETH");
    }

    #[test]
    fn orientation_follows_hop_direction() {
        let pool = usdc_weth();
        let usdc = TokenId::from("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
        let weth = TokenId::from("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");

        let forward = pool.oriented(&usdc, 18);
        assert_eq!(forward.reserve_in, "41234567.123456");
        assert_eq!((forward.decimals_in, forward.decimals_out), (6, 18));

        let backward = pool.oriented(&weth, 18);
        assert_eq!(backward.reserve_in, "12345.5");
        assert_eq!(backward.reserve_out, "41234567.123456");
        assert_eq!((backward.decimals_in, backward.decimals_out), (18, 6));

        assert!(pool.connects(&weth, &usdc));
        assert!(pool.connects(&usdc, &weth));
    }

    #[test]
    fn rejects_out_of_range_decimals() {
        let raw = r#"{
            "token0": { "id": "0x1", "decimals": 300 },
            "token1": { "id": "0x2" },
            "reserve0": "1", "reserve1": "1"
        }"#;
        assert!(serde_json::from_str::<PoolRecord>(raw).is_err());
    }
}
