//! Compiled contract artifacts for the RPC environment

use alloy::primitives::Bytes;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Reads creation bytecode from a Remix or Foundry artifact file.
pub fn load_bytecode(path: &Path) -> Result<Bytes> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read artifact {}", path.display()))?;
    let json: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse artifact {}", path.display()))?;
    bytecode_from_json(&json).with_context(|| format!("No bytecode in artifact {}", path.display()))
}

pub fn bytecode_from_json(json: &Value) -> Result<Bytes> {
    // Remix: data.bytecode.object, Foundry: bytecode.object, Hardhat: bytecode
    let object = json
        .pointer("/data/bytecode/object")
        .or_else(|| json.pointer("/bytecode/object"))
        .or_else(|| json.get("bytecode"))
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("bytecode object not found"))?;

    if object.trim_start_matches("0x").is_empty() {
        return Err(anyhow::anyhow!("bytecode object is empty"));
    }
    let code = alloy::hex::decode(object).context("Bytecode is not valid hex")?;
    Ok(Bytes::from(code))
}
