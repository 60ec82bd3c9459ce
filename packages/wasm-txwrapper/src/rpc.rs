//! Node RPC helpers
//!
//! JSON-RPC 2.0 envelopes plus the handful of calls needed to gather chain
//! material. Transport is left to the caller through [`RpcClient`]; nothing
//! here retries.

use crate::error::TxWrapperError;
use crate::types::ChainMaterial;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// Sends one JSON-RPC call and returns its `result`
pub trait RpcClient {
    fn call(&self, method: &str, params: JsonValue) -> Result<JsonValue, TxWrapperError>;
}

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: JsonValue,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: JsonValue) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.into(),
            params,
        }
    }

    pub fn to_json_string(&self) -> Result<String, TxWrapperError> {
        serde_json::to_string(self)
            .map_err(|e| TxWrapperError::InvalidInput(format!("Invalid RPC request: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<JsonValue>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<JsonValue>,
}

/// Unwrap a JSON-RPC response body into its `result`
///
/// Error envelopes become [`TxWrapperError::Rpc`].
pub fn parse_response(body: &str) -> Result<JsonValue, TxWrapperError> {
    let response: JsonRpcResponse = serde_json::from_str(body)
        .map_err(|e| TxWrapperError::InvalidInput(format!("Invalid RPC response: {}", e)))?;
    if let Some(error) = response.error {
        return Err(TxWrapperError::Rpc {
            code: error.code,
            message: error.message,
            data: error.data,
        });
    }
    Ok(response.result.unwrap_or(JsonValue::Null))
}

fn expect_str<'a>(value: &'a JsonValue, what: &str) -> Result<&'a str, TxWrapperError> {
    value
        .as_str()
        .ok_or_else(|| TxWrapperError::InvalidInput(format!("{} must be a string, got {}", what, value)))
}

fn expect_hash(value: &JsonValue, what: &str) -> Result<[u8; 32], TxWrapperError> {
    let text = expect_str(value, what)?;
    let bytes = hex::decode(text.strip_prefix("0x").unwrap_or(text))?;
    bytes.try_into().map_err(|b: Vec<u8>| {
        TxWrapperError::InvalidInput(format!("{} must be 32 bytes, got {}", what, b.len()))
    })
}

/// Numbers arrive either as JSON numbers or as hex strings (block headers)
fn expect_u64(value: &JsonValue, what: &str) -> Result<u64, TxWrapperError> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    let text = expect_str(value, what)?;
    let parsed = match text.strip_prefix("0x") {
        Some(hex_digits) => u64::from_str_radix(hex_digits, 16),
        None => text.parse(),
    };
    parsed.map_err(|e| TxWrapperError::InvalidInput(format!("Invalid {}: {}", what, e)))
}

fn expect_u32(value: &JsonValue, what: &str) -> Result<u32, TxWrapperError> {
    let n = expect_u64(value, what)?;
    u32::try_from(n).map_err(|_| TxWrapperError::InvalidInput(format!("{} out of range: {}", what, n)))
}

/// Genesis hash, head block, metadata and runtime version
pub fn fetch_chain_material<C: RpcClient + ?Sized>(client: &C) -> Result<ChainMaterial, TxWrapperError> {
    let genesis_hash = expect_hash(&client.call("chain_getBlockHash", json!([0]))?, "genesis hash")?;
    let block_hash = expect_hash(&client.call("chain_getBlockHash", json!([]))?, "block hash")?;
    let block = client.call("chain_getBlock", json!([format!("0x{}", hex::encode(block_hash))]))?;
    let block_number = expect_u64(&block["block"]["header"]["number"], "block number")?;

    let metadata_hex = client.call("state_getMetadata", json!([]))?;
    let metadata_hex = expect_str(&metadata_hex, "metadata")?;
    let metadata = hex::decode(metadata_hex.strip_prefix("0x").unwrap_or(metadata_hex))?;

    let version = client.call("state_getRuntimeVersion", json!([]))?;
    let material = ChainMaterial {
        genesis_hash,
        block_hash,
        block_number,
        spec_name: expect_str(&version["specName"], "specName")?.to_string(),
        spec_version: expect_u32(&version["specVersion"], "specVersion")?,
        transaction_version: expect_u32(&version["transactionVersion"], "transactionVersion")?,
        metadata,
    };

    tracing::debug!(
        spec_name = %material.spec_name,
        spec_version = material.spec_version,
        block_number = material.block_number,
        metadata_len = material.metadata.len(),
        "Fetched chain material"
    );
    Ok(material)
}

/// Next nonce for `address`, pool transactions included
pub fn fetch_nonce<C: RpcClient + ?Sized>(client: &C, address: &str) -> Result<u64, TxWrapperError> {
    expect_u64(&client.call("system_accountNextIndex", json!([address]))?, "nonce")
}
