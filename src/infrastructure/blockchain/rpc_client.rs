//! JSON-RPC client for EVM nodes

use alloy_primitives::{Address, TxHash};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::shared::errors::RpcError;

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

impl RpcResponse {
    fn into_result<T: DeserializeOwned>(self) -> Result<T, RpcError> {
        if let Some(err) = self.error {
            return Err(RpcError::Node {
                code: err.code,
                message: err.message,
            });
        }
        let result = self
            .result
            .ok_or_else(|| RpcError::UnexpectedResponse("missing result".to_string()))?;
        serde_json::from_value(result).map_err(|e| RpcError::UnexpectedResponse(e.to_string()))
    }
}

/// Minimal EVM JSON-RPC client over HTTP
pub struct JsonRpcClient {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Create new RPC client
    pub fn new(url: String, timeout: Duration) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!("rpc -> {} #{}", method, id);

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RpcError::Transport(format!("HTTP {}", response.status())));
        }

        let parsed: RpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::UnexpectedResponse(e.to_string()))?;
        parsed.into_result()
    }

    /// `eth_call` against the latest block, returns the raw return data
    pub async fn eth_call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, RpcError> {
        let result: String = self
            .request(
                "eth_call",
                json!([{ "to": to.to_string(), "data": encode_hex(data) }, "latest"]),
            )
            .await?;
        decode_hex(&result)
    }

    /// `eth_sendTransaction`; the node or wallet bridge behind the URL signs
    pub async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: &[u8],
    ) -> Result<TxHash, RpcError> {
        let tx = json!({
            "from": from.to_string(),
            "to": to.to_string(),
            "data": encode_hex(data),
        });
        let result: String = self.request("eth_sendTransaction", json!([tx])).await?;
        TxHash::from_str(&result)
            .map_err(|e| RpcError::UnexpectedResponse(format!("bad tx hash {}: {}", result, e)))
    }

    pub async fn chain_id(&self) -> Result<u64, RpcError> {
        let result: String = self.request("eth_chainId", json!([])).await?;
        parse_quantity(&result)
    }
}

pub fn encode_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

pub fn decode_hex(value: &str) -> Result<Vec<u8>, RpcError> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(stripped)
        .map_err(|e| RpcError::UnexpectedResponse(format!("invalid hex data: {}", e)))
}

/// Parse a JSON-RPC hex quantity such as `"0x89"`
pub fn parse_quantity(value: &str) -> Result<u64, RpcError> {
    let stripped = value.strip_prefix("0x").ok_or_else(|| {
        RpcError::UnexpectedResponse(format!("quantity without 0x prefix: {}", value))
    })?;
    u64::from_str_radix(stripped, 16)
        .map_err(|e| RpcError::UnexpectedResponse(format!("invalid quantity {}: {}", value, e)))
}
