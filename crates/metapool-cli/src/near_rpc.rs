// crates/metapool-cli/src/near_rpc.rs
//
// Read-only NEAR JSON-RPC client.
//
// Supplies the engine's external collaborators: contract and account
// snapshots via view calls, the unstaking delay oracle, and the epoch source.
// Nothing here signs or submits transactions.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use metapool_core::amount::Yocto;
use metapool_core::epoch::{EpochInfo, DEFAULT_EPOCH_DURATION_MS};
use metapool_core::error::MetaPoolError;
use metapool_core::state::{AccountInfo, ContractState};
use metapool_core::traits::{EpochSource, UnstakingDelayOracle};

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'a str,
    params: Value,
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Clone, Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<Value>,
}

/// The two block header fields the epoch estimate needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BlockHeader {
    pub height: u64,
    /// Block timestamp in nanoseconds since the unix epoch.
    pub timestamp: u64,
}

/// Client for a NEAR JSON-RPC endpoint, bound to the Meta Pool contract.
#[derive(Debug, Clone)]
pub struct NearRpcClient {
    endpoint: String,
    contract_id: String,
    account_id: Option<String>,
    client: reqwest::Client,
}

impl NearRpcClient {
    pub fn new(
        endpoint: String,
        contract_id: String,
        account_id: Option<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            endpoint,
            contract_id,
            account_id,
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn contract_id(&self) -> &str {
        &self.contract_id
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    /// Send a JSON-RPC call and return its `result`.
    async fn call(&self, method: &str, params: Value) -> Result<Value, MetaPoolError> {
        tracing::debug!("RPC {} -> {}", method, self.endpoint);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: "metapool",
            method,
            params,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| MetaPoolError::Network(format!("{}: {}", method, e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MetaPoolError::Network(format!(
                "{}: HTTP {}",
                method, status
            )));
        }

        let body: JsonRpcResponse = resp
            .json()
            .await
            .map_err(|e| MetaPoolError::Network(format!("{}: {}", method, e)))?;

        if let Some(err) = body.error {
            return Err(MetaPoolError::Network(format!("{}: {}", method, err)));
        }
        body.result
            .ok_or_else(|| MetaPoolError::Network(format!("{}: empty result", method)))
    }

    /// Call a view method on the Meta Pool contract.
    pub async fn view_function<T: DeserializeOwned>(
        &self,
        method: &str,
        args: Value,
    ) -> Result<T, MetaPoolError> {
        let args_base64 = BASE64.encode(serde_json::to_vec(&args)?);
        let result = self
            .call(
                "query",
                json!({
                    "request_type": "call_function",
                    "finality": "final",
                    "account_id": self.contract_id,
                    "method_name": method,
                    "args_base64": args_base64,
                }),
            )
            .await?;
        decode_view_result(method, &result)
    }

    pub async fn fetch_contract_state(&self) -> Result<ContractState, MetaPoolError> {
        self.view_function("get_contract_state", json!({})).await
    }

    pub async fn fetch_account_info(&self) -> Result<AccountInfo, MetaPoolError> {
        let account_id = self.require_account()?;
        self.view_function("get_account_info", json!({ "account_id": account_id }))
            .await
    }

    /// Native NEAR balance of the configured account's wallet.
    pub async fn wallet_balance(&self) -> Result<Yocto, MetaPoolError> {
        let account_id = self.require_account()?;
        let result = self
            .call(
                "query",
                json!({
                    "request_type": "view_account",
                    "finality": "final",
                    "account_id": account_id,
                }),
            )
            .await?;
        let amount = result
            .get("amount")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                MetaPoolError::Serialization("view_account: missing amount".to_string())
            })?;
        Yocto::try_from(amount.to_string())
    }

    async fn block(&self, params: Value) -> Result<BlockHeader, MetaPoolError> {
        let result = self.call("block", params).await?;
        let header = result
            .get("header")
            .cloned()
            .ok_or_else(|| MetaPoolError::Serialization("block: missing header".to_string()))?;
        Ok(serde_json::from_value(header)?)
    }

    async fn epoch_start_height(&self) -> Result<u64, MetaPoolError> {
        let result = self.call("validators", json!([null])).await?;
        result
            .get("epoch_start_height")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                MetaPoolError::Serialization("validators: missing epoch_start_height".to_string())
            })
    }

    async fn epoch_length(&self) -> Result<u64, MetaPoolError> {
        let result = self
            .call("EXPERIMENTAL_protocol_config", json!({ "finality": "final" }))
            .await?;
        result
            .get("epoch_length")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                MetaPoolError::Serialization("protocol config: missing epoch_length".to_string())
            })
    }

    fn require_account(&self) -> Result<&str, MetaPoolError> {
        self.account_id().ok_or_else(|| {
            MetaPoolError::Config(
                "no account configured: pass --account or set account_id".to_string(),
            )
        })
    }
}

#[async_trait]
impl EpochSource for NearRpcClient {
    async fn fetch_epoch(&self) -> Result<EpochInfo, MetaPoolError> {
        let start_height = self.epoch_start_height().await?;
        let latest = self.block(json!({ "finality": "final" })).await?;
        let start = self.block(json!({ "block_id": start_height })).await?;
        let epoch_length = self.epoch_length().await?;
        epoch_from_blocks(&start, &latest, epoch_length)
    }
}

#[async_trait]
impl UnstakingDelayOracle for NearRpcClient {
    async fn compute_current_unstaking_delay(&self, amount: Yocto) -> Result<i64, MetaPoolError> {
        self.view_function("compute_current_unstaking_delay", json!({ "amount": amount }))
            .await
            .map_err(|e| MetaPoolError::DelayQueryFailed(e.to_string()))
    }
}

/// Decode the byte-array JSON payload of a `call_function` query.
pub fn decode_view_result<T: DeserializeOwned>(
    method: &str,
    result: &Value,
) -> Result<T, MetaPoolError> {
    if let Some(err) = result.get("error").and_then(Value::as_str) {
        return Err(MetaPoolError::Network(format!("{}: {}", method, err)));
    }
    let raw = result
        .get("result")
        .cloned()
        .ok_or_else(|| MetaPoolError::Serialization(format!("{}: missing result bytes", method)))?;
    let bytes: Vec<u8> = serde_json::from_value(raw)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Project the end of the current epoch from the average block time so far.
///
/// `duration = elapsed_ms * epoch_length / blocks_elapsed` and
/// `ends_at = start + duration`. With no blocks produced yet the nominal
/// 12-hour epoch is assumed.
pub fn epoch_from_blocks(
    start: &BlockHeader,
    latest: &BlockHeader,
    epoch_length: u64,
) -> Result<EpochInfo, MetaPoolError> {
    let start_ms = start.timestamp / 1_000_000;
    let latest_ms = latest.timestamp / 1_000_000;
    let blocks = latest.height.saturating_sub(start.height);

    let duration_ms = if blocks == 0 || latest_ms <= start_ms {
        DEFAULT_EPOCH_DURATION_MS
    } else {
        let elapsed_ms = u128::from(latest_ms - start_ms);
        let projected = elapsed_ms * u128::from(epoch_length) / u128::from(blocks);
        u64::try_from(projected).map_err(|_| {
            MetaPoolError::InvalidEpoch(format!("projected duration {} ms too large", projected))
        })?
    };

    let ends_ms = start_ms
        .checked_add(duration_ms)
        .and_then(|ms| i64::try_from(ms).ok())
        .ok_or_else(|| MetaPoolError::InvalidEpoch("epoch end out of range".to_string()))?;
    let ends_at = DateTime::<Utc>::from_timestamp_millis(ends_ms)
        .ok_or_else(|| MetaPoolError::InvalidEpoch("epoch end out of range".to_string()))?;

    EpochInfo::new(ends_at, duration_ms)
}
