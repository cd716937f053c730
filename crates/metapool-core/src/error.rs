use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::amount::Yocto;

/// Engine-wide error types for the Meta Pool staking engine.
#[derive(Debug, Error)]
pub enum MetaPoolError {
    /// Malformed discount curve (zero target, min above max, bp above 10000).
    #[error("Invalid curve parameters: {0}")]
    InvalidCurveParameters(String),

    /// Amount that cannot be parsed or is not acceptable for the operation.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Epoch boundary with a non-positive duration.
    #[error("Invalid epoch: {0}")]
    InvalidEpoch(String),

    /// The epoch source failed. `fallback_ends_at` is an already-expired
    /// boundary the caller can show so the next check retries the fetch.
    #[error("Epoch fetch failed: {reason}")]
    EpochFetchFailed {
        reason: String,
        fallback_ends_at: DateTime<Utc>,
    },

    /// Negative epoch count reported by the protocol.
    #[error("Invalid wait epochs: {0}")]
    InvalidWaitEpochs(i64),

    /// Requested amount is under the applicable minimum.
    #[error("Amount below minimum: use at least {required}")]
    BelowMinimum { required: Yocto },

    /// Liquid unstake larger than the pool can fund.
    #[error("Not enough liquidity: max is {available}. Use delayed unstake for large amounts")]
    InsufficientLiquidity { available: Yocto },

    /// The unstaking-delay oracle call failed.
    #[error("Unstaking delay query failed: {0}")]
    DelayQueryFailed(String),

    /// Network error (JSON-RPC transport, HTTP status).
    #[error("Network error: {0}")]
    Network(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for MetaPoolError {
    fn from(e: serde_json::Error) -> Self {
        MetaPoolError::Serialization(e.to_string())
    }
}
