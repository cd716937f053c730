// crates/metapool-core/src/traits.rs

use async_trait::async_trait;

use crate::amount::Yocto;
use crate::epoch::EpochInfo;
use crate::error::MetaPoolError;
use crate::state::{AccountInfo, ContractState};

/// Read access to the latest contract state snapshot.
///
/// The snapshot may be stale; refresh cadence is the implementor's choice.
pub trait ContractStateReader: Send + Sync {
    fn contract_state(&self) -> ContractState;
}

/// Read access to the connected account's balances.
pub trait AccountBalanceReader: Send + Sync {
    fn account_info(&self) -> AccountInfo;
}

/// The protocol's view of how long a delayed unstake must wait.
#[async_trait]
pub trait UnstakingDelayOracle: Send + Sync {
    /// Number of epochs a delayed unstake of `amount` waits before it can be
    /// withdrawn.
    ///
    /// Implementations report failures as `MetaPoolError::DelayQueryFailed`.
    async fn compute_current_unstaking_delay(&self, amount: Yocto) -> Result<i64, MetaPoolError>;
}

/// Source of the current epoch boundary.
///
/// Implemented by the NEAR JSON-RPC client in metapool-cli.
#[async_trait]
pub trait EpochSource: Send + Sync {
    /// Fetch the current epoch. May fail transiently.
    async fn fetch_epoch(&self) -> Result<EpochInfo, MetaPoolError>;
}
