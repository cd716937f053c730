// crates/metapool-cli/src/snapshot.rs
//
// Snapshot: the latest contract (and optionally account) state fetched from
// the chain. Commands read it through the engine's reader traits.

use metapool_core::error::MetaPoolError;
use metapool_core::state::{AccountInfo, ContractState};
use metapool_core::traits::{AccountBalanceReader, ContractStateReader};

use crate::near_rpc::NearRpcClient;

#[derive(Debug, Clone)]
pub struct Snapshot {
    state: ContractState,
    account: Option<AccountInfo>,
}

impl Snapshot {
    /// Fetch the contract state, and the account info when `with_account`.
    pub async fn refresh(
        client: &NearRpcClient,
        with_account: bool,
    ) -> Result<Self, MetaPoolError> {
        let state = client.fetch_contract_state().await?;
        let account = if with_account {
            Some(client.fetch_account_info().await?)
        } else {
            None
        };
        Ok(Self { state, account })
    }

    pub fn has_account(&self) -> bool {
        self.account.is_some()
    }
}

impl ContractStateReader for Snapshot {
    fn contract_state(&self) -> ContractState {
        self.state.clone()
    }
}

impl AccountBalanceReader for Snapshot {
    /// Empty balances when no account was fetched.
    fn account_info(&self) -> AccountInfo {
        self.account.clone().unwrap_or_default()
    }
}
