// crates/metapool-core/src/state.rs
//
// Contract and account snapshots as returned by the Meta Pool contract's
// `get_contract_state` and `get_account_info` view methods.
//
// Snapshots are immutable values; the engine never mutates them and a fresh
// one replaces the old on every refresh.

use serde::{Deserialize, Deserializer, Serialize};

use crate::amount::Yocto;

/// Snapshot of the pool-wide contract state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractState {
    /// NEAR available in the liquidity pool to fund liquid unstakes.
    pub nslp_liquidity: Yocto,
    /// Liquidity level at which the swap discount reaches its minimum.
    pub nslp_target: Yocto,
    /// Discount applied right now, in basis points.
    pub nslp_current_discount_basis_points: u16,
    pub nslp_min_discount_basis_points: u16,
    pub nslp_max_discount_basis_points: u16,
    /// stNEAR held by the liquidity pool.
    #[serde(default)]
    pub nslp_stnear_balance: Yocto,
    #[serde(default)]
    pub total_for_staking: Yocto,
    #[serde(default)]
    pub accumulated_staked_rewards: Yocto,
    /// Smallest accepted stake deposit.
    #[serde(default)]
    pub min_deposit_amount: Yocto,
    #[serde(default)]
    pub staking_pools_count: u16,
}

/// Snapshot of a single account's balances in the contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    #[serde(default)]
    pub account_id: String,
    /// Staked balance in stNEAR.
    #[serde(alias = "st_near")]
    pub stnear: Yocto,
    #[serde(default)]
    pub meta: Yocto,
    /// Balance of a delayed unstake in progress (or ready to withdraw).
    #[serde(default)]
    pub unstaked: Yocto,
    #[serde(default)]
    pub can_withdraw: bool,
    /// Full epochs still to wait before `unstaked` can be withdrawn.
    #[serde(default)]
    pub unstake_full_epochs_wait_left: u16,
    #[serde(default)]
    pub nslp_share_value: Yocto,
    #[serde(default)]
    pub nslp_share_bp: u16,
    #[serde(default)]
    pub trip_rewards: Yocto,
    /// Start of the rewards trip, as a unix timestamp in milliseconds.
    #[serde(default, deserialize_with = "u64_from_string_or_number")]
    pub trip_start: u64,
}

impl AccountInfo {
    /// True if a delayed unstake is in progress or waiting for withdrawal.
    pub fn has_unstaked(&self) -> bool {
        !self.unstaked.is_zero()
    }

    /// True if a finished delayed unstake must be withdrawn before a new one
    /// is started.
    pub fn must_withdraw_first(&self) -> bool {
        self.has_unstaked() && self.can_withdraw
    }
}

/// The contract encodes u64 as a JSON string; older deployments used a number.
fn u64_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
