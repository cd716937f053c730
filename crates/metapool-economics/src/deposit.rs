// crates/metapool-economics/src/deposit.rs
//
// Minimums for stake deposits and liquidity-pool operations.
//
// Stake deposits must meet the contract's `min_deposit_amount`; adding
// liquidity requires twice that. When staking the whole wallet, 0.01 NEAR is
// left behind for transaction fees and storage.

use metapool_core::amount::{Yocto, YOCTO_PER_NEAR};
use metapool_core::error::MetaPoolError;
use metapool_core::state::ContractState;

/// Wallet balance kept back by "stake max": 0.01 NEAR.
pub const STORAGE_RESERVE: Yocto = Yocto::from_yocto(YOCTO_PER_NEAR / 100);

/// # Errors
/// Returns `MetaPoolError::BelowMinimum` if `amount < min_deposit_amount`.
pub fn check_min_deposit(amount: Yocto, state: &ContractState) -> Result<(), MetaPoolError> {
    if amount < state.min_deposit_amount {
        return Err(MetaPoolError::BelowMinimum {
            required: state.min_deposit_amount,
        });
    }
    Ok(())
}

/// Smallest accepted liquidity deposit: twice the stake minimum.
pub fn min_add_liquidity(state: &ContractState) -> Yocto {
    state.min_deposit_amount + state.min_deposit_amount
}

/// # Errors
/// Returns `MetaPoolError::BelowMinimum` if `amount` is under `min_add_liquidity`.
pub fn check_add_liquidity(amount: Yocto, state: &ContractState) -> Result<(), MetaPoolError> {
    let required = min_add_liquidity(state);
    if amount < required {
        return Err(MetaPoolError::BelowMinimum { required });
    }
    Ok(())
}

/// # Errors
/// Returns `MetaPoolError::InvalidAmount` for a zero amount.
pub fn check_remove_liquidity(amount: Yocto) -> Result<(), MetaPoolError> {
    if amount.is_zero() {
        return Err(MetaPoolError::InvalidAmount(
            "amount should be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Largest amount "stake max" offers for a wallet holding `wallet_balance`.
pub fn max_stakeable(wallet_balance: Yocto) -> Yocto {
    wallet_balance.saturating_sub(STORAGE_RESERVE)
}
