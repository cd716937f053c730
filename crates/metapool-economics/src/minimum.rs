// crates/metapool-economics/src/minimum.rs
//
// Minimum unstake policy.
//
// A dust threshold of 1 NEAR applies to every unstake, liquid or delayed.
// An account whose whole stake is at or below the threshold may still leave,
// but only by unstaking (essentially) all of it, so sub-minimum residues are
// never stranded.

use metapool_core::amount::{Yocto, YOCTO_PER_NEAR};
use metapool_core::error::MetaPoolError;

/// Smallest regular unstake: 1 NEAR.
pub const MIN_UNSTAKE: Yocto = Yocto::from_near(1);

/// Tolerance for a full-balance unstake in the dust regime: 0.0000001 NEAR.
pub const DUST_EPSILON: Yocto = Yocto::from_yocto(YOCTO_PER_NEAR / 10_000_000);

/// Validates unstake amounts against the dust-aware minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimumUnstakeGuard {
    min_unstake: Yocto,
    dust_epsilon: Yocto,
}

impl MinimumUnstakeGuard {
    pub fn new(min_unstake: Yocto, dust_epsilon: Yocto) -> Self {
        Self {
            min_unstake,
            dust_epsilon,
        }
    }

    pub fn min_unstake(&self) -> Yocto {
        self.min_unstake
    }

    pub fn dust_epsilon(&self) -> Yocto {
        self.dust_epsilon
    }

    /// Check `amount` against the policy for an account holding `account_balance`.
    ///
    /// # Errors
    /// Returns `MetaPoolError::BelowMinimum` with the amount the user must
    /// unstake instead: the whole balance when the account is at or below the
    /// threshold, the threshold otherwise.
    pub fn check(&self, amount: Yocto, account_balance: Yocto) -> Result<(), MetaPoolError> {
        if account_balance <= self.min_unstake {
            if amount + self.dust_epsilon < account_balance {
                return Err(MetaPoolError::BelowMinimum {
                    required: account_balance,
                });
            }
        } else if amount < self.min_unstake {
            return Err(MetaPoolError::BelowMinimum {
                required: self.min_unstake,
            });
        }
        Ok(())
    }
}

impl Default for MinimumUnstakeGuard {
    fn default() -> Self {
        Self::new(MIN_UNSTAKE, DUST_EPSILON)
    }
}

/// A requested unstake amount, guaranteed positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnstakeRequest {
    amount: Yocto,
}

impl UnstakeRequest {
    /// # Errors
    /// Returns `MetaPoolError::InvalidAmount` if `amount` is zero.
    pub fn new(amount: Yocto) -> Result<Self, MetaPoolError> {
        if amount.is_zero() {
            return Err(MetaPoolError::InvalidAmount(
                "amount should be greater than zero".to_string(),
            ));
        }
        Ok(Self { amount })
    }

    pub fn amount(&self) -> Yocto {
        self.amount
    }

    /// Validate this request against the guard and the caller's staked balance.
    pub fn validate(
        &self,
        guard: &MinimumUnstakeGuard,
        account_balance: Yocto,
    ) -> Result<(), MetaPoolError> {
        guard.check(self.amount, account_balance)
    }
}
