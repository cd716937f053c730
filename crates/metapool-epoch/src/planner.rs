// crates/metapool-epoch/src/planner.rs
//
// DelayedUnstakePlanner: the delayed-unstake flow up to (not including)
// transaction submission.
//
// 1. An account with a finished, unwithdrawn unstake must withdraw first.
// 2. The amount is checked against the minimum unstake policy.
// 3. The oracle reports how many epochs the unstake waits.
// 4. The epoch clock supplies the current boundary and the estimator combines them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use metapool_core::amount::Yocto;
use metapool_core::epoch::TimingEstimate;
use metapool_core::error::MetaPoolError;
use metapool_core::state::AccountInfo;
use metapool_core::traits::UnstakingDelayOracle;
use metapool_economics::minimum::{MinimumUnstakeGuard, UnstakeRequest};

use crate::clock::EpochClock;
use crate::timing::{PendingWithdrawal, UnstakeTimingEstimator};

/// Outcome of planning a delayed unstake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DelayedUnstakePlan {
    /// A previous delayed unstake is withdrawable and must be withdrawn before
    /// a new waiting period starts.
    WithdrawFirst { unstaked: Yocto },
    /// The unstake can proceed; funds arrive after the estimated wait.
    Ready {
        amount: Yocto,
        wait_epochs: i64,
        estimate: TimingEstimate,
    },
}

pub struct DelayedUnstakePlanner {
    clock: Arc<EpochClock>,
    oracle: Arc<dyn UnstakingDelayOracle>,
    guard: MinimumUnstakeGuard,
    estimator: UnstakeTimingEstimator,
}

impl DelayedUnstakePlanner {
    pub fn new(clock: Arc<EpochClock>, oracle: Arc<dyn UnstakingDelayOracle>) -> Self {
        Self {
            clock,
            oracle,
            guard: MinimumUnstakeGuard::default(),
            estimator: UnstakeTimingEstimator::default(),
        }
    }

    pub fn with_guard(mut self, guard: MinimumUnstakeGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn with_estimator(mut self, estimator: UnstakeTimingEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Plan a delayed unstake of `amount` for `account`.
    ///
    /// # Errors
    /// - `InvalidAmount` / `BelowMinimum` if the amount fails validation.
    /// - `DelayQueryFailed` if the oracle fails; the clock is not consulted.
    /// - `EpochFetchFailed` if the epoch boundary cannot be refreshed.
    /// - `InvalidWaitEpochs` if the oracle reports a negative count.
    pub async fn plan(
        &self,
        now: DateTime<Utc>,
        amount: Yocto,
        account: &AccountInfo,
    ) -> Result<DelayedUnstakePlan, MetaPoolError> {
        if account.must_withdraw_first() {
            return Ok(DelayedUnstakePlan::WithdrawFirst {
                unstaked: account.unstaked,
            });
        }

        let request = UnstakeRequest::new(amount)?;
        request.validate(&self.guard, account.stnear)?;

        let wait_epochs = self
            .oracle
            .compute_current_unstaking_delay(request.amount())
            .await
            .map_err(|e| match e {
                MetaPoolError::DelayQueryFailed(_) => e,
                other => MetaPoolError::DelayQueryFailed(other.to_string()),
            })?;

        let epoch = self.clock.current_epoch(now).await?;
        let estimate = self.estimator.estimate_wait(now, wait_epochs, &epoch)?;

        tracing::debug!(
            "Delayed unstake of {} waits {} epochs (~{} hours)",
            request.amount(),
            wait_epochs,
            estimate.hours
        );

        Ok(DelayedUnstakePlan::Ready {
            amount: request.amount(),
            wait_epochs,
            estimate,
        })
    }

    /// Status of the account's in-progress delayed unstake, if any.
    ///
    /// Only consults the epoch clock when the funds are still waiting.
    pub async fn pending_withdrawal(
        &self,
        now: DateTime<Utc>,
        account: &AccountInfo,
    ) -> Result<Option<PendingWithdrawal>, MetaPoolError> {
        if !account.has_unstaked() {
            return Ok(None);
        }
        if account.can_withdraw {
            return Ok(Some(PendingWithdrawal::ready(account.unstaked)));
        }
        let epoch = self.clock.current_epoch(now).await?;
        Ok(self.estimator.pending_withdrawal(now, account, &epoch))
    }
}
