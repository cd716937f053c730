// crates/metapool-epoch/src/timing.rs
//
// Delayed-unstake wait estimation.
//
// A delayed unstake becomes withdrawable after the protocol-reported number
// of epochs. The first of those epochs is the one in progress, so the wait is
// the time left in the current epoch plus (wait_epochs - 1) full epochs.
// Settlement in practice lags the nominal boundary, so a fixed safety margin
// is added to the hour-rounded result.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use metapool_core::amount::Yocto;
use metapool_core::epoch::{EpochInfo, TimingEstimate, MS_PER_HOUR};
use metapool_core::error::MetaPoolError;
use metapool_core::state::AccountInfo;

/// Hours added to every displayed wait estimate.
pub const SAFETY_MARGIN_HOURS: u64 = 2;

/// Offset past the computed boundary for the displayed withdrawable-at time.
pub const WITHDRAWABLE_DISPLAY_MARGIN_MS: u64 = MS_PER_HOUR;

/// Combines an epoch boundary with a wait-epochs count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnstakeTimingEstimator {
    safety_margin_hours: u64,
}

impl UnstakeTimingEstimator {
    pub fn new(safety_margin_hours: u64) -> Self {
        Self {
            safety_margin_hours,
        }
    }

    pub fn safety_margin_hours(&self) -> u64 {
        self.safety_margin_hours
    }

    /// Estimated wait for a new delayed unstake that must wait `wait_epochs`.
    ///
    /// `wait_epochs == 0` counts only the rest of the current epoch. Hours are
    /// rounded half-up before the margin is added.
    ///
    /// # Errors
    /// Returns `MetaPoolError::InvalidWaitEpochs` if `wait_epochs` is negative.
    pub fn estimate_wait(
        &self,
        now: DateTime<Utc>,
        wait_epochs: i64,
        epoch: &EpochInfo,
    ) -> Result<TimingEstimate, MetaPoolError> {
        let wait_epochs = u64::try_from(wait_epochs)
            .map_err(|_| MetaPoolError::InvalidWaitEpochs(wait_epochs))?;

        let wait_ms = epoch
            .ms_until_end(now)
            .saturating_add(extra_epochs_ms(wait_epochs, epoch));
        let rounded_hours = wait_ms.saturating_add(MS_PER_HOUR / 2) / MS_PER_HOUR;

        Ok(TimingEstimate {
            hours: rounded_hours.saturating_add(self.safety_margin_hours),
            wait_ms,
            epoch_ends_at: epoch.ends_at(),
        })
    }

    /// Status of an account's in-progress delayed unstake.
    ///
    /// Returns `None` when the account has nothing unstaked. Hours here are
    /// truncated rather than rounded, and `withdrawable_at` is pushed one hour
    /// past the computed boundary.
    pub fn pending_withdrawal(
        &self,
        now: DateTime<Utc>,
        account: &AccountInfo,
        epoch: &EpochInfo,
    ) -> Option<PendingWithdrawal> {
        if !account.has_unstaked() {
            return None;
        }
        if account.can_withdraw {
            return Some(PendingWithdrawal::ready(account.unstaked));
        }

        let extra_ms = extra_epochs_ms(u64::from(account.unstake_full_epochs_wait_left), epoch);
        let wait_ms = epoch.ms_until_end(now).saturating_add(extra_ms);
        let offset_ms = extra_ms.saturating_add(WITHDRAWABLE_DISPLAY_MARGIN_MS);

        Some(PendingWithdrawal {
            amount: account.unstaked,
            can_withdraw: false,
            hours: (wait_ms / MS_PER_HOUR).saturating_add(self.safety_margin_hours),
            withdrawable_at: i64::try_from(offset_ms)
                .ok()
                .and_then(|ms| epoch.ends_at().checked_add_signed(Duration::milliseconds(ms))),
        })
    }
}

impl Default for UnstakeTimingEstimator {
    fn default() -> Self {
        Self::new(SAFETY_MARGIN_HOURS)
    }
}

/// `estimate_wait` with the default safety margin.
pub fn estimate_wait(
    now: DateTime<Utc>,
    wait_epochs: i64,
    epoch: &EpochInfo,
) -> Result<TimingEstimate, MetaPoolError> {
    UnstakeTimingEstimator::default().estimate_wait(now, wait_epochs, epoch)
}

/// Full epochs after the current one: `(n - 1) * duration`, zero for `n == 0`.
fn extra_epochs_ms(wait_epochs: u64, epoch: &EpochInfo) -> u64 {
    wait_epochs
        .saturating_sub(1)
        .saturating_mul(epoch.duration_ms())
}

/// An account's delayed unstake that has not been withdrawn yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingWithdrawal {
    pub amount: Yocto,
    pub can_withdraw: bool,
    /// Whole hours left, safety margin included. Zero when withdrawable.
    pub hours: u64,
    pub withdrawable_at: Option<DateTime<Utc>>,
}

impl PendingWithdrawal {
    pub fn ready(amount: Yocto) -> Self {
        Self {
            amount,
            can_withdraw: true,
            hours: 0,
            withdrawable_at: None,
        }
    }
}
