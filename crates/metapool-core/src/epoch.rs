// crates/metapool-core/src/epoch.rs
//
// Epoch boundary and delayed-unstake timing value types.
//
// The protocol settles unstake requests at epoch boundaries. An EpochInfo is
// produced by an external epoch source and replaced wholesale when it expires.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::MetaPoolError;

/// One hour in milliseconds.
pub const MS_PER_HOUR: u64 = 60 * 60 * 1_000;

/// Nominal NEAR epoch length (~12 hours), used when no measured duration is available.
pub const DEFAULT_EPOCH_DURATION_MS: u64 = 12 * MS_PER_HOUR;

/// The end time and length of the current protocol epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EpochInfo {
    ends_at: DateTime<Utc>,
    duration_ms: u64,
}

impl EpochInfo {
    /// Create an EpochInfo.
    ///
    /// # Errors
    /// Returns `MetaPoolError::InvalidEpoch` if `duration_ms` is zero or does
    /// not fit a signed millisecond span.
    pub fn new(ends_at: DateTime<Utc>, duration_ms: u64) -> Result<Self, MetaPoolError> {
        if duration_ms == 0 || i64::try_from(duration_ms).is_err() {
            return Err(MetaPoolError::InvalidEpoch(format!(
                "epoch duration must be positive, got {} ms",
                duration_ms
            )));
        }
        Ok(Self {
            ends_at,
            duration_ms,
        })
    }

    /// A boundary that ended 12 hours before `now`.
    ///
    /// Shown when the epoch source is unreachable: it never looks still-valid,
    /// so the next lookup retries the fetch.
    pub fn already_ended(now: DateTime<Utc>) -> Self {
        Self {
            ends_at: now - Duration::milliseconds(DEFAULT_EPOCH_DURATION_MS as i64),
            duration_ms: DEFAULT_EPOCH_DURATION_MS,
        }
    }

    pub fn ends_at(&self) -> DateTime<Utc> {
        self.ends_at
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// True once `now` has reached the end of the epoch.
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        now >= self.ends_at
    }

    /// Milliseconds from `now` until the epoch ends, floored at zero.
    pub fn ms_until_end(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((self.ends_at - now).num_milliseconds()).unwrap_or(0)
    }
}

/// Estimated wait before a delayed unstake becomes withdrawable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimingEstimate {
    /// Whole hours to show the user, safety margin included.
    pub hours: u64,
    /// Unrounded wait in milliseconds, before the safety margin.
    pub wait_ms: u64,
    /// End of the epoch the estimate was derived from.
    pub epoch_ends_at: DateTime<Utc>,
}
