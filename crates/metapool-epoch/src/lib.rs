// crates/metapool-epoch/src/lib.rs
//
// metapool-epoch: epoch boundary caching and delayed-unstake timing.
//
// EpochClock owns the only shared mutable state in the engine (the cached
// epoch boundary). UnstakeTimingEstimator is pure arithmetic over an
// EpochInfo. DelayedUnstakePlanner wires both to the unstaking-delay oracle.

pub mod clock;
pub mod planner;
pub mod timing;

pub use clock::EpochClock;
pub use planner::{DelayedUnstakePlan, DelayedUnstakePlanner};
pub use timing::{
    estimate_wait, PendingWithdrawal, UnstakeTimingEstimator, SAFETY_MARGIN_HOURS,
    WITHDRAWABLE_DISPLAY_MARGIN_MS,
};
