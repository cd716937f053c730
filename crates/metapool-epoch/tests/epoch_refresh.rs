// crates/metapool-epoch/tests/epoch_refresh.rs
//
// Integration tests for the epoch clock under concurrent lookups and for the
// delayed-unstake planner wired to fake collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Notify;

use metapool_core::amount::Yocto;
use metapool_core::epoch::{EpochInfo, MS_PER_HOUR};
use metapool_core::error::MetaPoolError;
use metapool_core::state::AccountInfo;
use metapool_core::traits::{EpochSource, UnstakingDelayOracle};
use metapool_epoch::{DelayedUnstakePlan, DelayedUnstakePlanner, EpochClock};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
}

fn epoch_ending_in_one_hour() -> EpochInfo {
    EpochInfo::new(now() + Duration::hours(1), 12 * MS_PER_HOUR).unwrap()
}

/// Epoch source whose fetch blocks until the test opens the gate.
struct GatedSource {
    calls: AtomicUsize,
    gate: Notify,
    outcome: Result<EpochInfo, String>,
}

impl GatedSource {
    fn new(outcome: Result<EpochInfo, String>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            gate: Notify::new(),
            outcome,
        })
    }

    fn open(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl EpochSource for GatedSource {
    async fn fetch_epoch(&self) -> Result<EpochInfo, MetaPoolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        self.outcome.clone().map_err(MetaPoolError::Network)
    }
}

/// Epoch source that takes a little while to answer.
struct SlowSource {
    calls: AtomicUsize,
}

#[async_trait]
impl EpochSource for SlowSource {
    async fn fetch_epoch(&self) -> Result<EpochInfo, MetaPoolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(StdDuration::from_millis(20)).await;
        Ok(epoch_ending_in_one_hour())
    }
}

/// Epoch source that answers each fetch with the next epoch of a sequence,
/// after a short delay so concurrent callers queue behind it.
struct SequenceSource {
    calls: AtomicUsize,
    epochs: StdMutex<Vec<EpochInfo>>,
}

impl SequenceSource {
    fn new(mut epochs: Vec<EpochInfo>) -> Arc<Self> {
        epochs.reverse();
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            epochs: StdMutex::new(epochs),
        })
    }
}

#[async_trait]
impl EpochSource for SequenceSource {
    async fn fetch_epoch(&self) -> Result<EpochInfo, MetaPoolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(StdDuration::from_millis(10)).await;
        let next = self.epochs.lock().unwrap().pop();
        next.ok_or_else(|| MetaPoolError::Network("no more epochs".to_string()))
    }
}

struct FixedOracle {
    calls: AtomicUsize,
    answer: Result<i64, String>,
}

impl FixedOracle {
    fn new(answer: Result<i64, String>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            answer,
        })
    }
}

#[async_trait]
impl UnstakingDelayOracle for FixedOracle {
    async fn compute_current_unstaking_delay(&self, _amount: Yocto) -> Result<i64, MetaPoolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone().map_err(MetaPoolError::Network)
    }
}

fn account_with_stake(near: u64) -> AccountInfo {
    AccountInfo {
        account_id: "alice.near".to_string(),
        stnear: Yocto::from_near(near),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// EpochClock concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_concurrent_lookups_share_one_fetch() {
    let source = GatedSource::new(Ok(epoch_ending_in_one_hour()));
    let clock = EpochClock::new(source.clone());

    let (a, b, _) = tokio::join!(clock.current_epoch(now()), clock.current_epoch(now()), async {
        tokio::task::yield_now().await;
        source.open();
    });

    let a = a.unwrap();
    let b = b.unwrap();
    assert_eq!(a, b);
    assert_eq!(a, epoch_ending_in_one_hour());
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_lookups_share_one_failure() {
    let source = GatedSource::new(Err("rpc unavailable".to_string()));
    let clock = EpochClock::new(source.clone());

    let (a, b, _) = tokio::join!(clock.current_epoch(now()), clock.current_epoch(now()), async {
        tokio::task::yield_now().await;
        source.open();
    });

    assert!(matches!(a, Err(MetaPoolError::EpochFetchFailed { .. })));
    assert!(matches!(b, Err(MetaPoolError::EpochFetchFailed { .. })));
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert!(clock.cached().await.is_none());
}

#[tokio::test]
async fn test_queued_caller_refetches_when_shared_epoch_ended_for_it() {
    let first = EpochInfo::new(now() + Duration::hours(1), 12 * MS_PER_HOUR).unwrap();
    let second = EpochInfo::new(now() + Duration::hours(13), 12 * MS_PER_HOUR).unwrap();
    let source = SequenceSource::new(vec![first, second]);
    let clock = EpochClock::new(source.clone());

    let later = now() + Duration::hours(3);
    let (a, b) = tokio::join!(clock.current_epoch(now()), clock.current_epoch(later));

    assert_eq!(a.unwrap(), first);
    let b = b.unwrap();
    assert_eq!(b, second);
    assert!(!b.has_ended(later));
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert_eq!(clock.cached().await, Some(second));
}

#[tokio::test]
async fn test_queued_caller_reuses_shared_epoch_still_valid_for_it() {
    let first = EpochInfo::new(now() + Duration::hours(1), 12 * MS_PER_HOUR).unwrap();
    let source = SequenceSource::new(vec![first]);
    let clock = EpochClock::new(source.clone());

    let (a, b) = tokio::join!(
        clock.current_epoch(now()),
        clock.current_epoch(now() + Duration::minutes(30))
    );

    assert_eq!(a.unwrap(), first);
    assert_eq!(b.unwrap(), first);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_tasks_single_fetch() {
    let source = Arc::new(SlowSource {
        calls: AtomicUsize::new(0),
    });
    let clock = Arc::new(EpochClock::new(source.clone()));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let clock = clock.clone();
            tokio::spawn(async move { clock.current_epoch(now()).await })
        })
        .collect();

    for handle in handles {
        let epoch = handle.await.unwrap().unwrap();
        assert_eq!(epoch, epoch_ending_in_one_hour());
    }
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------------
// DelayedUnstakePlanner
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_plan_combines_oracle_and_clock() {
    let source = Arc::new(SlowSource {
        calls: AtomicUsize::new(0),
    });
    let clock = Arc::new(EpochClock::new(source.clone()));
    let oracle = FixedOracle::new(Ok(4));
    let planner = DelayedUnstakePlanner::new(clock, oracle.clone());

    let plan = planner
        .plan(now(), Yocto::from_near(10), &account_with_stake(50))
        .await
        .unwrap();

    match plan {
        DelayedUnstakePlan::Ready {
            amount,
            wait_epochs,
            estimate,
        } => {
            assert_eq!(amount, Yocto::from_near(10));
            assert_eq!(wait_epochs, 4);
            // 1h to the boundary + 3 * 12h, plus the 2h margin
            assert_eq!(estimate.hours, 39);
        }
        other => panic!("expected Ready, got {:?}", other),
    }
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_plan_oracle_failure_skips_clock() {
    let source = Arc::new(SlowSource {
        calls: AtomicUsize::new(0),
    });
    let clock = Arc::new(EpochClock::new(source.clone()));
    let oracle = FixedOracle::new(Err("view call failed".to_string()));
    let planner = DelayedUnstakePlanner::new(clock, oracle);

    let result = planner
        .plan(now(), Yocto::from_near(10), &account_with_stake(50))
        .await;

    assert!(matches!(result, Err(MetaPoolError::DelayQueryFailed(_))));
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_plan_below_minimum_skips_oracle() {
    let source = Arc::new(SlowSource {
        calls: AtomicUsize::new(0),
    });
    let clock = Arc::new(EpochClock::new(source));
    let oracle = FixedOracle::new(Ok(4));
    let planner = DelayedUnstakePlanner::new(clock, oracle.clone());

    let result = planner
        .plan(now(), Yocto::parse_near("0.5").unwrap(), &account_with_stake(50))
        .await;

    match result {
        Err(MetaPoolError::BelowMinimum { required }) => assert_eq!(required, Yocto::from_near(1)),
        other => panic!("expected BelowMinimum, got {:?}", other),
    }
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_plan_requires_withdraw_first() {
    let source = Arc::new(SlowSource {
        calls: AtomicUsize::new(0),
    });
    let clock = Arc::new(EpochClock::new(source));
    let oracle = FixedOracle::new(Ok(4));
    let planner = DelayedUnstakePlanner::new(clock, oracle.clone());

    let account = AccountInfo {
        unstaked: Yocto::from_near(7),
        can_withdraw: true,
        ..account_with_stake(50)
    };
    let plan = planner.plan(now(), Yocto::from_near(10), &account).await.unwrap();

    assert_eq!(
        plan,
        DelayedUnstakePlan::WithdrawFirst {
            unstaked: Yocto::from_near(7)
        }
    );
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_pending_withdrawal_uses_clock_only_while_waiting() {
    let source = Arc::new(SlowSource {
        calls: AtomicUsize::new(0),
    });
    let clock = Arc::new(EpochClock::new(source.clone()));
    let planner = DelayedUnstakePlanner::new(clock, FixedOracle::new(Ok(1)));

    let ready = AccountInfo {
        unstaked: Yocto::from_near(7),
        can_withdraw: true,
        ..account_with_stake(50)
    };
    let pending = planner.pending_withdrawal(now(), &ready).await.unwrap().unwrap();
    assert!(pending.can_withdraw);
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);

    let waiting = AccountInfo {
        can_withdraw: false,
        unstake_full_epochs_wait_left: 1,
        ..ready
    };
    let pending = planner.pending_withdrawal(now(), &waiting).await.unwrap().unwrap();
    assert_eq!(pending.hours, 3);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);

    assert!(planner
        .pending_withdrawal(now(), &account_with_stake(50))
        .await
        .unwrap()
        .is_none());
}
