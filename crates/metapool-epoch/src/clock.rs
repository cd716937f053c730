// crates/metapool-epoch/src/clock.rs
//
// EpochClock: caches the current epoch boundary and refreshes it from the
// epoch source only once the cached epoch has ended.
//
// Concurrent lookups that find the cache expired collapse into a single
// fetch: the first caller fetches while holding the state lock, later callers
// wait on the lock and then reuse the outcome of the fetch that completed in
// the meantime (success or failure) instead of starting another one. A
// shared success is reused only if it has not ended at the waiter's `now`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use metapool_core::epoch::EpochInfo;
use metapool_core::error::MetaPoolError;
use metapool_core::traits::EpochSource;

#[derive(Debug, Default)]
struct ClockState {
    cached: Option<EpochInfo>,
    /// Reason of the most recent fetch, if it failed.
    last_failure: Option<String>,
}

/// Cache of the current epoch boundary.
///
/// Starts empty; the first lookup always fetches. Share it between tasks
/// behind an `Arc`.
pub struct EpochClock {
    source: Arc<dyn EpochSource>,
    state: Mutex<ClockState>,
    /// Completed fetches, successful or not. Lets waiters detect that a fetch
    /// finished while they were queued on the lock.
    completed_fetches: AtomicU64,
}

impl EpochClock {
    /// Create a clock with no cached epoch.
    pub fn new(source: Arc<dyn EpochSource>) -> Self {
        Self {
            source,
            state: Mutex::new(ClockState::default()),
            completed_fetches: AtomicU64::new(0),
        }
    }

    /// The current epoch as of `now`.
    ///
    /// Returns the cached epoch while `now < ends_at`; otherwise fetches a new
    /// one and replaces the cache with it.
    ///
    /// # Errors
    /// Returns `MetaPoolError::EpochFetchFailed` if the source fails. The cache
    /// is left untouched, and the error carries an already-expired fallback
    /// boundary for callers that degrade instead of blocking.
    pub async fn current_epoch(&self, now: DateTime<Utc>) -> Result<EpochInfo, MetaPoolError> {
        let seen = self.completed_fetches.load(Ordering::Acquire);
        let mut state = self.state.lock().await;

        if let Some(epoch) = state.cached {
            if !epoch.has_ended(now) {
                return Ok(epoch);
            }
        }

        if self.completed_fetches.load(Ordering::Acquire) != seen {
            if let Some(reason) = &state.last_failure {
                return Err(fetch_failed(reason.clone(), now));
            }
        }

        tracing::debug!("Epoch cache expired, fetching current epoch");
        let outcome = self.source.fetch_epoch().await;
        self.completed_fetches.fetch_add(1, Ordering::AcqRel);

        match outcome {
            Ok(epoch) => {
                tracing::debug!(
                    "Epoch refreshed: ends at {}, duration {} ms",
                    epoch.ends_at(),
                    epoch.duration_ms()
                );
                state.cached = Some(epoch);
                state.last_failure = None;
                Ok(epoch)
            }
            Err(e) => {
                let reason = e.to_string();
                tracing::warn!("Epoch fetch failed: {}", reason);
                state.last_failure = Some(reason.clone());
                Err(fetch_failed(reason, now))
            }
        }
    }

    /// The cached epoch, if any, without fetching.
    pub async fn cached(&self) -> Option<EpochInfo> {
        self.state.lock().await.cached
    }

    /// Drop the cached epoch so the next lookup fetches.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.cached = None;
        state.last_failure = None;
    }
}

fn fetch_failed(reason: String, now: DateTime<Utc>) -> MetaPoolError {
    MetaPoolError::EpochFetchFailed {
        reason,
        fallback_ends_at: EpochInfo::already_ended(now).ends_at(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex as StdMutex;

    /// Serves a scripted sequence of fetch outcomes and counts calls.
    struct ScriptedSource {
        outcomes: StdMutex<Vec<Result<EpochInfo, String>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(mut outcomes: Vec<Result<EpochInfo, String>>) -> Arc<Self> {
            outcomes.reverse();
            Arc::new(Self {
                outcomes: StdMutex::new(outcomes),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl EpochSource for ScriptedSource {
        async fn fetch_epoch(&self) -> Result<EpochInfo, MetaPoolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.outcomes.lock().unwrap().pop();
            match next {
                Some(Ok(epoch)) => Ok(epoch),
                Some(Err(reason)) => Err(MetaPoolError::Network(reason)),
                None => Err(MetaPoolError::Network("script exhausted".to_string())),
            }
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn epoch_ending(at: DateTime<Utc>) -> EpochInfo {
        EpochInfo::new(at, 12 * 3_600_000).unwrap()
    }

    #[tokio::test]
    async fn test_first_call_fetches() {
        let first = epoch_ending(t0() + Duration::hours(5));
        let source = ScriptedSource::new(vec![Ok(first)]);
        let clock = EpochClock::new(source.clone());

        assert!(clock.cached().await.is_none());
        assert_eq!(clock.current_epoch(t0()).await.unwrap(), first);
        assert_eq!(source.calls(), 1);
        assert_eq!(clock.cached().await, Some(first));
    }

    #[tokio::test]
    async fn test_valid_cache_is_reused() {
        let first = epoch_ending(t0() + Duration::hours(5));
        let source = ScriptedSource::new(vec![Ok(first)]);
        let clock = EpochClock::new(source.clone());

        clock.current_epoch(t0()).await.unwrap();
        clock.current_epoch(t0() + Duration::hours(4)).await.unwrap();
        clock
            .current_epoch(t0() + Duration::hours(5) - Duration::milliseconds(1))
            .await
            .unwrap();
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_cache_is_replaced() {
        let first = epoch_ending(t0() + Duration::hours(5));
        let second = epoch_ending(t0() + Duration::hours(17));
        let source = ScriptedSource::new(vec![Ok(first), Ok(second)]);
        let clock = EpochClock::new(source.clone());

        clock.current_epoch(t0()).await.unwrap();
        let refreshed = clock.current_epoch(t0() + Duration::hours(5)).await.unwrap();
        assert_eq!(refreshed, second);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_cache_and_reports_fallback() {
        let first = epoch_ending(t0() + Duration::hours(5));
        let source = ScriptedSource::new(vec![Ok(first), Err("rpc down".to_string())]);
        let clock = EpochClock::new(source.clone());
        clock.current_epoch(t0()).await.unwrap();

        let later = t0() + Duration::hours(6);
        match clock.current_epoch(later).await {
            Err(MetaPoolError::EpochFetchFailed {
                reason,
                fallback_ends_at,
            }) => {
                assert!(reason.contains("rpc down"));
                assert_eq!(fallback_ends_at, later - Duration::hours(12));
            }
            other => panic!("expected EpochFetchFailed, got {:?}", other),
        }
        assert_eq!(clock.cached().await, Some(first));
    }

    #[tokio::test]
    async fn test_sequential_failures_each_retry() {
        let source = ScriptedSource::new(vec![
            Err("timeout".to_string()),
            Ok(epoch_ending(t0() + Duration::hours(1))),
        ]);
        let clock = EpochClock::new(source.clone());

        assert!(clock.current_epoch(t0()).await.is_err());
        assert!(clock.current_epoch(t0()).await.is_ok());
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_reset_forces_fetch() {
        let first = epoch_ending(t0() + Duration::hours(5));
        let source = ScriptedSource::new(vec![Ok(first), Ok(first)]);
        let clock = EpochClock::new(source.clone());

        clock.current_epoch(t0()).await.unwrap();
        clock.reset().await;
        assert!(clock.cached().await.is_none());
        clock.current_epoch(t0()).await.unwrap();
        assert_eq!(source.calls(), 2);
    }
}
