//! # RunResult: aggregated statistics of one test run.
//!
//! [`RunResult`] collects and summarizes information from running multiple
//! tests: how many ran, how many were ignored, which failed, and how long
//! the whole run took. It is fed through a [`ResultListener`] — a
//! concurrency-safe [`RunListener`](crate::RunListener) created by
//! [`RunResult::create_listener`] and registered with the notifier — and
//! read through side-effect-free accessors.
//!
//! ## Rules
//! - Scalar counters are atomics; the failure list is an append-only
//!   vector behind a read/write lock. A reader iterating while a writer
//!   appends never observes an error or a torn entry.
//! - Accessors read their own field only: no cross-field snapshot is
//!   guaranteed. A reader may observe the run count incremented slightly
//!   before or after a concurrently appended failure becomes visible.
//! - Failure order is delivery order per call; when several threads
//!   deliver failures concurrently, no global cross-thread order is
//!   promised.
//! - A result restored from a snapshot is sealed: the producing run
//!   already finished, so [`RunResult::create_listener`] returns `None`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::events::{Description, Failure};
use crate::listeners::{Delivery, ListenerResult, RunListener};

/// Current wall-clock time in milliseconds since the Unix epoch.
fn wall_clock_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Mutable state shared between a [`RunResult`] and its listener.
struct ResultState {
    /// Tests run so far, whether passed or failed: the number of
    /// `test_finished` deliveries. Excludes ignored tests but includes
    /// those with failed assumptions.
    count: AtomicU64,
    /// Tests ignored so far. Excludes tests with failed assumptions.
    ignore_count: AtomicU64,
    /// Failures collected so far, in delivery order.
    failures: RwLock<Vec<Failure>>,
    /// Accumulated milliseconds between `run_started` and `run_finished`.
    run_time: AtomicU64,
    /// Wall clock at `run_started`; only meaningful during a run.
    start_time: AtomicU64,
    /// Set when restored from a snapshot: no further event delivery.
    sealed: bool,
}

impl ResultState {
    fn read_failures(&self) -> std::sync::RwLockReadGuard<'_, Vec<Failure>> {
        self.failures.read().unwrap_or_else(|e| e.into_inner())
    }
}

/// Summary of a test run, live or restored.
///
/// Created empty at run start and mutated only through event delivery (via
/// the listener from [`Self::create_listener`]) until the run ends; or
/// reconstructed wholesale by [`snapshot::decode`](crate::snapshot::decode),
/// which fixes all fields from stored values.
///
/// Cloning is cheap and shares the underlying state, so the result handed
/// to `run_finished` observes the same counters as the original.
#[derive(Clone)]
pub struct RunResult {
    state: Arc<ResultState>,
}

impl RunResult {
    /// Creates an empty result: all counters zero, no failures.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(ResultState {
                count: AtomicU64::new(0),
                ignore_count: AtomicU64::new(0),
                failures: RwLock::new(Vec::new()),
                run_time: AtomicU64::new(0),
                start_time: AtomicU64::new(0),
                sealed: false,
            }),
        }
    }

    /// Rebuilds a result from persisted values.
    ///
    /// The atomics are fresh copies seeded from the decoded fields, and the
    /// result is sealed against further event delivery.
    pub(crate) fn restored(
        count: u64,
        ignore_count: u64,
        failures: Vec<Failure>,
        run_time_millis: u64,
        start_time_millis: u64,
    ) -> Self {
        Self {
            state: Arc::new(ResultState {
                count: AtomicU64::new(count),
                ignore_count: AtomicU64::new(ignore_count),
                failures: RwLock::new(failures),
                run_time: AtomicU64::new(run_time_millis),
                start_time: AtomicU64::new(start_time_millis),
                sealed: true,
            }),
        }
    }

    /// Creates the listener that feeds this result, for registration with
    /// a [`RunNotifier`](crate::RunNotifier).
    ///
    /// Returns `None` if the result was restored from a snapshot: the run
    /// that produced it already finished, so it accepts no further events.
    #[must_use]
    pub fn create_listener(&self) -> Option<ResultListener> {
        if self.state.sealed {
            return None;
        }
        Some(ResultListener {
            state: Arc::clone(&self.state),
        })
    }

    /// Number of tests run so far, whether passed or failed.
    ///
    /// This is the number of `test_finished` deliveries, and hence of
    /// `test_started` deliveries. It excludes ignored tests but includes
    /// those with failed assumptions.
    #[must_use]
    pub fn run_count(&self) -> u64 {
        self.state.count.load(Ordering::Relaxed)
    }

    /// Number of tests that failed during the run.
    ///
    /// Includes neither ignored tests nor those with failed assumptions.
    /// Always equal to `self.failures().len()`.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.state.read_failures().len()
    }

    /// Number of tests ignored during the run.
    ///
    /// Does not include tests with failed assumptions.
    #[must_use]
    pub fn ignore_count(&self) -> u64 {
        self.state.ignore_count.load(Ordering::Relaxed)
    }

    /// Time the whole run took: the span between `run_started` and
    /// `run_finished`.
    #[must_use]
    pub fn run_time(&self) -> Duration {
        Duration::from_millis(self.state.run_time.load(Ordering::Relaxed))
    }

    /// The failures collected so far, in delivery order.
    ///
    /// Returns a point-in-time copy; appends that race this call may or
    /// may not be included, but the copy is always internally consistent.
    #[must_use]
    pub fn failures(&self) -> Vec<Failure> {
        self.state.read_failures().clone()
    }

    /// True if the whole run succeeded, i.e. no failure was recorded.
    #[must_use]
    pub fn was_successful(&self) -> bool {
        self.state.read_failures().is_empty()
    }

    /// True if this result was restored from a snapshot and accepts no
    /// further event delivery.
    #[must_use]
    pub fn is_restored(&self) -> bool {
        self.state.sealed
    }

    /// Wall clock recorded at `run_started`, epoch milliseconds.
    pub(crate) fn start_time_millis(&self) -> u64 {
        self.state.start_time.load(Ordering::Relaxed)
    }

    /// Accumulated run time in milliseconds, as persisted.
    pub(crate) fn run_time_millis(&self) -> u64 {
        self.state.run_time.load(Ordering::Relaxed)
    }
}

impl Default for RunResult {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RunResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunResult")
            .field("run_count", &self.run_count())
            .field("failure_count", &self.failure_count())
            .field("ignore_count", &self.ignore_count())
            .field("run_time", &self.run_time())
            .field("restored", &self.is_restored())
            .finish()
    }
}

/// The concurrency-safe listener feeding a [`RunResult`].
///
/// A distinct type holding a shared handle to the result's state, so the
/// result can be read while its listener is still registered. Declares
/// [`Delivery::ConcurrencySafe`]: the event source may call it from many
/// threads at once; every mutation is an atomic increment or an append
/// under a short write lock.
pub struct ResultListener {
    state: Arc<ResultState>,
}

#[async_trait]
impl RunListener for ResultListener {
    async fn run_started(&self, _suite: &Description) -> ListenerResult {
        self.state
            .start_time
            .store(wall_clock_millis(), Ordering::Relaxed);
        Ok(())
    }

    async fn run_finished(&self, _result: &RunResult) -> ListenerResult {
        let end = wall_clock_millis();
        let start = self.state.start_time.load(Ordering::Relaxed);
        self.state
            .run_time
            .fetch_add(end.saturating_sub(start), Ordering::Relaxed);
        Ok(())
    }

    async fn test_finished(&self, _test: &Description) -> ListenerResult {
        self.state.count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn test_failure(&self, failure: &Failure) -> ListenerResult {
        self.state
            .failures
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(failure.clone());
        Ok(())
    }

    async fn test_assumption_failure(&self, _failure: &Failure) -> ListenerResult {
        // Same as passing: no counter moves. The test still reaches
        // test_finished and counts toward the run count.
        Ok(())
    }

    async fn test_ignored(&self, _test: &Description) -> ListenerResult {
        self.state.ignore_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn delivery(&self) -> Delivery {
        Delivery::ConcurrencySafe
    }

    fn name(&self) -> &'static str {
        "result-aggregator"
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::events::ErrorReport;

    fn fresh() -> (RunResult, ResultListener) {
        let result = RunResult::new();
        let listener = result.create_listener().expect("fresh result");
        (result, listener)
    }

    #[tokio::test]
    async fn test_three_clean_tests() {
        let (result, listener) = fresh();
        listener.run_started(&Description::suite("all")).await.unwrap();
        for i in 0..3 {
            let test = Description::test(format!("t{i}"));
            listener.test_started(&test).await.unwrap();
            listener.test_finished(&test).await.unwrap();
        }
        listener.run_finished(&result).await.unwrap();

        assert_eq!(result.run_count(), 3);
        assert_eq!(result.failure_count(), 0);
        assert!(result.was_successful());
    }

    #[tokio::test]
    async fn test_one_failing_test() {
        let (result, listener) = fresh();
        let test = Description::test("t");
        let failure = Failure::new(test.clone(), ErrorReport::new("boom"));

        listener.test_started(&test).await.unwrap();
        listener.test_failure(&failure).await.unwrap();
        listener.test_finished(&test).await.unwrap();

        assert_eq!(result.failure_count(), 1);
        assert_eq!(result.failures(), vec![failure]);
        assert!(!result.was_successful());
    }

    #[tokio::test]
    async fn test_ignored_tests_only() {
        let (result, listener) = fresh();
        listener.test_ignored(&Description::test("a")).await.unwrap();
        listener.test_ignored(&Description::test("b")).await.unwrap();

        assert_eq!(result.ignore_count(), 2);
        assert_eq!(result.run_count(), 0);
    }

    #[tokio::test]
    async fn test_assumption_failure_counts_as_pass() {
        let (result, listener) = fresh();
        let test = Description::test("t");
        let failure = Failure::new(test.clone(), ErrorReport::new("assumed"));

        listener.test_started(&test).await.unwrap();
        listener.test_assumption_failure(&failure).await.unwrap();
        listener.test_finished(&test).await.unwrap();

        assert_eq!(result.run_count(), 1);
        assert_eq!(result.failure_count(), 0);
        assert_eq!(result.ignore_count(), 0);
        assert!(result.was_successful());
    }

    #[tokio::test]
    async fn test_failure_order_is_delivery_order() {
        let (result, listener) = fresh();
        let failures: Vec<Failure> = (0..5)
            .map(|i| {
                Failure::new(
                    Description::test(format!("t{i}")),
                    ErrorReport::new(format!("err{i}")),
                )
            })
            .collect();
        for failure in &failures {
            listener.test_failure(failure).await.unwrap();
        }

        assert_eq!(result.failure_count(), failures.len());
        assert_eq!(result.failures(), failures);
    }

    #[tokio::test]
    async fn test_run_time_accumulates() {
        let (result, listener) = fresh();
        listener.run_started(&Description::suite("all")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        listener.run_finished(&result).await.unwrap();

        assert!(result.run_time() >= Duration::from_millis(10));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_finishes_lose_no_updates() {
        const TASKS: u64 = 8;
        const PER_TASK: u64 = 1000;

        let (result, listener) = fresh();
        let listener = Arc::new(listener);

        let mut handles = Vec::new();
        for t in 0..TASKS {
            let listener = Arc::clone(&listener);
            handles.push(tokio::spawn(async move {
                for i in 0..PER_TASK {
                    let test = Description::test(format!("t{t}-{i}"));
                    listener.test_finished(&test).await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(result.run_count(), TASKS * PER_TASK);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_tolerate_concurrent_appends() {
        let (result, listener) = fresh();
        let listener = Arc::new(listener);

        let writer = {
            let listener = Arc::clone(&listener);
            tokio::spawn(async move {
                for i in 0..500 {
                    let failure = Failure::new(
                        Description::test(format!("t{i}")),
                        ErrorReport::new("boom"),
                    );
                    listener.test_failure(&failure).await.unwrap();
                }
            })
        };
        let reader = {
            let result = result.clone();
            tokio::spawn(async move {
                let mut last = 0;
                while last < 500 {
                    let seen = result.failures();
                    assert!(seen.len() >= last);
                    last = seen.len();
                    tokio::task::yield_now().await;
                }
            })
        };

        writer.await.unwrap();
        reader.await.unwrap();
        assert_eq!(result.failure_count(), 500);
    }
}
