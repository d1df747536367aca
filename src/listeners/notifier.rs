//! # RunNotifier: fan-out of lifecycle events to registered listeners.
//!
//! [`RunNotifier`] is the registration surface and dispatch loop of the
//! event contract. The component driving test execution holds one notifier
//! per run and calls its `fire_*` methods; the notifier delivers each event
//! to every registered [`RunListener`].
//!
//! ## Architecture
//! ```text
//! Event source (test driver, 1..N threads)
//!     │ fire_test_started(..) / fire_test_failure(..) / ...
//!     ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ RunNotifier                                                 │
//! │  - snapshot of registered listeners per dispatch            │
//! │  - Exclusive listeners wrapped in a serializing gate        │
//! │  - listener errors/panics → mechanism Failure to the rest   │
//! └───────┬──────────────────────┬──────────────────────┬───────┘
//!         ▼                      ▼                      ▼
//!   ResultListener          LogListener           custom listener
//!   (ConcurrencySafe)       (Exclusive)           (either)
//! ```
//!
//! ## Rules
//! - Dispatch iterates a point-in-time snapshot of the listener list;
//!   registering or removing a listener during a fire does not affect that
//!   fire.
//! - A listener whose [`RunListener::delivery`] returns
//!   [`Delivery::Exclusive`] is wrapped at registration so that no two of
//!   its callbacks ever run concurrently. [`Delivery::ConcurrencySafe`]
//!   listeners are invoked as-is, possibly from several threads at once.
//! - A listener that returns an error or panics while handling an event is
//!   reported to the listeners that behaved in that same dispatch, via
//!   `test_failure` with the mechanism sentinel description. It stays
//!   registered; delivery to the others is never aborted.
//! - Errors raised while reporting a mechanism failure are swallowed: the
//!   malfunction report is one level deep, never recursive, never retried.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::Mutex as AsyncMutex;

use crate::error::ListenerError;
use crate::events::{Description, Failure};
use crate::result::RunResult;

use super::listener::{Delivery, ListenerResult, RunListener};

/// One lifecycle event, with its payload, as routed internally.
enum Notification {
    RunStarted(Description),
    RunFinished(RunResult),
    SuiteStarted(Description),
    SuiteFinished(Description),
    TestStarted(Description),
    TestFinished(Description),
    TestFailure(Failure),
    TestAssumptionFailure(Failure),
    TestIgnored(Description),
}

/// A registered listener: the listener as handed in (for identity-based
/// removal) plus the handle dispatch actually calls (wrapped when the
/// listener requires exclusive delivery).
#[derive(Clone)]
struct Registered {
    name: &'static str,
    raw: Arc<dyn RunListener>,
    dispatch: Arc<dyn RunListener>,
}

/// Registration surface and dispatch loop for run lifecycle events.
///
/// Thread-safe: `fire_*` methods may be called concurrently from the
/// threads executing tests. Per-test event pairing (started before
/// finished, failures in between) is the event source's responsibility;
/// the notifier only guarantees delivery and malfunction isolation.
#[derive(Default)]
pub struct RunNotifier {
    listeners: Mutex<Vec<Registered>>,
}

impl RunNotifier {
    /// Creates a notifier with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for all subsequent events.
    ///
    /// The listener's [`RunListener::delivery`] capability is checked here,
    /// once: listeners reporting [`Delivery::Exclusive`] are wrapped in a
    /// serializing gate before being added.
    pub fn add_listener(&self, listener: Arc<dyn RunListener>) {
        let dispatch: Arc<dyn RunListener> = match listener.delivery() {
            Delivery::ConcurrencySafe => Arc::clone(&listener),
            Delivery::Exclusive => Arc::new(ExclusiveGate {
                inner: Arc::clone(&listener),
                gate: AsyncMutex::new(()),
            }),
        };
        let registered = Registered {
            name: listener.name(),
            raw: listener,
            dispatch,
        };
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(registered);
    }

    /// Removes a previously registered listener.
    ///
    /// Identity-based: removes the entry registered from the same `Arc` as
    /// `listener` (all of them, if it was registered more than once).
    pub fn remove_listener(&self, listener: &Arc<dyn RunListener>) {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|reg| !Arc::ptr_eq(&reg.raw, listener));
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// True if no listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fires `run_started`: the run for the top-level suite is beginning.
    pub async fn fire_run_started(&self, suite: &Description) {
        self.dispatch(Notification::RunStarted(suite.clone())).await;
    }

    /// Fires `run_finished` with the final result of the run.
    pub async fn fire_run_finished(&self, result: &RunResult) {
        self.dispatch(Notification::RunFinished(result.clone()))
            .await;
    }

    /// Fires `suite_started` for a suite about to run.
    pub async fn fire_suite_started(&self, suite: &Description) {
        self.dispatch(Notification::SuiteStarted(suite.clone()))
            .await;
    }

    /// Fires `suite_finished` for a suite that has run.
    pub async fn fire_suite_finished(&self, suite: &Description) {
        self.dispatch(Notification::SuiteFinished(suite.clone()))
            .await;
    }

    /// Fires `test_started` for an atomic test about to run.
    pub async fn fire_test_started(&self, test: &Description) {
        self.dispatch(Notification::TestStarted(test.clone())).await;
    }

    /// Fires `test_finished` for an atomic test that has run.
    pub async fn fire_test_finished(&self, test: &Description) {
        self.dispatch(Notification::TestFinished(test.clone()))
            .await;
    }

    /// Fires `test_failure` for a failed test.
    pub async fn fire_test_failure(&self, failure: &Failure) {
        self.dispatch(Notification::TestFailure(failure.clone()))
            .await;
    }

    /// Fires `test_assumption_failure` for a test aborted by a false
    /// precondition.
    pub async fn fire_test_assumption_failure(&self, failure: &Failure) {
        self.dispatch(Notification::TestAssumptionFailure(failure.clone()))
            .await;
    }

    /// Fires `test_ignored` for a test that will not run.
    pub async fn fire_test_ignored(&self, test: &Description) {
        self.dispatch(Notification::TestIgnored(test.clone())).await;
    }

    /// Delivers one event to every registered listener, isolating
    /// malfunctions.
    ///
    /// Listeners that error or panic are collected; after the primary
    /// delivery loop, each malfunction is reported to the listeners that
    /// behaved, as a `test_failure` with the mechanism description.
    async fn dispatch(&self, event: Notification) {
        let snapshot: Vec<Registered> = self
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        let mut safe = Vec::with_capacity(snapshot.len());
        let mut malfunctions = Vec::new();

        for reg in snapshot {
            match Self::deliver(&reg.dispatch, &event).await {
                Ok(()) => safe.push(reg),
                Err(err) => {
                    let err =
                        ListenerError::with_source(format!("listener '{}' failed", reg.name), err);
                    malfunctions.push(Failure::mechanism(&err));
                }
            }
        }

        for failure in malfunctions {
            let report = Notification::TestFailure(failure);
            for reg in &safe {
                // One level deep: errors while reporting are dropped.
                let _ = Self::deliver(&reg.dispatch, &report).await;
            }
        }
    }

    /// Invokes the listener method matching `event`, converting panics into
    /// [`ListenerError`].
    async fn deliver(
        listener: &Arc<dyn RunListener>,
        event: &Notification,
    ) -> ListenerResult {
        let fut = async {
            match event {
                Notification::RunStarted(suite) => listener.run_started(suite).await,
                Notification::RunFinished(result) => listener.run_finished(result).await,
                Notification::SuiteStarted(suite) => listener.suite_started(suite).await,
                Notification::SuiteFinished(suite) => listener.suite_finished(suite).await,
                Notification::TestStarted(test) => listener.test_started(test).await,
                Notification::TestFinished(test) => listener.test_finished(test).await,
                Notification::TestFailure(failure) => listener.test_failure(failure).await,
                Notification::TestAssumptionFailure(failure) => {
                    listener.test_assumption_failure(failure).await
                }
                Notification::TestIgnored(test) => listener.test_ignored(test).await,
            }
        };
        match std::panic::AssertUnwindSafe(fut).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => Err(ListenerError::from_panic(panic.as_ref())),
        }
    }
}

/// Serializing adapter for [`Delivery::Exclusive`] listeners.
///
/// Every callback takes the gate before forwarding, so the wrapped
/// listener's methods never execute concurrently with each other. The
/// wrapper itself is therefore safe to call from any thread.
struct ExclusiveGate {
    inner: Arc<dyn RunListener>,
    gate: AsyncMutex<()>,
}

#[async_trait]
impl RunListener for ExclusiveGate {
    async fn run_started(&self, suite: &Description) -> ListenerResult {
        let _gate = self.gate.lock().await;
        self.inner.run_started(suite).await
    }

    async fn run_finished(&self, result: &RunResult) -> ListenerResult {
        let _gate = self.gate.lock().await;
        self.inner.run_finished(result).await
    }

    async fn suite_started(&self, suite: &Description) -> ListenerResult {
        let _gate = self.gate.lock().await;
        self.inner.suite_started(suite).await
    }

    async fn suite_finished(&self, suite: &Description) -> ListenerResult {
        let _gate = self.gate.lock().await;
        self.inner.suite_finished(suite).await
    }

    async fn test_started(&self, test: &Description) -> ListenerResult {
        let _gate = self.gate.lock().await;
        self.inner.test_started(test).await
    }

    async fn test_finished(&self, test: &Description) -> ListenerResult {
        let _gate = self.gate.lock().await;
        self.inner.test_finished(test).await
    }

    async fn test_failure(&self, failure: &Failure) -> ListenerResult {
        let _gate = self.gate.lock().await;
        self.inner.test_failure(failure).await
    }

    async fn test_assumption_failure(&self, failure: &Failure) -> ListenerResult {
        let _gate = self.gate.lock().await;
        self.inner.test_assumption_failure(failure).await
    }

    async fn test_ignored(&self, test: &Description) -> ListenerResult {
        let _gate = self.gate.lock().await;
        self.inner.test_ignored(test).await
    }

    fn delivery(&self) -> Delivery {
        // The gate provides the serialization, so the wrapper itself can be
        // driven from any thread.
        Delivery::ConcurrencySafe
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::events::ErrorReport;

    struct Failing;

    #[async_trait]
    impl RunListener for Failing {
        async fn test_started(&self, _test: &Description) -> ListenerResult {
            Err(ListenerError::new("no thanks"))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct Panicking;

    #[async_trait]
    impl RunListener for Panicking {
        async fn test_started(&self, _test: &Description) -> ListenerResult {
            panic!("listener bug");
        }
    }

    struct Counting {
        started: AtomicU64,
        mechanism_failures: AtomicU64,
    }

    impl Counting {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                started: AtomicU64::new(0),
                mechanism_failures: AtomicU64::new(0),
            })
        }
    }

    #[async_trait]
    impl RunListener for Counting {
        async fn test_started(&self, _test: &Description) -> ListenerResult {
            self.started.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        async fn test_failure(&self, failure: &Failure) -> ListenerResult {
            if failure.description().is_mechanism() {
                self.mechanism_failures.fetch_add(1, Ordering::Relaxed);
            }
            Ok(())
        }

        fn delivery(&self) -> Delivery {
            Delivery::ConcurrencySafe
        }
    }

    #[tokio::test]
    async fn test_register_and_remove() {
        let notifier = RunNotifier::new();
        let counting = Counting::new();
        let listener: Arc<dyn RunListener> = counting.clone();

        notifier.add_listener(Arc::clone(&listener));
        assert_eq!(notifier.len(), 1);

        notifier.fire_test_started(&Description::test("t1")).await;
        assert_eq!(counting.started.load(Ordering::Relaxed), 1);

        notifier.remove_listener(&listener);
        assert!(notifier.is_empty());

        notifier.fire_test_started(&Description::test("t2")).await;
        assert_eq!(counting.started.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_failing_listener_reported_to_remaining() {
        let notifier = RunNotifier::new();
        let counting = Counting::new();
        notifier.add_listener(Arc::new(Failing));
        notifier.add_listener(counting.clone());

        notifier.fire_test_started(&Description::test("t")).await;

        assert_eq!(counting.started.load(Ordering::Relaxed), 1);
        assert_eq!(counting.mechanism_failures.load(Ordering::Relaxed), 1);
        // The misbehaving listener stays registered.
        assert_eq!(notifier.len(), 2);
    }

    #[tokio::test]
    async fn test_panicking_listener_reported_to_remaining() {
        let notifier = RunNotifier::new();
        let counting = Counting::new();
        notifier.add_listener(Arc::new(Panicking));
        notifier.add_listener(counting.clone());

        notifier.fire_test_started(&Description::test("t")).await;

        assert_eq!(counting.mechanism_failures.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_ordinary_failure_is_not_a_mechanism_report() {
        let notifier = RunNotifier::new();
        let counting = Counting::new();
        notifier.add_listener(counting.clone());

        let failure = Failure::new(Description::test("t"), ErrorReport::new("assert"));
        notifier.fire_test_failure(&failure).await;

        assert_eq!(counting.mechanism_failures.load(Ordering::Relaxed), 0);
    }

    /// Detects overlapping callback execution.
    struct OverlapProbe {
        in_flight: AtomicBool,
        overlapped: AtomicBool,
    }

    #[async_trait]
    impl RunListener for OverlapProbe {
        async fn test_finished(&self, _test: &Description) -> ListenerResult {
            if self.in_flight.swap(true, Ordering::SeqCst) {
                self.overlapped.store(true, Ordering::SeqCst);
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
            self.in_flight.store(false, Ordering::SeqCst);
            Ok(())
        }
        // Delivery::Exclusive by default: the notifier must serialize.
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_exclusive_listener_calls_are_serialized() {
        let probe = Arc::new(OverlapProbe {
            in_flight: AtomicBool::new(false),
            overlapped: AtomicBool::new(false),
        });
        let notifier = Arc::new(RunNotifier::new());
        notifier.add_listener(probe.clone());

        let mut handles = Vec::new();
        for t in 0..4 {
            let notifier = Arc::clone(&notifier);
            handles.push(tokio::spawn(async move {
                for i in 0..10 {
                    let test = Description::test(format!("t{t}-{i}"));
                    notifier.fire_test_finished(&test).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(!probe.overlapped.load(Ordering::SeqCst));
    }
}
