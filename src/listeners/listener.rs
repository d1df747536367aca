//! # Run listener trait.
//!
//! Provides [`RunListener`], the extension point for observing a test run.
//! Every method defaults to a no-op returning `Ok(())`, so listeners
//! implement only the events they care about.
//!
//! ## Event ordering
//! For one run, the event source guarantees:
//! - `run_started` fires once, before any other event;
//! - `run_finished` fires exactly once, after every other event, carrying
//!   the final [`RunResult`];
//! - `suite_started`/`suite_finished` are optional but paired when emitted
//!   (not every event source emits them at all);
//! - `test_started`/`test_finished` are paired 1:1 per non-ignored test;
//! - `test_failure` and `test_assumption_failure` fire between the
//!   started/finished pair of the same test;
//! - `test_ignored` replaces the started/finished pair entirely: an
//!   ignored test sees no other event.
//!
//! When tests run in parallel these pairings hold per test, but events for
//! *different* tests interleave arbitrarily across threads.
//!
//! ## Delivery capability
//! [`RunListener::delivery`] declares whether the notifier must serialize
//! calls to this listener ([`Delivery::Exclusive`], the default) or may
//! invoke it from multiple threads with no mutual exclusion
//! ([`Delivery::ConcurrencySafe`]). The capability is checked once at
//! registration, not per call.
//!
//! ## Failing listeners
//! Any method may return a [`ListenerError`](crate::ListenerError). The
//! notifier converts it (and panics) into a `test_failure` carrying the
//! mechanism sentinel [`Description`](crate::Description), delivered to
//! the remaining listeners; see `notifier.rs`.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use verdict::{Failure, ListenerResult, RunListener};
//!
//! struct Cowbell;
//!
//! #[async_trait]
//! impl RunListener for Cowbell {
//!     async fn test_failure(&self, _failure: &Failure) -> ListenerResult {
//!         println!("*clang*");
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &'static str { "cowbell" }
//! }
//! ```

use async_trait::async_trait;

use crate::error::ListenerError;
use crate::events::{Description, Failure};
use crate::result::RunResult;

/// Outcome of one listener callback.
pub type ListenerResult = Result<(), ListenerError>;

/// How the notifier may deliver events to a listener.
///
/// Checked once when the listener is registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// The notifier serializes all calls to this listener behind a single
    /// critical section; its methods never execute concurrently with each
    /// other. This is the default.
    Exclusive,
    /// The listener synchronizes internally; the notifier may invoke its
    /// methods from multiple threads with no implicit mutual exclusion.
    ConcurrencySafe,
}

/// Observer of test-run lifecycle events.
///
/// Register implementations with a [`RunNotifier`](crate::RunNotifier) to
/// be notified of events emitted while a batch of tests executes. All
/// methods default to no-ops.
///
/// ### Implementation requirements
/// - Complete in bounded time; avoid blocking the executor.
/// - Return [`ListenerError`] rather than panicking (panics are caught,
///   but reported with less detail).
/// - Declare [`Delivery::ConcurrencySafe`] only if the listener really
///   tolerates concurrent calls.
#[async_trait]
pub trait RunListener: Send + Sync + 'static {
    /// Called once before any tests of the suite described by `suite` run.
    ///
    /// May be called on an arbitrary thread.
    async fn run_started(&self, suite: &Description) -> ListenerResult {
        let _ = suite;
        Ok(())
    }

    /// Called once when all tests announced by [`Self::run_started`] have
    /// finished, with the summary of the run.
    ///
    /// May be called on an arbitrary thread.
    async fn run_finished(&self, result: &RunResult) -> ListenerResult {
        let _ = result;
        Ok(())
    }

    /// Called when a test suite is about to start.
    ///
    /// If this fires for a description, [`Self::suite_finished`] later
    /// fires for the same description. Not every event source emits suite
    /// events; listeners must handle [`Self::test_started`] calls with no
    /// enclosing suite bracket.
    async fn suite_started(&self, suite: &Description) -> ListenerResult {
        let _ = suite;
        Ok(())
    }

    /// Called when a test suite has finished, whether it succeeded or not.
    ///
    /// Never fires for a description without a prior
    /// [`Self::suite_started`] for the same description.
    async fn suite_finished(&self, suite: &Description) -> ListenerResult {
        let _ = suite;
        Ok(())
    }

    /// Called when an atomic test is about to start.
    ///
    /// An ignored test is never started.
    async fn test_started(&self, test: &Description) -> ListenerResult {
        let _ = test;
        Ok(())
    }

    /// Called when an atomic test has finished, whether it passed or failed.
    ///
    /// Always preceded by [`Self::test_started`] for the same description.
    /// An ignored test is never finished.
    async fn test_finished(&self, test: &Description) -> ListenerResult {
        let _ = test;
        Ok(())
    }

    /// Called when an atomic test fails, between the started/finished pair
    /// of the same test.
    ///
    /// Also called with the mechanism sentinel description when a
    /// *listener* raised an error while handling any event, to report that
    /// malfunction to the remaining listeners. Mechanism failures may
    /// arrive on an arbitrary thread, outside any started/finished pair.
    async fn test_failure(&self, failure: &Failure) -> ListenerResult {
        let _ = failure;
        Ok(())
    }

    /// Called when a test aborts because a precondition it assumes is
    /// false, between the started/finished pair of the same test.
    ///
    /// Treated as a pass for statistics: the test still reaches
    /// [`Self::test_finished`] and counts toward the run count, never
    /// toward failures or ignores.
    async fn test_assumption_failure(&self, failure: &Failure) -> ListenerResult {
        let _ = failure;
        Ok(())
    }

    /// Called when a test will not be run at all.
    ///
    /// Implies that neither [`Self::test_started`] nor
    /// [`Self::test_finished`] nor any failure event fires for this
    /// description.
    async fn test_ignored(&self, test: &Description) -> ListenerResult {
        let _ = test;
        Ok(())
    }

    /// Declares how the notifier may deliver events to this listener.
    ///
    /// Defaults to [`Delivery::Exclusive`]; override to
    /// [`Delivery::ConcurrencySafe`] only for listeners that synchronize
    /// internally.
    fn delivery(&self) -> Delivery {
        Delivery::Exclusive
    }

    /// Returns the listener name used when reporting malfunctions.
    ///
    /// Prefer short, descriptive names. The default uses
    /// `type_name::<Self>()`, which can be verbose.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    #[async_trait]
    impl RunListener for Silent {}

    #[tokio::test]
    async fn test_defaults_are_no_ops() {
        let listener = Silent;
        let suite = Description::suite("all");
        assert!(listener.run_started(&suite).await.is_ok());
        assert!(listener.test_started(&Description::test("t")).await.is_ok());
        assert!(listener.test_ignored(&Description::test("t")).await.is_ok());
        assert_eq!(listener.delivery(), Delivery::Exclusive);
    }
}
