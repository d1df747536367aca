//! # verdict
//!
//! **Verdict** is the result-aggregation and event-notification core of a
//! test-execution framework.
//!
//! It collects counts, timing, and failure records from a stream of
//! lifecycle events emitted while a batch of tests executes, and exposes a
//! read-only, thread-safe summary of the run. The crate is designed as a
//! building block: discovering tests, deciding which ones to run, and
//! invoking test code are the caller's job — the caller only needs to emit
//! events conforming to the contract here and to read the resulting
//! summary.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!    Test driver (1..N threads, outside this crate)
//!        │ fire_run_started / fire_test_started / fire_test_failure / ...
//!        ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │ RunNotifier (registration surface + dispatch loop)           │
//! │  - snapshots the listener list per event                     │
//! │  - serializes calls to Delivery::Exclusive listeners         │
//! │  - listener errors/panics → mechanism Failure to the rest    │
//! └──────┬───────────────────────┬──────────────────────┬────────┘
//!        ▼                       ▼                      ▼
//!  ResultListener           LogListener            custom listener
//!        │                 (feature "logging")
//!        ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │ RunResult (the only stateful component)                      │
//! │  - atomic run/ignore counters, accumulated run time          │
//! │  - append-only failure list, readable while appended to      │
//! └──────────────────────┬───────────────────────────────────────┘
//!                        ▼
//!               snapshot::encode / decode
//!               (stable published field layout)
//! ```
//!
//! ### Lifecycle
//! ```text
//! RunResult::new() ──► create_listener() ──► RunNotifier::add_listener()
//!       │                                           │
//!       │          run_started ─ test events ─ run_finished
//!       │                                           │
//!       └────────────── accessors ◄─────────────────┘
//!                          │
//!                 snapshot::encode() ──► bytes ──► snapshot::decode()
//!                                                   (sealed RunResult)
//! ```
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogListener`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use verdict::{Description, ErrorReport, Failure, RunNotifier, RunResult};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let result = RunResult::new();
//!     let notifier = RunNotifier::new();
//!     notifier.add_listener(Arc::new(
//!         result.create_listener().expect("fresh results accept events"),
//!     ));
//!
//!     // The test driver emits lifecycle events as it runs tests.
//!     let suite = Description::suite("all");
//!     let test = Description::test("math::adds");
//!     notifier.fire_run_started(&suite).await;
//!     notifier.fire_test_started(&test).await;
//!     notifier
//!         .fire_test_failure(&Failure::new(
//!             test.clone(),
//!             ErrorReport::new("assertion failed: 2 + 2 == 5"),
//!         ))
//!         .await;
//!     notifier.fire_test_finished(&test).await;
//!     notifier.fire_run_finished(&result).await;
//!
//!     assert_eq!(result.run_count(), 1);
//!     assert_eq!(result.failure_count(), 1);
//!     assert!(!result.was_successful());
//! }
//! ```

mod error;
mod events;
mod listeners;
mod result;

// ---- Public re-exports ----

pub use error::{ListenerError, SnapshotError};
pub use events::{Description, DescriptionKind, ErrorReport, Failure};
pub use listeners::{Delivery, ListenerResult, RunListener, RunNotifier};
pub use result::snapshot;
pub use result::{ResultListener, RunResult};

// Optional: expose a simple built-in logging listener (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use listeners::LogListener;
