//! Event delivery: the listener contract and the notifier.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   test driver ── fire_*() ──► RunNotifier ──► RunListener callbacks
//!                                    │
//!                               ┌────┴─────┬──────────────┐
//!                               ▼          ▼              ▼
//!                        ResultListener  LogListener   custom
//!                        (aggregation)   (stdout)      (user logic)
//! ```
//!
//! ## Contents
//! - [`RunListener`], [`ListenerResult`], [`Delivery`] — the event
//!   contract: nine optional callbacks plus the delivery capability.
//! - [`RunNotifier`] — registration surface and dispatch loop, including
//!   malfunction isolation (listener errors become mechanism failures).
//! - `LogListener` (feature `logging`) — built-in stdout listener.
//!
//! ## Implementing custom listeners
//! ```rust
//! use async_trait::async_trait;
//! use verdict::{Failure, ListenerResult, RunListener};
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl RunListener for FailureCounter {
//!     async fn test_failure(&self, failure: &Failure) -> ListenerResult {
//!         eprintln!("failed: {failure}");
//!         Ok(())
//!     }
//! }
//! ```

mod listener;
mod notifier;

#[cfg(feature = "logging")]
mod log;

pub use listener::{Delivery, ListenerResult, RunListener};
pub use notifier::RunNotifier;

#[cfg(feature = "logging")]
pub use log::LogListener;
