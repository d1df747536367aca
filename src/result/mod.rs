//! Result aggregation: run statistics and their persistence.
//!
//! ## Contents
//! - [`RunResult`] — the summary of one test run: counters, failures,
//!   accumulated run time.
//! - [`ResultListener`] — the concurrency-safe listener that feeds a
//!   result, created via [`RunResult::create_listener`].
//! - [`snapshot`] — encode/decode over the stable published field layout.
//!
//! ## Quick reference
//! - **Writers**: the event source, through a registered `ResultListener`.
//! - **Readers**: whoever owns the `RunResult`, through its accessors,
//!   typically once after `run_finished` (reads during the run are safe
//!   but see the per-field consistency notes in `aggregate.rs`).

mod aggregate;
pub mod snapshot;

pub use aggregate::{ResultListener, RunResult};
