//! # Simple logging listener for debugging and demos.
//!
//! [`LogListener`] prints one human-readable line per lifecycle event to
//! stdout. Primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [run-started] suite=all
//! [test-started] test=math::adds
//! [test-failed] math::adds: assertion failed
//! [test-ignored] test=io::slow
//! [run-finished] run=3 failed=1 ignored=1 time=12ms
//! ```

use async_trait::async_trait;

use crate::events::{Description, Failure};
use crate::result::RunResult;

use super::listener::{ListenerResult, RunListener};

/// Simple stdout logging listener.
///
/// Enabled via the `logging` feature. Keeps the default
/// [`Delivery::Exclusive`](super::Delivery::Exclusive) capability so lines
/// from parallel tests never interleave mid-event.
///
/// Not intended for production use; implement a custom
/// [`RunListener`] for structured logging or metrics collection.
#[derive(Default)]
pub struct LogListener;

#[async_trait]
impl RunListener for LogListener {
    async fn run_started(&self, suite: &Description) -> ListenerResult {
        println!("[run-started] suite={suite}");
        Ok(())
    }

    async fn run_finished(&self, result: &RunResult) -> ListenerResult {
        println!(
            "[run-finished] run={} failed={} ignored={} time={:?}",
            result.run_count(),
            result.failure_count(),
            result.ignore_count(),
            result.run_time(),
        );
        Ok(())
    }

    async fn suite_started(&self, suite: &Description) -> ListenerResult {
        println!("[suite-started] suite={suite}");
        Ok(())
    }

    async fn suite_finished(&self, suite: &Description) -> ListenerResult {
        println!("[suite-finished] suite={suite}");
        Ok(())
    }

    async fn test_started(&self, test: &Description) -> ListenerResult {
        println!("[test-started] test={test}");
        Ok(())
    }

    async fn test_finished(&self, test: &Description) -> ListenerResult {
        println!("[test-finished] test={test}");
        Ok(())
    }

    async fn test_failure(&self, failure: &Failure) -> ListenerResult {
        if failure.description().is_mechanism() {
            println!("[mechanism-failure] {failure}");
        } else {
            println!("[test-failed] {failure}");
        }
        Ok(())
    }

    async fn test_assumption_failure(&self, failure: &Failure) -> ListenerResult {
        println!("[assumption-failed] {failure}");
        Ok(())
    }

    async fn test_ignored(&self, test: &Description) -> ListenerResult {
        println!("[test-ignored] test={test}");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
