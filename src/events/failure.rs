//! # Failure records.
//!
//! A [`Failure`] is an immutable pair of the [`Description`] of the test
//! that failed and an [`ErrorReport`] carrying the error message plus an
//! optional cause chain. Failures are produced by the event source (or by
//! the notifier, for listener malfunctions) and never mutated afterwards;
//! the aggregator only transports them.
//!
//! ## Example
//! ```rust
//! use verdict::{Description, ErrorReport, Failure};
//!
//! let report = ErrorReport::new("assertion failed: left != right");
//! let failure = Failure::new(Description::test("math::adds"), report);
//!
//! assert_eq!(failure.message(), "assertion failed: left != right");
//! assert_eq!(failure.to_string(), "math::adds: assertion failed: left != right");
//! ```

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ListenerError;

use super::description::Description;

/// Error payload of a [`Failure`]: a message and an optional cause chain.
///
/// Built either directly from a message, or from any [`std::error::Error`]
/// by walking its `source()` chain. The payload is opaque to this crate:
/// nothing here interprets *why* a test failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cause: Option<Box<ErrorReport>>,
}

impl ErrorReport {
    /// Creates a report with no cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a report with an underlying cause.
    pub fn with_cause(message: impl Into<String>, cause: ErrorReport) -> Self {
        Self {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Builds a report from an error, capturing its full `source()` chain.
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        let cause = err.source().map(|src| Box::new(Self::from_error(src)));
        Self {
            message: err.to_string(),
            cause,
        }
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the next report in the cause chain, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&ErrorReport> {
        self.cause.as_deref()
    }

    /// Iterates over this report and every cause below it, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &ErrorReport> {
        let mut next = Some(self);
        std::iter::from_fn(move || {
            let current = next?;
            next = current.cause();
            Some(current)
        })
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<&ListenerError> for ErrorReport {
    fn from(err: &ListenerError) -> Self {
        Self::from_error(err)
    }
}

/// An immutable record of one failed test (or one listener malfunction).
///
/// Pairs the [`Description`] of what failed with the [`ErrorReport`] of why.
/// Failures carrying the mechanism sentinel (see [`Description::mechanism`])
/// report a listener that raised an error while handling an event, not a
/// failing test.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    description: Description,
    error: ErrorReport,
}

impl Failure {
    /// Creates a failure record.
    pub fn new(description: Description, error: ErrorReport) -> Self {
        Self { description, error }
    }

    /// Creates a failure reporting a listener malfunction.
    ///
    /// Carries the mechanism sentinel description.
    pub(crate) fn mechanism(err: &ListenerError) -> Self {
        Self {
            description: Description::mechanism(),
            error: ErrorReport::from(err),
        }
    }

    /// Returns the description of what failed.
    #[must_use]
    pub fn description(&self) -> &Description {
        &self.description
    }

    /// Returns the error payload.
    #[must_use]
    pub fn error(&self) -> &ErrorReport {
        &self.error
    }

    /// Returns the top-level error message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.error.message()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.description, self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("outer failed")]
    struct Outer {
        #[source]
        inner: Inner,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("inner failed")]
    struct Inner;

    #[test]
    fn test_from_error_captures_cause_chain() {
        let err = Outer { inner: Inner };
        let report = ErrorReport::from_error(&err);
        let chain: Vec<&str> = report.chain().map(ErrorReport::message).collect();
        assert_eq!(chain, vec!["outer failed", "inner failed"]);
    }

    #[test]
    fn test_with_cause_builds_a_chain() {
        let report = ErrorReport::with_cause("request failed", ErrorReport::new("timed out"));
        assert_eq!(report.cause().map(ErrorReport::message), Some("timed out"));
        assert_eq!(report.chain().count(), 2);
    }

    #[test]
    fn test_mechanism_failure_carries_sentinel() {
        let err = ListenerError::new("listener blew up");
        let failure = Failure::mechanism(&err);
        assert!(failure.description().is_mechanism());
        assert_eq!(failure.message(), "listener blew up");
    }

    #[test]
    fn test_display_is_header_plus_message() {
        let failure = Failure::new(
            Description::test("io::reads"),
            ErrorReport::new("file not found"),
        );
        assert_eq!(failure.to_string(), "io::reads: file not found");
    }
}
