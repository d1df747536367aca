//! Error types used by the notifier and the persistence shim.
//!
//! This module defines two error types:
//!
//! - [`ListenerError`] — an error raised by a [`RunListener`](crate::RunListener)
//!   callback while handling an event.
//! - [`SnapshotError`] — a failure to encode or decode a persisted
//!   [`RunResult`](crate::RunResult).
//!
//! Both types provide `as_label()` for stable snake_case labels in logs.

use std::any::Any;
use std::error::Error;

use thiserror::Error;

/// # Error raised by a listener callback.
///
/// Listener methods may fail for arbitrary user-defined reasons; this type
/// transports the message (and an optional source error) back to the
/// [`RunNotifier`](crate::RunNotifier), which reports it to the remaining
/// listeners as a mechanism [`Failure`](crate::Failure).
///
/// Panics inside a listener are captured by the notifier and converted into
/// this type as well.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ListenerError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl ListenerError {
    /// Creates an error from a plain message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error wrapping an underlying source error.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Builds an error from a captured panic payload.
    ///
    /// Extracts the panic message when it is a `&str` or `String`;
    /// falls back to a generic message otherwise.
    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            format!("listener panicked: {s}")
        } else if let Some(s) = payload.downcast_ref::<String>() {
            format!("listener panicked: {s}")
        } else {
            "listener panicked".to_string()
        };
        Self {
            message,
            source: None,
        }
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        "listener_error"
    }
}

impl From<Box<dyn Error + Send + Sync>> for ListenerError {
    fn from(err: Box<dyn Error + Send + Sync>) -> Self {
        Self {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// # Errors produced by the persistence shim.
///
/// Decoding never yields a partial result: either a fully populated
/// [`RunResult`](crate::RunResult) is returned, or [`SnapshotError::Decode`].
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The result could not be serialized to the stable field layout.
    #[error("failed to encode result snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    /// The stream is structurally corrupt, truncated, or refers to an
    /// unresolvable element.
    #[error("failed to decode result snapshot: {0}")]
    Decode(#[source] serde_json::Error),
}

impl SnapshotError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            SnapshotError::Encode(_) => "snapshot_encode_failed",
            SnapshotError::Decode(_) => "snapshot_decode_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SnapshotError::Encode(err) => format!("encode: {err}"),
            SnapshotError::Decode(err) => format!("decode: {err}"),
        }
    }
}
