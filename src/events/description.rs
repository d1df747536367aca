//! # Test and suite descriptions.
//!
//! A [`Description`] identifies a single test or a suite of tests by name.
//! One reserved sentinel, [`Description::mechanism`], denotes the
//! notification mechanism itself: the notifier attaches it to failures it
//! synthesizes when a listener misbehaves while handling an event.
//!
//! ## Example
//! ```rust
//! use verdict::Description;
//!
//! let test = Description::test("parser::rejects_empty_input");
//! assert!(test.is_test());
//! assert_eq!(test.name(), "parser::rejects_empty_input");
//!
//! let sentinel = Description::mechanism();
//! assert!(sentinel.is_mechanism());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Display name of the reserved mechanism sentinel.
const MECHANISM_NAME: &str = "Test mechanism";

/// What a [`Description`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DescriptionKind {
    /// A suite of tests (generally a module or class name).
    Suite,
    /// A single atomic test.
    Test,
    /// The notification mechanism itself (reserved sentinel).
    Mechanism,
}

/// Identifies a test or a suite of tests.
///
/// Descriptions are cheap to clone and compare; the event source attaches
/// them to every lifecycle event so listeners can correlate events that
/// belong to the same test.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Description {
    name: String,
    kind: DescriptionKind,
}

impl Description {
    /// Creates a description for a suite of tests.
    pub fn suite(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DescriptionKind::Suite,
        }
    }

    /// Creates a description for a single test.
    pub fn test(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DescriptionKind::Test,
        }
    }

    /// Returns the reserved sentinel describing the notification mechanism.
    ///
    /// Failures carrying this description were not produced by a test; they
    /// report that a listener raised an error while handling an event.
    #[must_use]
    pub fn mechanism() -> Self {
        Self {
            name: MECHANISM_NAME.to_string(),
            kind: DescriptionKind::Mechanism,
        }
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns what this description refers to.
    #[must_use]
    pub fn kind(&self) -> DescriptionKind {
        self.kind
    }

    /// True if this describes a suite.
    #[must_use]
    pub fn is_suite(&self) -> bool {
        self.kind == DescriptionKind::Suite
    }

    /// True if this describes a single test.
    #[must_use]
    pub fn is_test(&self) -> bool {
        self.kind == DescriptionKind::Test
    }

    /// True if this is the reserved mechanism sentinel.
    #[must_use]
    pub fn is_mechanism(&self) -> bool {
        self.kind == DescriptionKind::Mechanism
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
