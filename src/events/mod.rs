//! Lifecycle event data model.
//!
//! This module groups the types carried by run lifecycle events:
//!
//! - [`Description`], [`DescriptionKind`] — names a test or suite, plus the
//!   reserved mechanism sentinel;
//! - [`Failure`], [`ErrorReport`] — immutable failure records with an
//!   optional cause chain.
//!
//! The events themselves are the methods of the
//! [`RunListener`](crate::RunListener) trait; see `listeners/mod.rs` for
//! the delivery and ordering rules.

mod description;
mod failure;

pub use description::{Description, DescriptionKind};
pub use failure::{ErrorReport, Failure};
