//! # Persistence shim: stable encoding of a [`RunResult`].
//!
//! Converts a result to and from a fixed external field layout, isolating
//! the aggregator's internal representation from the published encoding.
//!
//! ## Field layout
//! ```text
//! count:       u64            required
//! ignoreCount: u64            required
//! failures:    [Failure, ..]  required, delivery order
//! runTime:     u64 (millis)   defaults to 0 when absent
//! startTime:   u64 (epoch ms) defaults to 0 when absent
//! ```
//!
//! ## Rules
//! - Absent `runTime`/`startTime` default to zero: encodings written
//!   before those fields existed still decode.
//! - Unknown-but-present fields are ignored.
//! - A structurally corrupt or truncated stream fails with
//!   [`SnapshotError::Decode`]; no partial result is ever returned.
//! - Decoding builds a brand-new [`RunResult`] whose atomics are fresh
//!   copies seeded from the decoded values, sealed against further event
//!   delivery (the producing run already finished).
//!
//! ## Example
//! ```rust
//! use verdict::{snapshot, RunResult};
//!
//! let result = RunResult::new();
//! let bytes = snapshot::encode(&result)?;
//! let restored = snapshot::decode(&bytes)?;
//!
//! assert_eq!(restored.run_count(), result.run_count());
//! assert!(restored.is_restored());
//! # Ok::<(), verdict::SnapshotError>(())
//! ```

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::events::Failure;

use super::aggregate::RunResult;

/// The persisted form of a result. Field names are part of the published
/// encoding and must not change.
#[derive(Debug, Serialize, Deserialize)]
struct ResultForm {
    count: u64,
    #[serde(rename = "ignoreCount")]
    ignore_count: u64,
    failures: Vec<Failure>,
    #[serde(rename = "runTime", default)]
    run_time: u64,
    #[serde(rename = "startTime", default)]
    start_time: u64,
}

impl From<&RunResult> for ResultForm {
    fn from(result: &RunResult) -> Self {
        Self {
            count: result.run_count(),
            ignore_count: result.ignore_count(),
            failures: result.failures(),
            run_time: result.run_time_millis(),
            start_time: result.start_time_millis(),
        }
    }
}

impl From<ResultForm> for RunResult {
    fn from(form: ResultForm) -> Self {
        RunResult::restored(
            form.count,
            form.ignore_count,
            form.failures,
            form.run_time,
            form.start_time,
        )
    }
}

/// Encodes a result into the stable field layout.
pub fn encode(result: &RunResult) -> Result<Vec<u8>, SnapshotError> {
    serde_json::to_vec(&ResultForm::from(result)).map_err(SnapshotError::Encode)
}

/// Encodes a result into the stable field layout, writing to `writer`.
pub fn encode_to_writer<W: Write>(result: &RunResult, writer: W) -> Result<(), SnapshotError> {
    serde_json::to_writer(writer, &ResultForm::from(result)).map_err(SnapshotError::Encode)
}

/// Decodes a result from the stable field layout.
///
/// Returns a sealed [`RunResult`]; see the module docs for the defaulting
/// and failure rules.
pub fn decode(bytes: &[u8]) -> Result<RunResult, SnapshotError> {
    let form: ResultForm = serde_json::from_slice(bytes).map_err(SnapshotError::Decode)?;
    Ok(form.into())
}

/// Decodes a result from the stable field layout, reading from `reader`.
pub fn decode_from_reader<R: Read>(reader: R) -> Result<RunResult, SnapshotError> {
    let form: ResultForm = serde_json::from_reader(reader).map_err(SnapshotError::Decode)?;
    Ok(form.into())
}
