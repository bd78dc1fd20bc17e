//! # Error Types
//!
//! The failure surface of the core is deliberately small. Decoding and
//! merging never fail on irregular data — skipping is the contract — so
//! `ReinsightError` only covers precondition failures at the collaborator
//! boundary: invalid snapshot JSON and malformed date-key strings. File
//! I/O lives in the CLI, behind `anyhow`.

use thiserror::Error;

/// Top-level error type for the reinsight workspace.
#[derive(Error, Debug)]
pub enum ReinsightError {
    /// A date key did not match `DD.MM.YYYY` or `DD.MM.YYYY-DD.MM.YYYY`.
    #[error("invalid date key {key:?}: {reason}")]
    InvalidDateKey {
        /// The offending key as it appeared in the snapshot.
        key: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Snapshot JSON could not be parsed.
    #[error("snapshot parse error: {0}")]
    SnapshotParse(#[from] serde_json::Error),
}
