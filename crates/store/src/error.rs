//! Error types for store operations using snafu.

// Snafu generates struct fields for context selectors that don't need documentation
#![allow(missing_docs)]

use launchpad_types::Revision;
use snafu::Snafu;

/// Errors surfaced by a versioned KV bucket.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StoreError {
    /// The key does not exist in the bucket.
    #[snafu(display("key {key:?} not found"))]
    NotFound { key: String },

    /// A create-only write found the key already present.
    #[snafu(display("key {key:?} already exists"))]
    KeyExists { key: String },

    /// A conditional write was rejected because the expected revision is
    /// stale.
    #[snafu(display(
        "revision mismatch for key {key:?}: expected {expected}, current {current}"
    ))]
    RevisionMismatch { key: String, expected: Revision, current: Revision },

    /// The underlying backend failed (I/O, connection loss).
    #[snafu(display("store backend failure: {message}"))]
    Backend { message: String },
}
