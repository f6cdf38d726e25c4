//! The versioned bucket trait consumed by the repository.

use async_trait::async_trait;
use launchpad_types::Revision;

use crate::error::StoreError;

/// A stored value together with its current per-key revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The stored byte value.
    pub value: Vec<u8>,
    /// The revision of the write that produced this value.
    pub revision: Revision,
}

/// A per-bucket key→value store with per-key revision counters.
///
/// All methods are safe for concurrent use; correctness under concurrent
/// mutation of the same key rests on the revision-based conditional
/// writes, not on any locking in the caller.
#[async_trait]
pub trait KvBucket: Send + Sync {
    /// Reads the current value and revision for `key`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the key is absent.
    async fn get(&self, key: &str) -> Result<Entry, StoreError>;

    /// Writes `value` unconditionally (create-or-overwrite), returning
    /// the new revision.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<Revision, StoreError>;

    /// Writes `value` only if `key` does not yet exist.
    ///
    /// This is the linearization point for uniqueness claims: of two
    /// concurrent creates for the same key, exactly one succeeds.
    ///
    /// # Errors
    ///
    /// `KeyExists` if the key is already present.
    async fn create(&self, key: &str, value: Vec<u8>) -> Result<Revision, StoreError>;

    /// Replaces the value only if the key's current revision equals
    /// `expected`, returning the new revision.
    ///
    /// # Errors
    ///
    /// `NotFound` if the key is absent, `RevisionMismatch` if `expected`
    /// is stale.
    async fn update(
        &self,
        key: &str,
        value: Vec<u8>,
        expected: Revision,
    ) -> Result<Revision, StoreError>;

    /// Removes the key. With `Some(expected)` the delete is conditional
    /// on the current revision; with `None` it is unconditional.
    ///
    /// # Errors
    ///
    /// `NotFound` if the key is absent, `RevisionMismatch` if `expected`
    /// is stale.
    async fn delete(&self, key: &str, expected: Option<Revision>) -> Result<(), StoreError>;

    /// Lists all keys currently in the bucket. The listing is finite and
    /// one-shot; keys written or removed concurrently may or may not
    /// appear.
    async fn keys(&self) -> Result<Vec<String>, StoreError>;
}
