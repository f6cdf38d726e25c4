//! In-memory bucket backend.
//!
//! Backs tests and embedded deployments. Per-key revision counters
//! survive deletion, so a tag observed before a delete can never match a
//! value written after re-creation.

use std::collections::HashMap;

use async_trait::async_trait;
use launchpad_types::Revision;
use parking_lot::RwLock;

use crate::bucket::{Entry, KvBucket};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct BucketState {
    entries: HashMap<String, Entry>,
    /// Highest revision ever issued per key; never reset on delete.
    counters: HashMap<String, u64>,
}

impl BucketState {
    fn next_revision(&mut self, key: &str) -> Revision {
        let counter = self.counters.entry(key.to_string()).or_insert(0);
        *counter += 1;
        Revision::new(*counter)
    }
}

/// An in-memory [`KvBucket`] with per-key revisions starting at 1.
#[derive(Debug, Default)]
pub struct MemoryBucket {
    state: RwLock<BucketState>,
}

impl MemoryBucket {
    /// Creates an empty bucket.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored. Test helper.
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Whether the bucket holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrites a key with raw bytes, bypassing any caller-side codec.
    ///
    /// Used by tests to plant undecodable values.
    pub fn put_raw(&self, key: &str, value: Vec<u8>) -> Revision {
        let mut state = self.state.write();
        let revision = state.next_revision(key);
        state.entries.insert(key.to_string(), Entry { value, revision });
        revision
    }
}

#[async_trait]
impl KvBucket for MemoryBucket {
    async fn get(&self, key: &str) -> Result<Entry, StoreError> {
        self.state
            .read()
            .entries
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { key: key.to_string() })
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<Revision, StoreError> {
        let mut state = self.state.write();
        let revision = state.next_revision(key);
        state.entries.insert(key.to_string(), Entry { value, revision });
        Ok(revision)
    }

    async fn create(&self, key: &str, value: Vec<u8>) -> Result<Revision, StoreError> {
        let mut state = self.state.write();
        if state.entries.contains_key(key) {
            return Err(StoreError::KeyExists { key: key.to_string() });
        }
        let revision = state.next_revision(key);
        state.entries.insert(key.to_string(), Entry { value, revision });
        Ok(revision)
    }

    async fn update(
        &self,
        key: &str,
        value: Vec<u8>,
        expected: Revision,
    ) -> Result<Revision, StoreError> {
        let mut state = self.state.write();
        let current = match state.entries.get(key) {
            Some(entry) => entry.revision,
            None => return Err(StoreError::NotFound { key: key.to_string() }),
        };
        if current != expected {
            return Err(StoreError::RevisionMismatch { key: key.to_string(), expected, current });
        }
        let revision = state.next_revision(key);
        state.entries.insert(key.to_string(), Entry { value, revision });
        Ok(revision)
    }

    async fn delete(&self, key: &str, expected: Option<Revision>) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let current = match state.entries.get(key) {
            Some(entry) => entry.revision,
            None => return Err(StoreError::NotFound { key: key.to_string() }),
        };
        if let Some(expected) = expected {
            if current != expected {
                return Err(StoreError::RevisionMismatch {
                    key: key.to_string(),
                    expected,
                    current,
                });
            }
        }
        state.entries.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self.state.read().entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_returns_value_at_revision_one() {
        let bucket = MemoryBucket::new();
        let rev = bucket.put("k", b"v".to_vec()).await.unwrap();
        assert_eq!(rev, Revision::new(1));

        let entry = bucket.get("k").await.unwrap();
        assert_eq!(entry.value, b"v");
        assert_eq!(entry.revision, Revision::new(1));
    }

    #[tokio::test]
    async fn get_missing_key_is_not_found() {
        let bucket = MemoryBucket::new();
        let err = bucket.get("missing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn put_bumps_revision_per_key() {
        let bucket = MemoryBucket::new();
        bucket.put("k", b"v1".to_vec()).await.unwrap();
        let rev = bucket.put("k", b"v2".to_vec()).await.unwrap();
        assert_eq!(rev, Revision::new(2));

        // Other keys keep their own counters.
        let other = bucket.put("j", b"w".to_vec()).await.unwrap();
        assert_eq!(other, Revision::new(1));
    }

    #[tokio::test]
    async fn create_fails_on_existing_key() {
        let bucket = MemoryBucket::new();
        bucket.create("k", b"v".to_vec()).await.unwrap();
        let err = bucket.create("k", b"other".to_vec()).await.unwrap_err();
        assert!(matches!(err, StoreError::KeyExists { .. }));
        // The original value is untouched.
        assert_eq!(bucket.get("k").await.unwrap().value, b"v");
    }

    #[tokio::test]
    async fn update_with_matching_revision_succeeds() {
        let bucket = MemoryBucket::new();
        let rev = bucket.put("k", b"v1".to_vec()).await.unwrap();
        let rev2 = bucket.update("k", b"v2".to_vec(), rev).await.unwrap();
        assert_eq!(rev2, Revision::new(2));
        assert_eq!(bucket.get("k").await.unwrap().value, b"v2");
    }

    #[tokio::test]
    async fn update_with_stale_revision_fails_and_leaves_value() {
        let bucket = MemoryBucket::new();
        let rev = bucket.put("k", b"v1".to_vec()).await.unwrap();
        bucket.update("k", b"v2".to_vec(), rev).await.unwrap();

        let err = bucket.update("k", b"v3".to_vec(), rev).await.unwrap_err();
        match err {
            StoreError::RevisionMismatch { expected, current, .. } => {
                assert_eq!(expected, Revision::new(1));
                assert_eq!(current, Revision::new(2));
            },
            other => panic!("expected RevisionMismatch, got {other:?}"),
        }
        assert_eq!(bucket.get("k").await.unwrap().value, b"v2");
    }

    #[tokio::test]
    async fn update_missing_key_is_not_found() {
        let bucket = MemoryBucket::new();
        let err = bucket.update("k", b"v".to_vec(), Revision::new(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn conditional_delete_checks_revision() {
        let bucket = MemoryBucket::new();
        let rev = bucket.put("k", b"v".to_vec()).await.unwrap();

        let err = bucket.delete("k", Some(Revision::new(99))).await.unwrap_err();
        assert!(matches!(err, StoreError::RevisionMismatch { .. }));
        assert!(bucket.get("k").await.is_ok());

        bucket.delete("k", Some(rev)).await.unwrap();
        assert!(bucket.get("k").await.is_err());
    }

    #[tokio::test]
    async fn unconditional_delete_removes_key() {
        let bucket = MemoryBucket::new();
        bucket.put("k", b"v".to_vec()).await.unwrap();
        bucket.delete("k", None).await.unwrap();
        assert!(matches!(
            bucket.delete("k", None).await.unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn revisions_survive_delete_and_recreate() {
        let bucket = MemoryBucket::new();
        let first = bucket.put("k", b"v1".to_vec()).await.unwrap();
        bucket.delete("k", None).await.unwrap();
        let second = bucket.put("k", b"v2".to_vec()).await.unwrap();
        // A tag observed before the delete can never match again.
        assert!(second > first);
    }

    #[tokio::test]
    async fn keys_lists_sorted_snapshot() {
        let bucket = MemoryBucket::new();
        bucket.put("b", b"2".to_vec()).await.unwrap();
        bucket.put("a", b"1".to_vec()).await.unwrap();
        bucket.put("c", b"3".to_vec()).await.unwrap();
        assert_eq!(bucket.keys().await.unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn concurrent_creates_admit_exactly_one() {
        use std::sync::Arc;

        let bucket = Arc::new(MemoryBucket::new());
        let a = {
            let bucket = bucket.clone();
            tokio::spawn(async move { bucket.create("k", b"a".to_vec()).await })
        };
        let b = {
            let bucket = bucket.clone();
            tokio::spawn(async move { bucket.create("k", b"b".to_vec()).await })
        };
        let (ra, rb) = (a.await.unwrap(), b.await.unwrap());
        assert_eq!(
            1,
            [ra.is_ok(), rb.is_ok()].iter().filter(|ok| **ok).count(),
            "exactly one create must win"
        );
    }
}
