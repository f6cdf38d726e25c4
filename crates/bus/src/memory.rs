//! In-memory bus backend for tests and embedded deployments.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{BusError, MessageBus};

/// A message recorded by [`MemoryBus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    /// The subject the message was published on.
    pub subject: String,
    /// The opaque payload bytes.
    pub payload: Vec<u8>,
}

/// An in-memory [`MessageBus`] that records publishes.
///
/// Individual subjects can be armed to fail, which lets tests exercise
/// the fan-out's partial-failure semantics.
#[derive(Debug, Default)]
pub struct MemoryBus {
    published: RwLock<Vec<PublishedMessage>>,
    failing_subjects: RwLock<HashSet<String>>,
}

impl MemoryBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms `subject` so that publishing to it fails.
    pub fn fail_subject(&self, subject: &str) {
        self.failing_subjects.write().insert(subject.to_string());
    }

    /// Disarms a previously failing subject.
    pub fn restore_subject(&self, subject: &str) {
        self.failing_subjects.write().remove(subject);
    }

    /// Returns a snapshot of everything published so far.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.read().clone()
    }

    /// Number of messages published on `subject`.
    pub fn count_for(&self, subject: &str) -> usize {
        self.published.read().iter().filter(|m| m.subject == subject).count()
    }

    /// Drains and returns all recorded messages.
    pub fn take_published(&self) -> Vec<PublishedMessage> {
        std::mem::take(&mut *self.published.write())
    }
}

#[async_trait]
impl MessageBus for MemoryBus {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), BusError> {
        if self.failing_subjects.read().contains(subject) {
            return Err(BusError::Publish {
                subject: subject.to_string(),
                message: "subject armed to fail".to_string(),
            });
        }
        self.published
            .write()
            .push(PublishedMessage { subject: subject.to_string(), payload });
        Ok(())
    }
}
