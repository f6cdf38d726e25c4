//! Message-bus boundary for change notifications and peer lookups.
//!
//! The production bus is an external collaborator. From this side a
//! publish is at-most-once and fire-and-forget at the transport level:
//! failure is observed only if the publish call itself errors (for
//! example, no connection). Durability is the bus's concern.

#![deny(unsafe_code)]

// Snafu generates struct fields for context selectors that don't need documentation
#![allow(missing_docs)]

mod memory;

pub use memory::{MemoryBus, PublishedMessage};

use async_trait::async_trait;
use snafu::Snafu;

/// Errors surfaced by a bus publish.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum BusError {
    /// The publish call itself failed.
    #[snafu(display("publish to subject {subject:?} failed: {message}"))]
    Publish { subject: String, message: String },

    /// The bus connection is unavailable.
    #[snafu(display("bus connection unavailable: {message}"))]
    Connection { message: String },
}

/// A subject-addressed publisher of opaque byte payloads.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publishes `payload` on `subject`. No reply is awaited.
    ///
    /// # Errors
    ///
    /// Returns [`BusError`] only when the publish call itself fails;
    /// downstream processing failures are invisible here.
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), BusError>;
}
