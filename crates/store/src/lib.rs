//! Versioned key-value store boundary for the project registry.
//!
//! The production store is an external collaborator; this crate defines
//! the trait the registry consumes plus an in-memory backend used by
//! tests and embedded deployments.
//!
//! Every write returns a monotonically increasing per-key [`Revision`];
//! conditional writes succeed only if the caller's expected revision
//! matches current. The create-only write ([`KvBucket::create`]) is the
//! linearization point for uniqueness claims such as slug mappings.
//!
//! [`Revision`]: launchpad_types::Revision

#![deny(unsafe_code)]

mod bucket;
mod error;
mod memory;

pub use bucket::{Entry, KvBucket};
pub use error::StoreError;
pub use memory::MemoryBucket;
