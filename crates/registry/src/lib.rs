//! The consistency-critical slice of the Launchpad project platform.
//!
//! Manages hierarchical project resources over a versioned key-value
//! store, enforcing a global slug-uniqueness invariant without a
//! relational unique constraint and exposing per-key store revisions to
//! clients as entity tags for optimistic concurrency.
//!
//! ## Consistency model
//!
//! - One logical project is stored as two independently-versioned
//!   partitions (base attributes and access-sensitive settings) in
//!   separate buckets; they are never updated atomically together.
//! - Slug uniqueness rests solely on a create-only conditional write of
//!   the `slug/<slug>` mapping key. Any preliminary existence read is a
//!   non-authoritative fast-path hint.
//! - Multi-step mutations (mapping → base → settings) form an explicit
//!   saga: a mid-sequence failure leaves prior writes committed and is
//!   compensated best-effort, with failures logged.
//! - Every successful mutation fans out notifications to the downstream
//!   indexing and access-control systems, dispatched concurrently with
//!   first-error-wins join semantics. A fan-out failure after a committed
//!   store write is reported as a failed operation; no rollback is
//!   attempted.

#![deny(unsafe_code)]

pub mod error;
pub mod fanout;
pub mod handlers;
pub mod keys;
pub mod repository;
pub mod service;

pub use error::RegistryError;
pub use fanout::ChangeNotifier;
pub use handlers::QueryHandlers;
pub use repository::ProjectRepository;
pub use service::{ProjectDraft, ProjectService, ProjectView, SettingsDraft};
