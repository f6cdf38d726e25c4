//! Core type definitions for the Launchpad project registry.
//!
//! This crate is the dependency root of the workspace. It defines:
//!
//! - Identifier newtypes ([`ProjectUid`], [`ProjectSlug`]) and the
//!   store [`Revision`] counter surfaced to API clients as an entity tag
//! - The two entity structs persisted in separate buckets
//!   ([`ProjectBase`], [`ProjectSettings`])
//! - The entity [`codec`] used for stored byte values
//! - Input [`validation`] shared by service and handler boundaries
//! - The [`ErrorCode`] catalog consumed at the transport edge

#![deny(unsafe_code)]

pub mod codec;
pub mod config;
pub mod error;
pub mod types;
pub mod validation;

pub use error::ErrorCode;
pub use types::{
    FUNDING_MODEL_CROWDFUNDING, ProjectBase, ProjectSettings, ProjectSlug, ProjectUid, Revision,
    UserIdentity,
};
pub use validation::ValidationError;
