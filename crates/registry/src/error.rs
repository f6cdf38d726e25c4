//! Registry error type using snafu.
//!
//! Repository and fan-out failures are categorized here and mapped into
//! the numeric [`ErrorCode`] catalog the transport edge consumes.

// Snafu generates struct fields for context selectors that don't need documentation
#![allow(missing_docs)]

use launchpad_bus::BusError;
use launchpad_store::StoreError;
use launchpad_types::codec::CodecError;
use launchpad_types::{ErrorCode, ProjectSlug, ProjectUid, ValidationError};
use snafu::Snafu;

/// Unified result type for registry operations.
pub type Result<T, E = RegistryError> = std::result::Result<T, E>;

/// Errors surfaced by the repository, fan-out, and service layers.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RegistryError {
    /// Input failed validation before any store I/O.
    #[snafu(display("validation failed: {source}"))]
    Validation { source: ValidationError },

    /// No project exists with the given UID or slug.
    #[snafu(display("project {identifier:?} not found"))]
    ProjectNotFound { identifier: String },

    /// The slug mapping key already exists.
    #[snafu(display("slug {slug} is already taken"))]
    SlugExists { slug: ProjectSlug },

    /// A conditional write was rejected because the presented entity tag
    /// is stale.
    #[snafu(display("revision conflict for project {uid}: {source}"))]
    RevisionConflict { uid: ProjectUid, source: StoreError },

    /// Deletion policy gate: funding models must be exactly
    /// `["Crowdfunding"]`.
    #[snafu(display(
        "project {uid} cannot be deleted: funding models must be exactly [\"Crowdfunding\"]"
    ))]
    CannotDeleteNonCrowdfunding { uid: ProjectUid },

    /// A required collaborator is not wired into the service.
    #[snafu(display("required dependency {dependency:?} is not wired"))]
    Unavailable { dependency: &'static str },

    /// A store operation failed for a reason other than the contracts
    /// above.
    #[snafu(display("store operation {operation:?} failed: {source}"))]
    Store { operation: &'static str, source: StoreError },

    /// A stored value could not be decoded as its entity type.
    #[snafu(display("stored entity at key {key:?} is undecodable: {source}"))]
    Codec { key: String, source: CodecError },

    /// A stored mapping value is not valid UTF-8 or otherwise corrupt.
    #[snafu(display("stored value for key {key:?} is corrupt: {message}"))]
    Corrupt { key: String, message: String },

    /// A notification payload could not be serialized.
    #[snafu(display("notification payload for subject {subject:?} failed to encode: {source}"))]
    NotifyEncode { subject: &'static str, source: serde_json::Error },

    /// A notification publish failed. The primary store write has already
    /// committed when this surfaces.
    #[snafu(display("notification publish failed: {source}"))]
    Notify { source: BusError },
}

impl RegistryError {
    /// Maps this error into the transport-facing code catalog.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::ValidationFailed,
            Self::ProjectNotFound { .. } => ErrorCode::ProjectNotFound,
            Self::SlugExists { .. } => ErrorCode::ProjectSlugExists,
            Self::RevisionConflict { .. } => ErrorCode::RevisionMismatch,
            Self::CannotDeleteNonCrowdfunding { .. } => {
                ErrorCode::CannotDeleteNonCrowdfundingProject
            },
            Self::Unavailable { .. } => ErrorCode::ServiceUnavailable,
            Self::Store { .. }
            | Self::Codec { .. }
            | Self::Corrupt { .. }
            | Self::NotifyEncode { .. }
            | Self::Notify { .. } => ErrorCode::Internal,
        }
    }
}
