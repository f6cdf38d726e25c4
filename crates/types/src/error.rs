//! Error-code catalog for the project registry.
//!
//! Every failure surfaced by the registry maps to an [`ErrorCode`] with a
//! unique numeric identifier, retryability classification, and a status
//! mapping for the (external) REST transport edge. Codes are organized
//! into ranges:
//!
//! | Range       | Domain                  | Examples                          |
//! |-------------|-------------------------|-----------------------------------|
//! | 1000–1099   | Input validation        | Malformed slug, UID, entity tag   |
//! | 2000–2099   | Store-surfaced          | Not found, slug taken, stale tag  |
//! | 3000–3099   | Policy / availability   | Delete gate, unwired dependency   |
//!
//! # Wire Format
//!
//! Error codes are transmitted as the string representation of their
//! numeric value (e.g., `"2002"`) in response error metadata. Use
//! [`ErrorCode::as_u16`] for serialization and [`ErrorCode::from_u16`]
//! for deserialization.

/// Machine-readable error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // --- Validation errors (1000–1099) ---
    /// Request shape is invalid: malformed slug, parent UID, or entity tag.
    ValidationFailed = 1000,

    // --- Store-surfaced errors (2000–2099) ---
    /// No project exists with the given UID (or slug mapping).
    ProjectNotFound = 2000,
    /// The slug mapping key already exists; the slug is taken.
    ProjectSlugExists = 2001,
    /// Conditional write rejected: the presented entity tag is stale.
    RevisionMismatch = 2002,

    // --- Policy / availability errors (3000–3099) ---
    /// Deletion refused: funding models are not exactly `["Crowdfunding"]`.
    CannotDeleteNonCrowdfundingProject = 3000,
    /// A required collaborator (store, bus) is not wired into the service.
    ServiceUnavailable = 3001,
    /// Other store/bus/codec failure.
    Internal = 3002,
}

impl ErrorCode {
    /// Returns the numeric code value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Converts a numeric code to an `ErrorCode`, returning `None` for
    /// unknown values.
    #[must_use]
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            1000 => Some(Self::ValidationFailed),
            2000 => Some(Self::ProjectNotFound),
            2001 => Some(Self::ProjectSlugExists),
            2002 => Some(Self::RevisionMismatch),
            3000 => Some(Self::CannotDeleteNonCrowdfundingProject),
            3001 => Some(Self::ServiceUnavailable),
            3002 => Some(Self::Internal),
            _ => None,
        }
    }

    /// Whether this error may succeed on a subsequent attempt.
    ///
    /// `RevisionMismatch` is retryable only after re-reading the entity;
    /// the registry never retries internally, so it is classified
    /// non-retryable here. `ServiceUnavailable` and `Internal` may clear
    /// up once the dependency recovers.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::ServiceUnavailable | Self::Internal)
    }

    /// HTTP status the transport edge maps this code to.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::ValidationFailed => 400,
            Self::ProjectNotFound => 404,
            Self::ProjectSlugExists => 409,
            Self::RevisionMismatch => 412,
            Self::CannotDeleteNonCrowdfundingProject => 403,
            Self::ServiceUnavailable => 503,
            Self::Internal => 500,
        }
    }
}
