//! Entity and identifier types for the project registry.
//!
//! Projects are one logical entity stored as two independently-versioned
//! partitions: the public [`ProjectBase`] attributes and the
//! access-sensitive [`ProjectSettings`]. Each partition lives in its own
//! bucket under the same UID key and carries its own store [`Revision`].

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The only funding model under which a project may be deleted.
pub const FUNDING_MODEL_CROWDFUNDING: &str = "Crowdfunding";

/// Generates a newtype wrapper around `String` for type-safe identifiers.
///
/// Each generated type provides:
/// - Standard derives: Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord
/// - Serde with `#[serde(transparent)]` for wire format compatibility
/// - `From<String>` / `From<&str>` conversions and `Display`
/// - `new()` constructor and `as_str()` accessor
macro_rules! define_str_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from a raw string value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the identifier, returning the inner string.
            #[inline]
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_str_id!(
    /// Globally unique, immutable project identifier.
    ///
    /// Generated once at creation via [`ProjectUid::generate`] (UUIDv4 in
    /// simple hex form) and used as the storage key in both the
    /// `projects` and `project-settings` buckets.
    ProjectUid
);

define_str_id!(
    /// Short, human-readable, globally unique project identifier.
    ///
    /// Distinct from the UID and mutable. Uniqueness is enforced through
    /// the `slug/`-prefixed mapping key, not a relational constraint.
    ProjectSlug
);

impl ProjectUid {
    /// Generates a fresh UID (32 lowercase hex characters).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }
}

/// Per-key monotonically increasing counter maintained by the versioned
/// KV store.
///
/// Surfaced to API clients as an opaque entity tag in decimal string
/// form; clients echo it on update/delete and the repository passes it
/// straight through as the expected revision of a conditional write.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Revision(u64);

impl Revision {
    /// Creates a revision from a raw counter value.
    #[inline]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw counter value.
    #[inline]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for Revision {
    #[inline]
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Revision {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}

/// Public base attributes of a project.
///
/// Stored at key = UID in the `projects` bucket, alongside the synthetic
/// `slug/<slug>` mapping entries that gate slug uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectBase {
    /// Immutable unique identifier; storage key.
    pub uid: ProjectUid,
    /// Mutable globally unique slug.
    pub slug: ProjectSlug,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Whether the project is publicly visible.
    pub public: bool,
    /// Optional parent project. Checked for existence at validation time
    /// only; no ongoing referential integrity afterwards.
    pub parent_uid: Option<ProjectUid>,
    /// Lifecycle stage label.
    pub stage: String,
    /// Business category label.
    pub category: String,
    /// Legal form of the venture.
    pub legal_form: String,
    /// Funding model labels. Deletion is gated on this being exactly
    /// `["Crowdfunding"]`.
    pub funding_models: Vec<String>,
    /// Date of formal company formation, if any.
    pub formation_date: Option<NaiveDate>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A user identity attached to a project role list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Identity of the user in the platform's user service.
    pub user_uid: String,
    /// Display name at the time the role was granted.
    pub display_name: String,
    /// Contact address.
    pub email: String,
}

/// Access-sensitive settings partition of a project.
///
/// Stored at key = UID in the `project-settings` bucket. Shares the UID
/// with the owning [`ProjectBase`] by convention only; the two partitions
/// are never updated atomically together and each carries its own
/// revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// Same value as the owning base entity's UID.
    pub uid: ProjectUid,
    /// Internal mission statement.
    pub mission_statement: String,
    /// Planned public announcement date.
    pub announcement_date: Option<DateTime<Utc>>,
    /// Users allowed to author project content.
    pub writers: Vec<UserIdentity>,
    /// Users with audit access.
    pub auditors: Vec<UserIdentity>,
    /// Users coordinating project meetings.
    pub meeting_coordinators: Vec<UserIdentity>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn generated_uids_are_unique_and_hex() {
        let a = ProjectUid::generate();
        let b = ProjectUid::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn slug_display_is_raw_value() {
        let slug = ProjectSlug::new("acme");
        assert_eq!(slug.to_string(), "acme");
        assert_eq!(slug.as_str(), "acme");
    }

    #[test]
    fn revision_round_trips_as_decimal_string() {
        let rev = Revision::new(42);
        assert_eq!(rev.to_string(), "42");
        let parsed: Revision = "42".parse().unwrap();
        assert_eq!(parsed, rev);
    }

    #[test]
    fn revision_rejects_non_numeric_string() {
        assert!("abc".parse::<Revision>().is_err());
        assert!("".parse::<Revision>().is_err());
        assert!("-1".parse::<Revision>().is_err());
    }

    #[test]
    fn id_serde_is_transparent() {
        let uid = ProjectUid::new("deadbeef");
        let json = serde_json::to_string(&uid).unwrap();
        assert_eq!(json, "\"deadbeef\"");
        let back: ProjectUid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uid);
    }

    #[test]
    fn revision_serde_is_transparent() {
        let rev = Revision::new(7);
        assert_eq!(serde_json::to_string(&rev).unwrap(), "7");
    }
}
