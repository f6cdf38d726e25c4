//! Input validation for the service and handler boundaries.
//!
//! Validates slugs, project UIDs, and entity tags before any store I/O.
//! A malformed entity tag is a validation failure, distinct from the
//! revision mismatch a stale-but-well-formed tag produces at the store.
//!
//! ## Character Whitelists
//!
//! - Slugs: `[a-z0-9-]{1,63}`, no leading or trailing hyphen — DNS-safe
//!   labels usable in routing paths.
//! - Project UIDs: 32 lowercase hex characters (UUIDv4, simple form).

use std::fmt;

use crate::config::ValidationConfig;
use crate::types::Revision;

/// Validation error with structured context.
///
/// Contains the field name and the specific constraint that was violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// Description of the violated constraint.
    pub constraint: String,
}

impl ValidationError {
    /// Creates a validation error for `field` with the given constraint.
    pub fn new(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self { field: field.into(), constraint: constraint.into() }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.constraint)
    }
}

impl std::error::Error for ValidationError {}

/// Validates a project slug.
///
/// Slugs must:
/// - Be non-empty
/// - Not exceed `config.max_slug_bytes` in UTF-8 byte length
/// - Contain only `[a-z0-9-]`
/// - Not start or end with a hyphen
///
/// # Errors
///
/// Returns [`ValidationError`] describing the first violated constraint.
pub fn validate_slug(slug: &str, config: &ValidationConfig) -> Result<(), ValidationError> {
    if slug.is_empty() {
        return Err(ValidationError::new("slug", "must not be empty"));
    }
    if slug.len() > config.max_slug_bytes {
        return Err(ValidationError::new(
            "slug",
            format!(
                "length {} bytes exceeds maximum {} bytes",
                slug.len(),
                config.max_slug_bytes
            ),
        ));
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(ValidationError::new("slug", "must not start or end with a hyphen"));
    }
    if let Some(pos) = slug.find(|c: char| !is_slug_char(c)) {
        return Err(ValidationError::new(
            "slug",
            format!(
                "contains invalid character {:?} at byte offset {}; allowed: [a-z0-9-]",
                slug[pos..].chars().next().unwrap_or('\0'),
                pos
            ),
        ));
    }
    Ok(())
}

/// Validates the syntactic form of a project UID.
///
/// UIDs are 32 lowercase hex characters. This is a syntax check only —
/// existence is a separate repository concern.
///
/// # Errors
///
/// Returns [`ValidationError`] if the UID is not 32 lowercase hex chars.
pub fn validate_project_uid(uid: &str) -> Result<(), ValidationError> {
    validate_uid_field(uid, "uid")
}

/// Validates the syntactic form of a parent-project UID.
///
/// # Errors
///
/// Returns [`ValidationError`] with field `parent_uid` on syntax violation.
pub fn validate_parent_uid(uid: &str) -> Result<(), ValidationError> {
    validate_uid_field(uid, "parent_uid")
}

fn validate_uid_field(uid: &str, field: &str) -> Result<(), ValidationError> {
    if uid.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    if uid.len() != 32 {
        return Err(ValidationError::new(
            field,
            format!("length {} is not the required 32 hex characters", uid.len()),
        ));
    }
    if !uid.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)) {
        return Err(ValidationError::new(field, "must contain only lowercase hex characters"));
    }
    Ok(())
}

/// Parses a client-presented entity tag into a store [`Revision`].
///
/// An absent or non-numeric tag on a mutating call fails validation
/// before reaching the store, distinct from a revision mismatch.
///
/// # Errors
///
/// Returns [`ValidationError`] if the tag is empty or not a decimal
/// integer.
pub fn parse_entity_tag(tag: &str) -> Result<Revision, ValidationError> {
    if tag.is_empty() {
        return Err(ValidationError::new("etag", "must not be empty"));
    }
    tag.parse::<Revision>().map_err(|_| {
        ValidationError::new("etag", format!("{tag:?} is not a decimal revision number"))
    })
}

/// Checks if a character is allowed in slugs.
fn is_slug_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn config() -> ValidationConfig {
        ValidationConfig::default()
    }

    // =========================================================================
    // validate_slug tests
    // =========================================================================

    #[test]
    fn slug_valid_simple() {
        assert!(validate_slug("acme", &config()).is_ok());
        assert!(validate_slug("acme-2", &config()).is_ok());
        assert!(validate_slug("a", &config()).is_ok());
    }

    #[test]
    fn slug_empty_rejected() {
        let err = validate_slug("", &config()).unwrap_err();
        assert_eq!(err.field, "slug");
        assert!(err.constraint.contains("empty"));
    }

    #[test]
    fn slug_uppercase_rejected() {
        let err = validate_slug("Acme", &config()).unwrap_err();
        assert!(err.constraint.contains("invalid character"));
    }

    #[test]
    fn slug_leading_or_trailing_hyphen_rejected() {
        assert!(validate_slug("-acme", &config()).unwrap_err().constraint.contains("hyphen"));
        assert!(validate_slug("acme-", &config()).unwrap_err().constraint.contains("hyphen"));
    }

    #[test]
    fn slug_at_length_limit_accepted() {
        let config = ValidationConfig { max_slug_bytes: 8, ..ValidationConfig::default() };
        assert!(validate_slug("a2345678", &config).is_ok());
        let err = validate_slug("a23456789", &config).unwrap_err();
        assert!(err.constraint.contains("exceeds maximum"));
    }

    #[test]
    fn slug_space_and_unicode_rejected() {
        assert!(validate_slug("ac me", &config()).is_err());
        assert!(validate_slug("acm\u{00e9}", &config()).is_err());
    }

    // =========================================================================
    // validate_project_uid tests
    // =========================================================================

    #[test]
    fn uid_valid() {
        assert!(validate_project_uid("0123456789abcdef0123456789abcdef").is_ok());
    }

    #[test]
    fn uid_empty_rejected() {
        let err = validate_project_uid("").unwrap_err();
        assert_eq!(err.field, "uid");
    }

    #[test]
    fn uid_wrong_length_rejected() {
        let err = validate_project_uid("abc123").unwrap_err();
        assert!(err.constraint.contains("32"));
    }

    #[test]
    fn uid_uppercase_hex_rejected() {
        let err = validate_project_uid("0123456789ABCDEF0123456789ABCDEF").unwrap_err();
        assert!(err.constraint.contains("lowercase"));
    }

    #[test]
    fn parent_uid_error_names_parent_field() {
        let err = validate_parent_uid("nope").unwrap_err();
        assert_eq!(err.field, "parent_uid");
    }

    // =========================================================================
    // parse_entity_tag tests
    // =========================================================================

    #[test]
    fn tag_valid_decimal() {
        assert_eq!(parse_entity_tag("1").unwrap(), Revision::new(1));
        assert_eq!(parse_entity_tag("42").unwrap(), Revision::new(42));
    }

    #[test]
    fn tag_empty_rejected() {
        let err = parse_entity_tag("").unwrap_err();
        assert_eq!(err.field, "etag");
        assert!(err.constraint.contains("empty"));
    }

    #[test]
    fn tag_non_numeric_rejected() {
        let err = parse_entity_tag("abc").unwrap_err();
        assert!(err.constraint.contains("decimal"));
    }

    #[test]
    fn tag_negative_rejected() {
        assert!(parse_entity_tag("-1").is_err());
    }

    #[test]
    fn validation_error_display() {
        let err = ValidationError::new("slug", "too long");
        assert_eq!(err.to_string(), "slug: too long");
    }
}
