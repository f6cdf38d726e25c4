//! Bucket names and key construction.
//!
//! The `projects` bucket holds base entities keyed by UID plus synthetic
//! `slug/`-prefixed mapping entries whose existence is the sole slug
//! uniqueness check. The `project-settings` bucket is keyed by UID only.

use launchpad_types::ProjectSlug;

/// Bucket holding [`ProjectBase`](launchpad_types::ProjectBase) entities
/// and slug mappings.
pub const PROJECTS_BUCKET: &str = "projects";

/// Bucket holding [`ProjectSettings`](launchpad_types::ProjectSettings)
/// entities.
pub const SETTINGS_BUCKET: &str = "project-settings";

/// Prefix of synthetic slug-mapping keys in the projects bucket.
pub const SLUG_KEY_PREFIX: &str = "slug/";

/// Builds the mapping key for a slug.
pub fn slug_key(slug: &ProjectSlug) -> String {
    format!("{SLUG_KEY_PREFIX}{slug}")
}

/// Whether a projects-bucket key is a slug mapping rather than a base
/// entity.
pub fn is_slug_key(key: &str) -> bool {
    key.starts_with(SLUG_KEY_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_key_format() {
        let key = slug_key(&ProjectSlug::new("acme"));
        assert_eq!(key, "slug/acme");
    }

    #[test]
    fn slug_keys_are_distinguished_from_uids() {
        assert!(is_slug_key("slug/acme"));
        assert!(!is_slug_key("0123456789abcdef0123456789abcdef"));
        // A UID can never collide with the prefix: UIDs are hex only.
        assert!(!is_slug_key("slugless"));
    }
}
