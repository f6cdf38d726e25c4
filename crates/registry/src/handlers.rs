//! Bus query handlers.
//!
//! Other services resolve project identity over the message bus with
//! request/reply queries. Replies are raw UTF-8 bytes; any failure —
//! unknown subject, malformed payload, missing project, store error —
//! yields an empty reply so the caller treats it as "not found". The
//! failure itself is logged here, never signaled on the wire.

use launchpad_store::KvBucket;
use launchpad_types::{ProjectSlug, ProjectUid, validation};
use tracing::{debug, warn};

use crate::repository::ProjectRepository;

/// Subjects served by [`QueryHandlers`].
pub mod subjects {
    /// Request payload: project UID. Reply: project name.
    pub const NAME_FROM_UID: &str = "project.name-from-uid";
    /// Request payload: project slug. Reply: project UID.
    pub const UID_FROM_SLUG: &str = "project.uid-from-slug";
}

/// Identity-resolution query handlers backed by the repository.
pub struct QueryHandlers<B: KvBucket> {
    repo: ProjectRepository<B>,
}

impl<B: KvBucket> QueryHandlers<B> {
    /// Creates handlers over the given repository.
    pub fn new(repo: ProjectRepository<B>) -> Self {
        Self { repo }
    }

    /// Dispatches one request to its subject handler.
    ///
    /// Returns the reply payload; empty on any failure.
    pub async fn handle_request(&self, subject: &str, payload: &[u8]) -> Vec<u8> {
        match subject {
            subjects::NAME_FROM_UID => self.name_from_uid(payload).await,
            subjects::UID_FROM_SLUG => self.uid_from_slug(payload).await,
            other => {
                warn!(subject = other, "unknown query subject");
                Vec::new()
            }
        }
    }

    async fn name_from_uid(&self, payload: &[u8]) -> Vec<u8> {
        let Ok(uid) = std::str::from_utf8(payload) else {
            warn!(subject = subjects::NAME_FROM_UID, "non-UTF-8 request payload");
            return Vec::new();
        };
        if let Err(e) = validation::validate_project_uid(uid) {
            warn!(subject = subjects::NAME_FROM_UID, error = %e, "malformed uid in request");
            return Vec::new();
        }
        match self.repo.get_project_base(&ProjectUid::new(uid)).await {
            Ok(base) => base.name.into_bytes(),
            Err(e) => {
                debug!(subject = subjects::NAME_FROM_UID, uid, error = %e, "lookup failed");
                Vec::new()
            }
        }
    }

    async fn uid_from_slug(&self, payload: &[u8]) -> Vec<u8> {
        let Ok(slug) = std::str::from_utf8(payload) else {
            warn!(subject = subjects::UID_FROM_SLUG, "non-UTF-8 request payload");
            return Vec::new();
        };
        match self.repo.get_project_uid_from_slug(&ProjectSlug::new(slug)).await {
            Ok(uid) => uid.into_string().into_bytes(),
            Err(e) => {
                debug!(subject = subjects::UID_FROM_SLUG, slug, error = %e, "lookup failed");
                Vec::new()
            }
        }
    }
}
