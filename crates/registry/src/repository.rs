//! Project repository over the versioned KV store.
//!
//! Owns the `projects` bucket (base entities plus slug mappings) and the
//! `project-settings` bucket. Multi-key mutations are explicit sagas:
//! each store write commits independently, a mid-sequence failure leaves
//! prior writes in place, and compensation steps run best-effort with
//! failures logged rather than surfaced.

use std::collections::HashMap;
use std::sync::Arc;

use launchpad_store::{KvBucket, StoreError};
use launchpad_types::codec;
use launchpad_types::{ProjectBase, ProjectSettings, ProjectSlug, ProjectUid, Revision};
use tracing::{debug, warn};

use crate::error::{RegistryError, Result};
use crate::keys::{is_slug_key, slug_key};

/// Repository for project base and settings entities.
///
/// Generic over the bucket backend; both buckets share one backend type.
/// Safe for concurrent use — all cross-writer correctness rests on the
/// store's revision-based conditional writes.
pub struct ProjectRepository<B: KvBucket> {
    projects: Arc<B>,
    settings: Arc<B>,
}

impl<B: KvBucket> Clone for ProjectRepository<B> {
    fn clone(&self) -> Self {
        Self { projects: self.projects.clone(), settings: self.settings.clone() }
    }
}

impl<B: KvBucket> ProjectRepository<B> {
    /// Creates a repository over the two buckets.
    pub fn new(projects: Arc<B>, settings: Arc<B>) -> Self {
        Self { projects, settings }
    }

    /// Creates a project: slug mapping, then base entity, then settings.
    ///
    /// The mapping claim is a create-only conditional write and is the
    /// sole linearization point for slug uniqueness; the preliminary
    /// existence read only improves the common-case error. The three
    /// writes are not atomic: if a later step fails, earlier writes are
    /// compensated best-effort in reverse order.
    ///
    /// Returns the base entity's initial revision.
    ///
    /// # Errors
    ///
    /// `SlugExists` if the slug mapping is already claimed; `Store` /
    /// `Codec` on other failures.
    pub async fn create_project(
        &self,
        base: &ProjectBase,
        settings: &ProjectSettings,
    ) -> Result<Revision> {
        let mapping_key = slug_key(&base.slug);

        // Fast-path hint only; the create below is authoritative.
        if self.project_slug_exists(&base.slug).await? {
            return Err(RegistryError::SlugExists { slug: base.slug.clone() });
        }

        match self.projects.create(&mapping_key, base.uid.as_str().as_bytes().to_vec()).await {
            Ok(_) => {},
            Err(StoreError::KeyExists { .. }) => {
                // Lost the race after the hint passed.
                return Err(RegistryError::SlugExists { slug: base.slug.clone() });
            },
            Err(source) => {
                return Err(RegistryError::Store { operation: "claim-slug-mapping", source })
            },
        }

        let base_bytes = codec::encode(base)
            .map_err(|source| RegistryError::Codec { key: base.uid.to_string(), source })?;
        let base_revision = match self.projects.put(base.uid.as_str(), base_bytes).await {
            Ok(revision) => revision,
            Err(source) => {
                self.release_mapping(&mapping_key).await;
                return Err(RegistryError::Store { operation: "put-base", source });
            },
        };

        let settings_bytes = codec::encode(settings)
            .map_err(|source| RegistryError::Codec { key: settings.uid.to_string(), source })?;
        if let Err(source) = self.settings.put(settings.uid.as_str(), settings_bytes).await {
            // Compensate in reverse order; the resource never becomes
            // visible through a successful create.
            if let Err(e) = self.projects.delete(base.uid.as_str(), None).await {
                warn!(uid = %base.uid, error = %e, "compensating base delete failed");
            }
            self.release_mapping(&mapping_key).await;
            return Err(RegistryError::Store { operation: "put-settings", source });
        }

        debug!(uid = %base.uid, slug = %base.slug, "project created");
        Ok(base_revision)
    }

    /// Reads the base entity for `uid`.
    ///
    /// # Errors
    ///
    /// `ProjectNotFound` if absent.
    pub async fn get_project_base(&self, uid: &ProjectUid) -> Result<ProjectBase> {
        self.get_project_base_with_revision(uid).await.map(|(base, _)| base)
    }

    /// Reads the base entity together with its store revision.
    ///
    /// # Errors
    ///
    /// `ProjectNotFound` if absent.
    pub async fn get_project_base_with_revision(
        &self,
        uid: &ProjectUid,
    ) -> Result<(ProjectBase, Revision)> {
        let entry = self
            .projects
            .get(uid.as_str())
            .await
            .map_err(|e| map_base_error(uid, "get-base", e))?;
        let base = codec::decode(&entry.value)
            .map_err(|source| RegistryError::Codec { key: uid.to_string(), source })?;
        Ok((base, entry.revision))
    }

    /// Reads the settings entity together with its store revision.
    ///
    /// # Errors
    ///
    /// `ProjectNotFound` if absent.
    pub async fn get_project_settings_with_revision(
        &self,
        uid: &ProjectUid,
    ) -> Result<(ProjectSettings, Revision)> {
        let entry = self
            .settings
            .get(uid.as_str())
            .await
            .map_err(|e| map_base_error(uid, "get-settings", e))?;
        let settings = codec::decode(&entry.value)
            .map_err(|source| RegistryError::Codec { key: uid.to_string(), source })?;
        Ok((settings, entry.revision))
    }

    /// Replaces the base entity, conditional on `expected`.
    ///
    /// On a slug change the new mapping is claimed first (create-only),
    /// then the base is updated, then the old mapping key is retired.
    /// If the base update fails, the just-claimed mapping is released
    /// again; both cleanup steps are best-effort and logged on failure.
    ///
    /// # Errors
    ///
    /// `ProjectNotFound` if absent, `RevisionConflict` on a stale tag,
    /// `SlugExists` if a changed slug is taken.
    pub async fn update_project_base(
        &self,
        uid: &ProjectUid,
        base: &ProjectBase,
        expected: Revision,
    ) -> Result<Revision> {
        let current = self.get_project_base(uid).await?;
        let slug_changed = current.slug != base.slug;

        if slug_changed {
            // Fast-path hint, then the authoritative claim.
            if self.project_slug_exists(&base.slug).await? {
                return Err(RegistryError::SlugExists { slug: base.slug.clone() });
            }
            match self
                .projects
                .create(&slug_key(&base.slug), uid.as_str().as_bytes().to_vec())
                .await
            {
                Ok(_) => {},
                Err(StoreError::KeyExists { .. }) => {
                    return Err(RegistryError::SlugExists { slug: base.slug.clone() });
                },
                Err(source) => {
                    return Err(RegistryError::Store { operation: "claim-slug-mapping", source })
                },
            }
        }

        let bytes = codec::encode(base)
            .map_err(|source| RegistryError::Codec { key: uid.to_string(), source })?;
        match self.projects.update(uid.as_str(), bytes, expected).await {
            Ok(revision) => {
                if slug_changed {
                    self.release_mapping(&slug_key(&current.slug)).await;
                    debug!(uid = %uid, old = %current.slug, new = %base.slug, "slug renamed");
                }
                Ok(revision)
            },
            Err(e) => {
                if slug_changed {
                    self.release_mapping(&slug_key(&base.slug)).await;
                }
                Err(map_base_error(uid, "update-base", e))
            },
        }
    }

    /// Replaces the settings entity, conditional on `expected`.
    ///
    /// The settings partition carries its own revision, independent of
    /// the base entity's.
    ///
    /// # Errors
    ///
    /// `ProjectNotFound` if absent, `RevisionConflict` on a stale tag.
    pub async fn update_project_settings(
        &self,
        uid: &ProjectUid,
        settings: &ProjectSettings,
        expected: Revision,
    ) -> Result<Revision> {
        let bytes = codec::encode(settings)
            .map_err(|source| RegistryError::Codec { key: uid.to_string(), source })?;
        self.settings
            .update(uid.as_str(), bytes, expected)
            .await
            .map_err(|e| map_base_error(uid, "update-settings", e))
    }

    /// Deletes the project: revision-checked base delete, then full
    /// cleanup of the settings entity and slug mapping.
    ///
    /// The cleanup steps are unconditional and best-effort; a failure
    /// there is logged, not surfaced, since the resource is already gone
    /// from the authoritative partition.
    ///
    /// # Errors
    ///
    /// `ProjectNotFound` if absent, `RevisionConflict` on a stale tag.
    pub async fn delete_project(&self, uid: &ProjectUid, expected: Revision) -> Result<()> {
        let base = self.get_project_base(uid).await?;

        self.projects
            .delete(uid.as_str(), Some(expected))
            .await
            .map_err(|e| map_base_error(uid, "delete-base", e))?;

        match self.settings.delete(uid.as_str(), None).await {
            Ok(()) | Err(StoreError::NotFound { .. }) => {},
            Err(e) => warn!(uid = %uid, error = %e, "settings cleanup failed"),
        }
        self.release_mapping(&slug_key(&base.slug)).await;

        debug!(uid = %uid, slug = %base.slug, "project deleted");
        Ok(())
    }

    /// Whether a slug mapping exists. Read-only; never authoritative for
    /// claiming.
    ///
    /// # Errors
    ///
    /// `Store` on backend failure.
    pub async fn project_slug_exists(&self, slug: &ProjectSlug) -> Result<bool> {
        match self.projects.get(&slug_key(slug)).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound { .. }) => Ok(false),
            Err(source) => Err(RegistryError::Store { operation: "get-slug-mapping", source }),
        }
    }

    /// Resolves a slug to the owning project UID.
    ///
    /// # Errors
    ///
    /// `ProjectNotFound` if no mapping exists.
    pub async fn get_project_uid_from_slug(&self, slug: &ProjectSlug) -> Result<ProjectUid> {
        let key = slug_key(slug);
        let entry = match self.projects.get(&key).await {
            Ok(entry) => entry,
            Err(StoreError::NotFound { .. }) => {
                return Err(RegistryError::ProjectNotFound { identifier: slug.to_string() });
            },
            Err(source) => {
                return Err(RegistryError::Store { operation: "get-slug-mapping", source })
            },
        };
        let uid = String::from_utf8(entry.value).map_err(|e| RegistryError::Corrupt {
            key,
            message: format!("mapping value is not UTF-8: {e}"),
        })?;
        Ok(ProjectUid::new(uid))
    }

    /// Enumerates both buckets and returns two UID-keyed maps for the
    /// caller to zip.
    ///
    /// Entries that vanish mid-listing or fail to decode are skipped — a
    /// defined degraded behavior, not an error — so one corrupt settings
    /// entry cannot take down the whole listing.
    ///
    /// # Errors
    ///
    /// `Store` if a bucket listing itself fails.
    pub async fn list_all_projects(
        &self,
    ) -> Result<(HashMap<ProjectUid, ProjectBase>, HashMap<ProjectUid, ProjectSettings>)> {
        let mut bases = HashMap::new();
        let project_keys = self
            .projects
            .keys()
            .await
            .map_err(|source| RegistryError::Store { operation: "list-projects", source })?;
        for key in project_keys.into_iter().filter(|k| !is_slug_key(k)) {
            let entry = match self.projects.get(&key).await {
                Ok(entry) => entry,
                Err(StoreError::NotFound { .. }) => continue,
                Err(source) => {
                    return Err(RegistryError::Store { operation: "list-projects", source })
                },
            };
            match codec::decode::<ProjectBase>(&entry.value) {
                Ok(base) => {
                    bases.insert(base.uid.clone(), base);
                },
                Err(e) => debug!(key = %key, error = %e, "skipping undecodable base entry"),
            }
        }

        let mut all_settings = HashMap::new();
        let settings_keys = self
            .settings
            .keys()
            .await
            .map_err(|source| RegistryError::Store { operation: "list-settings", source })?;
        for key in settings_keys {
            let entry = match self.settings.get(&key).await {
                Ok(entry) => entry,
                Err(StoreError::NotFound { .. }) => continue,
                Err(source) => {
                    return Err(RegistryError::Store { operation: "list-settings", source })
                },
            };
            match codec::decode::<ProjectSettings>(&entry.value) {
                Ok(settings) => {
                    all_settings.insert(settings.uid.clone(), settings);
                },
                Err(e) => debug!(key = %key, error = %e, "skipping undecodable settings entry"),
            }
        }

        Ok((bases, all_settings))
    }

    /// Best-effort removal of a slug mapping key.
    async fn release_mapping(&self, mapping_key: &str) {
        match self.projects.delete(mapping_key, None).await {
            Ok(()) | Err(StoreError::NotFound { .. }) => {},
            Err(e) => warn!(key = %mapping_key, error = %e, "slug mapping cleanup failed"),
        }
    }
}

fn map_base_error(uid: &ProjectUid, operation: &'static str, err: StoreError) -> RegistryError {
    match err {
        StoreError::NotFound { .. } => {
            RegistryError::ProjectNotFound { identifier: uid.to_string() }
        },
        e @ StoreError::RevisionMismatch { .. } => {
            RegistryError::RevisionConflict { uid: uid.clone(), source: e }
        },
        source => RegistryError::Store { operation, source },
    }
}
