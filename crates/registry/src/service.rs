//! Orchestrating project service.
//!
//! Validates input shape, converts drafts into entities, delegates to the
//! repository and then the notification fan-out, and assembles the sparse
//! public view. Policy gates (the Crowdfunding-only delete rule) live
//! here, checked before any revision-checked store write.

use chrono::{DateTime, NaiveDate, Utc};
use launchpad_store::KvBucket;
use launchpad_types::config::ValidationConfig;
use launchpad_types::{
    FUNDING_MODEL_CROWDFUNDING, ProjectBase, ProjectSettings, ProjectSlug, ProjectUid, Revision,
    UserIdentity, ValidationError, validation,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RegistryError, Result};
use crate::fanout::ChangeNotifier;
use crate::repository::ProjectRepository;

/// Inbound shape for creating or updating a project's base attributes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectDraft {
    /// Desired globally unique slug.
    pub slug: String,
    /// Display name (required).
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Public visibility flag.
    #[serde(default)]
    pub public: bool,
    /// Optional parent project UID; must name an existing project.
    #[serde(default)]
    pub parent_uid: Option<String>,
    /// Lifecycle stage label.
    #[serde(default)]
    pub stage: String,
    /// Business category label.
    #[serde(default)]
    pub category: String,
    /// Legal form label.
    #[serde(default)]
    pub legal_form: String,
    /// Funding model labels.
    #[serde(default)]
    pub funding_models: Vec<String>,
    /// Formal formation date.
    #[serde(default)]
    pub formation_date: Option<NaiveDate>,
}

/// Inbound shape for creating or updating project settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsDraft {
    /// Internal mission statement.
    #[serde(default)]
    pub mission_statement: String,
    /// Planned announcement date.
    #[serde(default)]
    pub announcement_date: Option<DateTime<Utc>>,
    /// Users allowed to author content.
    #[serde(default)]
    pub writers: Vec<UserIdentity>,
    /// Users with audit access.
    #[serde(default)]
    pub auditors: Vec<UserIdentity>,
    /// Users coordinating meetings.
    #[serde(default)]
    pub meeting_coordinators: Vec<UserIdentity>,
}

/// Sparse public projection of a project.
///
/// Zero/empty fields are omitted from serialization rather than emitted
/// as nulls. The entity tag carries the base partition's store revision
/// in decimal form; list entries omit it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProjectView {
    /// Immutable unique identifier.
    pub uid: String,
    /// Globally unique slug.
    pub slug: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    /// Display name.
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    /// Free-form description.
    pub description: String,
    #[serde(skip_serializing_if = "is_false")]
    /// Public visibility flag.
    pub public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Parent project UID.
    pub parent_uid: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    /// Lifecycle stage label.
    pub stage: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    /// Business category label.
    pub category: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    /// Legal form label.
    pub legal_form: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    /// Funding model labels.
    pub funding_models: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Formal formation date.
    pub formation_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "String::is_empty")]
    /// Internal mission statement, when the settings partition is
    /// readable.
    pub mission_statement: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    /// Entity tag: the base partition's store revision, decimal.
    pub etag: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Orchestrator for project mutations and reads.
pub struct ProjectService<B: KvBucket> {
    repo: ProjectRepository<B>,
    notifier: Option<ChangeNotifier>,
    limits: ValidationConfig,
}

impl<B: KvBucket> ProjectService<B> {
    /// Creates a service without a wired notifier. Mutations will fail
    /// `ServiceUnavailable` until [`with_notifier`](Self::with_notifier)
    /// is used.
    pub fn new(repo: ProjectRepository<B>) -> Self {
        Self { repo, notifier: None, limits: ValidationConfig::default() }
    }

    /// Wires the notification fan-out.
    #[must_use]
    pub fn with_notifier(mut self, notifier: ChangeNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Overrides the validation limits.
    #[must_use]
    pub fn with_limits(mut self, limits: ValidationConfig) -> Self {
        self.limits = limits;
        self
    }

    fn notifier(&self) -> Result<&ChangeNotifier> {
        self.notifier
            .as_ref()
            .ok_or(RegistryError::Unavailable { dependency: "change notifier" })
    }

    /// Creates a project from the two drafts and fans out creation
    /// notifications.
    ///
    /// # Errors
    ///
    /// `Validation` on shape violations (including a parent UID that does
    /// not resolve), `SlugExists` if the slug is taken, `Unavailable` if
    /// the notifier is not wired, `Notify` if a publish fails after the
    /// store writes committed.
    pub async fn create_project(
        &self,
        draft: ProjectDraft,
        settings_draft: SettingsDraft,
    ) -> Result<ProjectView> {
        let notifier = self.notifier()?;
        self.validate_draft(&draft)?;
        self.validate_settings_draft(&settings_draft)?;
        let parent_uid = self.resolve_parent(&draft).await?;

        let now = Utc::now();
        let uid = ProjectUid::generate();
        let base = ProjectBase {
            uid: uid.clone(),
            slug: ProjectSlug::new(draft.slug),
            name: draft.name,
            description: draft.description,
            public: draft.public,
            parent_uid,
            stage: draft.stage,
            category: draft.category,
            legal_form: draft.legal_form,
            funding_models: draft.funding_models,
            formation_date: draft.formation_date,
            created_at: now,
            updated_at: now,
        };
        let settings = ProjectSettings {
            uid: uid.clone(),
            mission_statement: settings_draft.mission_statement,
            announcement_date: settings_draft.announcement_date,
            writers: settings_draft.writers,
            auditors: settings_draft.auditors,
            meeting_coordinators: settings_draft.meeting_coordinators,
            created_at: now,
            updated_at: now,
        };

        let revision = self.repo.create_project(&base, &settings).await?;
        notifier.project_created(&base, &settings).await?;

        info!(uid = %uid, slug = %base.slug, "project created");
        Ok(assemble_view(&base, Some(&settings), Some(revision)))
    }

    /// Reads one project, zipping in the settings partition when
    /// readable.
    ///
    /// # Errors
    ///
    /// `Validation` on a malformed UID, `ProjectNotFound` if absent.
    pub async fn get_project(&self, uid: &str) -> Result<ProjectView> {
        validation::validate_project_uid(uid)
            .map_err(|source| RegistryError::Validation { source })?;
        let uid = ProjectUid::new(uid);
        let (base, revision) = self.repo.get_project_base_with_revision(&uid).await?;
        let settings = match self.repo.get_project_settings_with_revision(&uid).await {
            Ok((settings, _)) => Some(settings),
            Err(RegistryError::ProjectNotFound { .. }) => None,
            Err(e) => return Err(e),
        };
        Ok(assemble_view(&base, settings.as_ref(), Some(revision)))
    }

    /// Lists all projects as sparse views, sorted by slug. List entries
    /// carry no entity tag.
    ///
    /// # Errors
    ///
    /// `Store` if a bucket listing fails.
    pub async fn list_projects(&self) -> Result<Vec<ProjectView>> {
        let (bases, mut settings) = self.repo.list_all_projects().await?;
        let mut views: Vec<ProjectView> = bases
            .into_values()
            .map(|base| {
                let settings = settings.remove(&base.uid);
                assemble_view(&base, settings.as_ref(), None)
            })
            .collect();
        views.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(views)
    }

    /// Updates the base partition, conditional on the presented entity
    /// tag, and fans out update notifications.
    ///
    /// # Errors
    ///
    /// `Validation` on a malformed UID/tag/draft, `ProjectNotFound`,
    /// `RevisionConflict` on a stale tag, `SlugExists` on a rename to a
    /// taken slug.
    pub async fn update_project(
        &self,
        uid: &str,
        draft: ProjectDraft,
        etag: &str,
    ) -> Result<ProjectView> {
        let notifier = self.notifier()?;
        validation::validate_project_uid(uid)
            .map_err(|source| RegistryError::Validation { source })?;
        let expected = parse_tag(etag)?;
        self.validate_draft(&draft)?;
        let parent_uid = self.resolve_parent(&draft).await?;

        let uid = ProjectUid::new(uid);
        let (current, _) = self.repo.get_project_base_with_revision(&uid).await?;
        let base = ProjectBase {
            uid: uid.clone(),
            slug: ProjectSlug::new(draft.slug),
            name: draft.name,
            description: draft.description,
            public: draft.public,
            parent_uid,
            stage: draft.stage,
            category: draft.category,
            legal_form: draft.legal_form,
            funding_models: draft.funding_models,
            formation_date: draft.formation_date,
            created_at: current.created_at,
            updated_at: Utc::now(),
        };

        let revision = self.repo.update_project_base(&uid, &base, expected).await?;
        notifier.project_base_updated(&base).await?;

        Ok(assemble_view(&base, None, Some(revision)))
    }

    /// Updates the settings partition, conditional on its own entity
    /// tag, and fans out settings notifications. The returned view
    /// carries the settings partition's new tag.
    ///
    /// # Errors
    ///
    /// `Validation` on a malformed UID/tag, `ProjectNotFound`,
    /// `RevisionConflict` on a stale tag.
    pub async fn update_project_settings(
        &self,
        uid: &str,
        draft: SettingsDraft,
        etag: &str,
    ) -> Result<ProjectView> {
        let notifier = self.notifier()?;
        validation::validate_project_uid(uid)
            .map_err(|source| RegistryError::Validation { source })?;
        let expected = parse_tag(etag)?;
        self.validate_settings_draft(&draft)?;

        let uid = ProjectUid::new(uid);
        let (current, _) = self.repo.get_project_settings_with_revision(&uid).await?;
        let settings = ProjectSettings {
            uid: uid.clone(),
            mission_statement: draft.mission_statement,
            announcement_date: draft.announcement_date,
            writers: draft.writers,
            auditors: draft.auditors,
            meeting_coordinators: draft.meeting_coordinators,
            created_at: current.created_at,
            updated_at: Utc::now(),
        };

        let revision = self.repo.update_project_settings(&uid, &settings, expected).await?;
        notifier.project_settings_updated(&settings).await?;

        let base = self.repo.get_project_base(&uid).await?;
        Ok(assemble_view(&base, Some(&settings), Some(revision)))
    }

    /// Deletes a project after the funding-model policy gate.
    ///
    /// Deletion is permitted only when the funding-model list is exactly
    /// `["Crowdfunding"]` — any other set, including a superset, fails
    /// before the revision-checked delete is attempted.
    ///
    /// # Errors
    ///
    /// `Validation`, `ProjectNotFound`,
    /// `CannotDeleteNonCrowdfunding`, `RevisionConflict`.
    pub async fn delete_project(&self, uid: &str, etag: &str) -> Result<()> {
        let notifier = self.notifier()?;
        validation::validate_project_uid(uid)
            .map_err(|source| RegistryError::Validation { source })?;
        let expected = parse_tag(etag)?;

        let uid = ProjectUid::new(uid);
        let base = self.repo.get_project_base(&uid).await?;
        if base.funding_models != [FUNDING_MODEL_CROWDFUNDING] {
            return Err(RegistryError::CannotDeleteNonCrowdfunding { uid });
        }

        self.repo.delete_project(&uid, expected).await?;
        notifier.project_deleted(&uid).await?;

        info!(uid = %uid, slug = %base.slug, "project deleted");
        Ok(())
    }

    fn validate_draft(&self, draft: &ProjectDraft) -> Result<()> {
        validation::validate_slug(&draft.slug, &self.limits)
            .map_err(|source| RegistryError::Validation { source })?;
        if draft.name.trim().is_empty() {
            return Err(RegistryError::Validation {
                source: ValidationError::new("name", "must not be empty"),
            });
        }
        if draft.name.len() > self.limits.max_name_bytes {
            return Err(RegistryError::Validation {
                source: ValidationError::new(
                    "name",
                    format!(
                        "length {} bytes exceeds maximum {} bytes",
                        draft.name.len(),
                        self.limits.max_name_bytes
                    ),
                ),
            });
        }
        if draft.description.len() > self.limits.max_description_bytes {
            return Err(RegistryError::Validation {
                source: ValidationError::new(
                    "description",
                    format!(
                        "length {} bytes exceeds maximum {} bytes",
                        draft.description.len(),
                        self.limits.max_description_bytes
                    ),
                ),
            });
        }
        Ok(())
    }

    fn validate_settings_draft(&self, draft: &SettingsDraft) -> Result<()> {
        if draft.mission_statement.len() > self.limits.max_mission_statement_bytes {
            return Err(RegistryError::Validation {
                source: ValidationError::new(
                    "mission_statement",
                    format!(
                        "length {} bytes exceeds maximum {} bytes",
                        draft.mission_statement.len(),
                        self.limits.max_mission_statement_bytes
                    ),
                ),
            });
        }
        Ok(())
    }

    /// Validates the parent UID syntactically and resolves it to an
    /// existing project. Existence is checked at validation time only; no
    /// ongoing referential integrity is enforced afterwards.
    async fn resolve_parent(&self, draft: &ProjectDraft) -> Result<Option<ProjectUid>> {
        let Some(parent) = draft.parent_uid.as_deref().filter(|p| !p.is_empty()) else {
            return Ok(None);
        };
        validation::validate_parent_uid(parent)
            .map_err(|source| RegistryError::Validation { source })?;
        let parent_uid = ProjectUid::new(parent);
        match self.repo.get_project_base(&parent_uid).await {
            Ok(_) => Ok(Some(parent_uid)),
            Err(RegistryError::ProjectNotFound { .. }) => Err(RegistryError::Validation {
                source: ValidationError::new(
                    "parent_uid",
                    "must name an existing project",
                ),
            }),
            Err(e) => Err(e),
        }
    }
}

fn parse_tag(etag: &str) -> Result<Revision> {
    validation::parse_entity_tag(etag).map_err(|source| RegistryError::Validation { source })
}

fn assemble_view(
    base: &ProjectBase,
    settings: Option<&ProjectSettings>,
    revision: Option<Revision>,
) -> ProjectView {
    ProjectView {
        uid: base.uid.to_string(),
        slug: base.slug.to_string(),
        name: base.name.clone(),
        description: base.description.clone(),
        public: base.public,
        parent_uid: base.parent_uid.as_ref().map(ToString::to_string),
        stage: base.stage.clone(),
        category: base.category.clone(),
        legal_form: base.legal_form.clone(),
        funding_models: base.funding_models.clone(),
        formation_date: base.formation_date,
        mission_statement: settings.map(|s| s.mission_statement.clone()).unwrap_or_default(),
        etag: revision.map(|r| r.to_string()).unwrap_or_default(),
    }
}
