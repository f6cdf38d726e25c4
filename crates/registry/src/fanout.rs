//! Notification fan-out for downstream indexing and access control.
//!
//! After a repository mutation commits, the applicable notifications are
//! dispatched concurrently and joined; the first publish error is
//! surfaced and the whole operation reported failed, even though the
//! store mutation already committed. No rollback is attempted.
//! Publishes are at-most-once: a failure is only visible when the
//! publish call itself errors.

use std::sync::Arc;

use launchpad_bus::MessageBus;
use launchpad_types::{ProjectBase, ProjectSettings, ProjectUid};
use serde::Serialize;
use tracing::debug;

use crate::error::{RegistryError, Result};

/// Subjects consumed by the downstream indexing and access-control
/// systems.
pub mod subjects {
    /// Index update for a base entity.
    pub const INDEX_PROJECT_UPDATE: &str = "index.project.update";
    /// Index removal for a base entity.
    pub const INDEX_PROJECT_DELETE: &str = "index.project.delete";
    /// Index update for a settings entity.
    pub const INDEX_SETTINGS_UPDATE: &str = "index.project-settings.update";
    /// Index removal for a settings entity.
    pub const INDEX_SETTINGS_DELETE: &str = "index.project-settings.delete";
    /// Access-control update for a base entity.
    pub const ACCESS_PROJECT_UPDATE: &str = "access.project.update";
    /// Access-control removal for a base entity.
    pub const ACCESS_PROJECT_DELETE: &str = "access.project.delete";
    /// Access-control update for a settings entity.
    pub const ACCESS_SETTINGS_UPDATE: &str = "access.project-settings.update";
    /// Access-control removal for a settings entity.
    pub const ACCESS_SETTINGS_DELETE: &str = "access.project-settings.delete";
}

/// Payload for base-entity index notifications.
#[derive(Debug, Serialize)]
struct ProjectIndexed<'a> {
    uid: &'a str,
    slug: &'a str,
    name: &'a str,
    description: &'a str,
    public: bool,
}

/// Payload for base-entity access notifications.
#[derive(Debug, Serialize)]
struct ProjectAccess<'a> {
    uid: &'a str,
    public: bool,
    parent_uid: Option<&'a str>,
}

/// Payload for settings index notifications.
#[derive(Debug, Serialize)]
struct SettingsIndexed<'a> {
    uid: &'a str,
    mission_statement: &'a str,
}

/// Payload for settings access notifications: the role lists the
/// access-control system derives grants from.
#[derive(Debug, Serialize)]
struct SettingsAccess<'a> {
    uid: &'a str,
    writers: Vec<&'a str>,
    auditors: Vec<&'a str>,
    meeting_coordinators: Vec<&'a str>,
}

/// Payload for delete notifications.
#[derive(Debug, Serialize)]
struct Deleted<'a> {
    uid: &'a str,
}

/// Publishes change notifications for every successful mutation.
#[derive(Clone)]
pub struct ChangeNotifier {
    bus: Arc<dyn MessageBus>,
}

impl ChangeNotifier {
    /// Creates a notifier over the given bus.
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self { bus }
    }

    /// Fans out creation notifications for both partitions.
    pub async fn project_created(
        &self,
        base: &ProjectBase,
        settings: &ProjectSettings,
    ) -> Result<()> {
        let index = index_payload(base);
        let access = access_payload(base);
        let settings_index = settings_index_payload(settings);
        let settings_access = settings_access_payload(settings);
        futures::try_join!(
            self.publish(subjects::INDEX_PROJECT_UPDATE, &index),
            self.publish(subjects::ACCESS_PROJECT_UPDATE, &access),
            self.publish(subjects::INDEX_SETTINGS_UPDATE, &settings_index),
            self.publish(subjects::ACCESS_SETTINGS_UPDATE, &settings_access),
        )?;
        debug!(uid = %base.uid, "creation notifications dispatched");
        Ok(())
    }

    /// Fans out update notifications for the base partition.
    pub async fn project_base_updated(&self, base: &ProjectBase) -> Result<()> {
        let index = index_payload(base);
        let access = access_payload(base);
        futures::try_join!(
            self.publish(subjects::INDEX_PROJECT_UPDATE, &index),
            self.publish(subjects::ACCESS_PROJECT_UPDATE, &access),
        )?;
        Ok(())
    }

    /// Fans out update notifications for the settings partition.
    pub async fn project_settings_updated(&self, settings: &ProjectSettings) -> Result<()> {
        let settings_index = settings_index_payload(settings);
        let settings_access = settings_access_payload(settings);
        futures::try_join!(
            self.publish(subjects::INDEX_SETTINGS_UPDATE, &settings_index),
            self.publish(subjects::ACCESS_SETTINGS_UPDATE, &settings_access),
        )?;
        Ok(())
    }

    /// Fans out deletion notifications for both partitions.
    pub async fn project_deleted(&self, uid: &ProjectUid) -> Result<()> {
        let payload = Deleted { uid: uid.as_str() };
        futures::try_join!(
            self.publish(subjects::INDEX_PROJECT_DELETE, &payload),
            self.publish(subjects::ACCESS_PROJECT_DELETE, &payload),
            self.publish(subjects::INDEX_SETTINGS_DELETE, &payload),
            self.publish(subjects::ACCESS_SETTINGS_DELETE, &payload),
        )?;
        debug!(uid = %uid, "deletion notifications dispatched");
        Ok(())
    }

    async fn publish<T: Serialize>(&self, subject: &'static str, body: &T) -> Result<()> {
        let payload = serde_json::to_vec(body)
            .map_err(|source| RegistryError::NotifyEncode { subject, source })?;
        self.bus
            .publish(subject, payload)
            .await
            .map_err(|source| RegistryError::Notify { source })
    }
}

fn index_payload(base: &ProjectBase) -> ProjectIndexed<'_> {
    ProjectIndexed {
        uid: base.uid.as_str(),
        slug: base.slug.as_str(),
        name: &base.name,
        description: &base.description,
        public: base.public,
    }
}

fn access_payload(base: &ProjectBase) -> ProjectAccess<'_> {
    ProjectAccess {
        uid: base.uid.as_str(),
        public: base.public,
        parent_uid: base.parent_uid.as_ref().map(|p| p.as_str()),
    }
}

fn settings_index_payload(settings: &ProjectSettings) -> SettingsIndexed<'_> {
    SettingsIndexed {
        uid: settings.uid.as_str(),
        mission_statement: &settings.mission_statement,
    }
}

fn settings_access_payload(settings: &ProjectSettings) -> SettingsAccess<'_> {
    SettingsAccess {
        uid: settings.uid.as_str(),
        writers: settings.writers.iter().map(|u| u.user_uid.as_str()).collect(),
        auditors: settings.auditors.iter().map(|u| u.user_uid.as_str()).collect(),
        meeting_coordinators: settings
            .meeting_coordinators
            .iter()
            .map(|u| u.user_uid.as_str())
            .collect(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use launchpad_bus::MemoryBus;
    use launchpad_test_utils::{base_fixture, settings_fixture};

    use super::*;

    #[tokio::test]
    async fn creation_fans_out_to_all_four_subjects() {
        let bus = Arc::new(MemoryBus::new());
        let notifier = ChangeNotifier::new(bus.clone());
        let base = base_fixture("acme", "Acme");
        let settings = settings_fixture(&base.uid);

        notifier.project_created(&base, &settings).await.unwrap();

        for subject in [
            subjects::INDEX_PROJECT_UPDATE,
            subjects::ACCESS_PROJECT_UPDATE,
            subjects::INDEX_SETTINGS_UPDATE,
            subjects::ACCESS_SETTINGS_UPDATE,
        ] {
            assert_eq!(bus.count_for(subject), 1, "missing publish on {subject}");
        }
    }

    #[tokio::test]
    async fn first_publish_error_fails_the_fanout() {
        let bus = Arc::new(MemoryBus::new());
        bus.fail_subject(subjects::ACCESS_PROJECT_UPDATE);
        let notifier = ChangeNotifier::new(bus.clone());
        let base = base_fixture("acme", "Acme");

        let err = notifier.project_base_updated(&base).await.unwrap_err();
        assert!(matches!(err, RegistryError::Notify { .. }));
    }

    #[tokio::test]
    async fn index_payload_is_json_with_expected_fields() {
        let bus = Arc::new(MemoryBus::new());
        let notifier = ChangeNotifier::new(bus.clone());
        let base = base_fixture("acme", "Acme");

        notifier.project_base_updated(&base).await.unwrap();

        let published = bus.published();
        let index_msg = published
            .iter()
            .find(|m| m.subject == subjects::INDEX_PROJECT_UPDATE)
            .expect("index publish");
        let body: serde_json::Value = serde_json::from_slice(&index_msg.payload).unwrap();
        assert_eq!(body["slug"], "acme");
        assert_eq!(body["name"], "Acme");
        assert_eq!(body["uid"], base.uid.as_str());
    }

    #[tokio::test]
    async fn deletion_fans_out_delete_subjects_only() {
        let bus = Arc::new(MemoryBus::new());
        let notifier = ChangeNotifier::new(bus.clone());
        let uid = launchpad_types::ProjectUid::generate();

        notifier.project_deleted(&uid).await.unwrap();

        assert_eq!(bus.count_for(subjects::INDEX_PROJECT_DELETE), 1);
        assert_eq!(bus.count_for(subjects::ACCESS_SETTINGS_DELETE), 1);
        assert_eq!(bus.count_for(subjects::INDEX_PROJECT_UPDATE), 0);
    }
}
