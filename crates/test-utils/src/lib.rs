//! Shared fixtures for workspace tests.
//!
//! Fixtures produce fully-populated entities with a fresh UID per call
//! so tests never collide on storage keys.

use chrono::{TimeZone, Utc};
use launchpad_types::{ProjectBase, ProjectSettings, ProjectSlug, ProjectUid, UserIdentity};

/// Builds a project base entity with the given slug and name.
///
/// Every call generates a fresh UID. Timestamps are fixed so equality
/// assertions stay deterministic.
pub fn base_fixture(slug: &str, name: &str) -> ProjectBase {
    let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).single().unwrap_or_else(Utc::now);
    ProjectBase {
        uid: ProjectUid::generate(),
        slug: ProjectSlug::new(slug),
        name: name.to_string(),
        description: format!("{name} test project"),
        public: true,
        parent_uid: None,
        stage: "Seed".to_string(),
        category: "Technology".to_string(),
        legal_form: "Cooperative".to_string(),
        funding_models: vec!["Crowdfunding".to_string()],
        formation_date: None,
        created_at: created,
        updated_at: created,
    }
}

/// Builds settings for the given project UID, with one user in each
/// role list.
pub fn settings_fixture(uid: &ProjectUid) -> ProjectSettings {
    let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).single().unwrap_or_else(Utc::now);
    ProjectSettings {
        uid: uid.clone(),
        mission_statement: "Build things that matter".to_string(),
        announcement_date: None,
        writers: vec![identity_fixture("writer")],
        auditors: vec![identity_fixture("auditor")],
        meeting_coordinators: vec![identity_fixture("coordinator")],
        created_at: created,
        updated_at: created,
    }
}

/// Builds a user identity tagged with the given role label.
pub fn identity_fixture(role: &str) -> UserIdentity {
    UserIdentity {
        user_uid: ProjectUid::generate().into_string(),
        display_name: format!("Test {role}"),
        email: format!("{role}@example.org"),
    }
}
