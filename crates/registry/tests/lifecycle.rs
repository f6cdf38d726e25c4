//! End-to-end project lifecycle over in-memory backends.
//!
//! Exercises the full create → resolve → rename → conflict → delete
//! path through the service, repository, fan-out, and query handlers
//! wired together the way the server binary wires them.

// Test code is allowed to use unwrap for simplicity
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use launchpad_bus::MemoryBus;
use launchpad_registry::handlers::subjects as query_subjects;
use launchpad_registry::{
    ChangeNotifier, ProjectDraft, ProjectRepository, ProjectService, QueryHandlers, SettingsDraft,
};
use launchpad_store::MemoryBucket;
use launchpad_types::ErrorCode;

struct Harness {
    service: ProjectService<MemoryBucket>,
    handlers: QueryHandlers<MemoryBucket>,
    bus: Arc<MemoryBus>,
}

fn harness() -> Harness {
    let repo = ProjectRepository::new(
        Arc::new(MemoryBucket::new()),
        Arc::new(MemoryBucket::new()),
    );
    let bus = Arc::new(MemoryBus::new());
    let service = ProjectService::new(repo.clone())
        .with_notifier(ChangeNotifier::new(bus.clone()));
    Harness { service, handlers: QueryHandlers::new(repo), bus }
}

fn draft(slug: &str, name: &str, funding_models: &[&str]) -> ProjectDraft {
    ProjectDraft {
        slug: slug.to_string(),
        name: name.to_string(),
        funding_models: funding_models.iter().map(ToString::to_string).collect(),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_resolve_rename_conflict_delete() {
    let h = harness();

    // Create: first write of the base entity yields revision 1.
    let view = h
        .service
        .create_project(draft("acme", "Acme", &["Crowdfunding"]), SettingsDraft::default())
        .await
        .unwrap();
    assert_eq!(view.etag, "1");

    // Slug resolves to the UID over the query bus.
    let reply = h.handlers.handle_request(query_subjects::UID_FROM_SLUG, b"acme").await;
    assert_eq!(reply, view.uid.as_bytes());

    // Rename with the current tag: new slug resolves, old slug is freed.
    let renamed = h
        .service
        .update_project(&view.uid, draft("acme2", "Acme", &["Crowdfunding"]), "1")
        .await
        .unwrap();
    assert_eq!(renamed.etag, "2");
    let reply = h.handlers.handle_request(query_subjects::UID_FROM_SLUG, b"acme2").await;
    assert_eq!(reply, view.uid.as_bytes());
    let reply = h.handlers.handle_request(query_subjects::UID_FROM_SLUG, b"acme").await;
    assert!(reply.is_empty());

    // The freed slug can be claimed by a new project.
    let other = h
        .service
        .create_project(draft("acme", "New Acme", &["Crowdfunding"]), SettingsDraft::default())
        .await
        .unwrap();
    assert_ne!(other.uid, view.uid);

    // A stale tag is rejected without applying the write.
    let err = h
        .service
        .update_project(&view.uid, draft("acme3", "Acme", &["Crowdfunding"]), "1")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::RevisionMismatch);
    let current = h.service.get_project(&view.uid).await.unwrap();
    assert_eq!(current.slug, "acme2");

    // Delete with the current tag; the project and its slug are gone.
    h.service.delete_project(&view.uid, &current.etag).await.unwrap();
    let err = h.service.get_project(&view.uid).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProjectNotFound);
    let reply = h.handlers.handle_request(query_subjects::UID_FROM_SLUG, b"acme2").await;
    assert!(reply.is_empty());
}

#[tokio::test]
async fn create_fans_out_to_all_four_subjects() {
    let h = harness();
    h.service
        .create_project(draft("acme", "Acme", &["Crowdfunding"]), SettingsDraft::default())
        .await
        .unwrap();

    use launchpad_registry::fanout::subjects;
    for subject in [
        subjects::INDEX_PROJECT_UPDATE,
        subjects::INDEX_SETTINGS_UPDATE,
        subjects::ACCESS_PROJECT_UPDATE,
        subjects::ACCESS_SETTINGS_UPDATE,
    ] {
        assert_eq!(h.bus.count_for(subject), 1, "missing publish on {subject}");
    }
}

#[tokio::test]
async fn delete_gate_requires_exactly_crowdfunding() {
    let h = harness();

    // Exactly ["Crowdfunding"]: allowed.
    let allowed = h
        .service
        .create_project(draft("a-ok", "Allowed", &["Crowdfunding"]), SettingsDraft::default())
        .await
        .unwrap();
    h.service.delete_project(&allowed.uid, &allowed.etag).await.unwrap();

    // Superset, different model, empty: all refused before any delete.
    for (slug, models) in [
        ("b-superset", vec!["Crowdfunding", "Membership"]),
        ("c-other", vec!["Membership"]),
        ("d-empty", vec![]),
    ] {
        let view = h
            .service
            .create_project(draft(slug, "Refused", &models), SettingsDraft::default())
            .await
            .unwrap();
        let err = h.service.delete_project(&view.uid, &view.etag).await.unwrap_err();
        assert_eq!(
            err.code(),
            ErrorCode::CannotDeleteNonCrowdfundingProject,
            "gate should refuse {models:?}"
        );
        // Refusal leaves the project untouched.
        assert!(h.service.get_project(&view.uid).await.is_ok());
    }
}

#[tokio::test]
async fn concurrent_creates_with_same_slug_admit_exactly_one() {
    let h = harness();
    let (left, right) = tokio::join!(
        h.service.create_project(draft("acme", "Left", &["Crowdfunding"]), SettingsDraft::default()),
        h.service
            .create_project(draft("acme", "Right", &["Crowdfunding"]), SettingsDraft::default()),
    );

    let (winner, loser) = match (left, right) {
        (Ok(view), Err(err)) | (Err(err), Ok(view)) => (view, err),
        (Ok(_), Ok(_)) => panic!("both creates claimed the same slug"),
        (Err(l), Err(r)) => panic!("both creates failed: {l}; {r}"),
    };
    assert_eq!(loser.code(), ErrorCode::ProjectSlugExists);
    assert_eq!(h.service.list_projects().await.unwrap().len(), 1);
    assert_eq!(h.service.get_project(&winner.uid).await.unwrap().slug, "acme");
}

#[tokio::test]
async fn settings_carry_their_own_entity_tag() {
    let h = harness();
    let view = h
        .service
        .create_project(draft("acme", "Acme", &["Crowdfunding"]), SettingsDraft::default())
        .await
        .unwrap();

    let updated = h
        .service
        .update_project_settings(
            &view.uid,
            SettingsDraft { mission_statement: "Ship it".to_string(), ..Default::default() },
            "1",
        )
        .await
        .unwrap();
    assert_eq!(updated.mission_statement, "Ship it");
    assert_eq!(updated.etag, "2");

    // The settings tag advanced independently of the base tag.
    let err = h
        .service
        .update_project_settings(&view.uid, SettingsDraft::default(), "1")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::RevisionMismatch);

    // The base partition is untouched by settings churn.
    let base = h.service.get_project(&view.uid).await.unwrap();
    assert_eq!(base.etag, "1");
}

#[tokio::test]
async fn list_zips_settings_and_sorts_by_slug() {
    let h = harness();
    h.service
        .create_project(
            draft("zeta", "Zeta", &["Crowdfunding"]),
            SettingsDraft { mission_statement: "Last".to_string(), ..Default::default() },
        )
        .await
        .unwrap();
    h.service
        .create_project(draft("alpha", "Alpha", &["Crowdfunding"]), SettingsDraft::default())
        .await
        .unwrap();

    let views = h.service.list_projects().await.unwrap();
    assert_eq!(views.len(), 2);
    assert_eq!(views[0].slug, "alpha");
    assert_eq!(views[1].slug, "zeta");
    assert_eq!(views[1].mission_statement, "Last");
}
