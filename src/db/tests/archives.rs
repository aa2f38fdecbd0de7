//! Shared tests for ArchiveRepo implementations.

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::{
    db::{
        error::DbError,
        repos::{ArchiveRepo, OrganizationRepo},
    },
    models::{ArchiveStatus, CreateOrganization, NewArchivedDocument},
};

async fn seed_org(orgs: &dyn OrganizationRepo, slug: &str) -> (Uuid, Uuid) {
    let org = orgs
        .create(CreateOrganization {
            owner_id: Uuid::new_v4(),
            slug: slug.to_string(),
            name: format!("Org {}", slug),
            plan: None,
        })
        .await
        .expect("Failed to create org");
    (org.id, org.owner_id)
}

pub async fn test_create_archive(repo: &dyn ArchiveRepo, orgs: &dyn OrganizationRepo) {
    let (org_id, owner_id) = seed_org(orgs, "archive-create").await;
    let expires_at = Utc::now() + Duration::days(30);

    let archive = repo
        .create(org_id, owner_id, expires_at)
        .await
        .expect("Failed to create archive");

    assert_eq!(archive.organization_id, org_id);
    assert_eq!(archive.owner_id, owner_id);
    assert_eq!(archive.status, ArchiveStatus::Active);
    assert!(archive.notified_at.is_none());

    let fetched = repo
        .get_active_for_org(org_id)
        .await
        .unwrap()
        .expect("Active archive should exist");
    assert_eq!(fetched.id, archive.id);
}

pub async fn test_second_active_archive_conflicts(
    repo: &dyn ArchiveRepo,
    orgs: &dyn OrganizationRepo,
) {
    let (org_id, owner_id) = seed_org(orgs, "archive-conflict").await;
    let expires_at = Utc::now() + Duration::days(30);

    repo.create(org_id, owner_id, expires_at).await.unwrap();
    let result = repo.create(org_id, owner_id, expires_at).await;

    assert!(matches!(result, Err(DbError::Conflict(_))));
}

pub async fn test_list_expiring_respects_window(
    repo: &dyn ArchiveRepo,
    orgs: &dyn OrganizationRepo,
) {
    let now = Utc::now();

    let (soon_org, soon_owner) = seed_org(orgs, "expiring-soon").await;
    let soon = repo
        .create(soon_org, soon_owner, now + Duration::days(3))
        .await
        .unwrap();

    let (later_org, later_owner) = seed_org(orgs, "expiring-later").await;
    repo.create(later_org, later_owner, now + Duration::days(30))
        .await
        .unwrap();

    let expiring = repo
        .list_expiring(now, now + Duration::days(7), 100)
        .await
        .unwrap();

    assert_eq!(expiring.len(), 1);
    assert_eq!(expiring[0].id, soon.id);
}

pub async fn test_list_due_includes_claimed(repo: &dyn ArchiveRepo, orgs: &dyn OrganizationRepo) {
    let now = Utc::now();

    let (due_org, due_owner) = seed_org(orgs, "due-org").await;
    let due = repo
        .create(due_org, due_owner, now - Duration::days(1))
        .await
        .unwrap();

    let (live_org, live_owner) = seed_org(orgs, "live-org").await;
    repo.create(live_org, live_owner, now + Duration::days(1))
        .await
        .unwrap();

    let due_list = repo.list_due(now, 100).await.unwrap();
    assert_eq!(due_list.len(), 1);
    assert_eq!(due_list[0].id, due.id);

    // A claimed (expired) archive from an interrupted purge stays due.
    assert!(repo.claim_for_purge(due.id).await.unwrap());
    let due_list = repo.list_due(now, 100).await.unwrap();
    assert_eq!(due_list.len(), 1);
    assert_eq!(due_list[0].status, ArchiveStatus::Expired);
}

pub async fn test_claim_notification_once_per_day(
    repo: &dyn ArchiveRepo,
    orgs: &dyn OrganizationRepo,
) {
    let now = Utc::now();
    let day_start = now - Duration::hours(2);

    let (org_id, owner_id) = seed_org(orgs, "notify-org").await;
    let archive = repo
        .create(org_id, owner_id, now + Duration::days(5))
        .await
        .unwrap();

    assert!(repo.claim_notification(archive.id, now, day_start).await.unwrap());
    // Same period: already notified.
    assert!(!repo.claim_notification(archive.id, now, day_start).await.unwrap());
    // Next period: claimable again.
    let tomorrow = now + Duration::days(1);
    assert!(
        repo.claim_notification(archive.id, tomorrow, now + Duration::hours(1))
            .await
            .unwrap()
    );
}

pub async fn test_purge_claim_and_mark_deleted(
    repo: &dyn ArchiveRepo,
    orgs: &dyn OrganizationRepo,
) {
    let (org_id, owner_id) = seed_org(orgs, "purge-org").await;
    let archive = repo
        .create(org_id, owner_id, Utc::now() - Duration::days(1))
        .await
        .unwrap();

    // mark_deleted requires a prior claim.
    assert!(!repo.mark_deleted(archive.id).await.unwrap());

    assert!(repo.claim_for_purge(archive.id).await.unwrap());
    // Second claim (overlapping reaper) is a no-op.
    assert!(!repo.claim_for_purge(archive.id).await.unwrap());

    assert!(repo.mark_deleted(archive.id).await.unwrap());
    assert!(!repo.mark_deleted(archive.id).await.unwrap());

    let fetched = repo.get_by_id(archive.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, ArchiveStatus::Deleted);
    assert!(repo.get_active_for_org(org_id).await.unwrap().is_none());
}

pub async fn test_documents_round_trip(repo: &dyn ArchiveRepo, orgs: &dyn OrganizationRepo) {
    let (org_id, owner_id) = seed_org(orgs, "docs-org").await;
    let archive = repo
        .create(org_id, owner_id, Utc::now() + Duration::days(30))
        .await
        .unwrap();

    repo.add_document(NewArchivedDocument {
        archive_id: archive.id,
        source_module_id: "projects".to_string(),
        payload: json!({"projects": [{"name": "Website relaunch"}]}),
    })
    .await
    .unwrap();
    repo.add_document(NewArchivedDocument {
        archive_id: archive.id,
        source_module_id: "files".to_string(),
        payload: json!({"file_count": 3}),
    })
    .await
    .unwrap();

    let docs = repo.list_documents(archive.id).await.unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].source_module_id, "projects");
    assert_eq!(docs[0].payload["projects"][0]["name"], "Website relaunch");

    let deleted = repo.delete_documents(archive.id).await.unwrap();
    assert_eq!(deleted, 2);
    assert!(repo.list_documents(archive.id).await.unwrap().is_empty());
}

mod sqlite_tests {
    use crate::db::{
        sqlite::{SqliteArchiveRepo, SqliteOrganizationRepo},
        tests::harness,
    };

    async fn create_repos() -> (SqliteArchiveRepo, SqliteOrganizationRepo) {
        let pool = harness::create_sqlite_pool().await;
        harness::run_migrations(&pool).await;
        (
            SqliteArchiveRepo::new(pool.clone()),
            SqliteOrganizationRepo::new(pool),
        )
    }

    macro_rules! sqlite_test {
        ($name:ident) => {
            #[tokio::test]
            async fn $name() {
                let (archives, orgs) = create_repos().await;
                super::$name(&archives, &orgs).await;
            }
        };
    }

    sqlite_test!(test_create_archive);
    sqlite_test!(test_second_active_archive_conflicts);
    sqlite_test!(test_list_expiring_respects_window);
    sqlite_test!(test_list_due_includes_claimed);
    sqlite_test!(test_claim_notification_once_per_day);
    sqlite_test!(test_purge_claim_and_mark_deleted);
    sqlite_test!(test_documents_round_trip);
}
