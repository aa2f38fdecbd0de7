//! Shared tests for OrganizationRepo implementations.
//!
//! Tests are written as async functions that take `&dyn OrganizationRepo`,
//! keeping the test logic independent of the backing store.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::{error::DbError, repos::OrganizationRepo},
    models::{CreateOrganization, OrganizationStatus},
};

fn create_org_input(slug: &str, name: &str) -> CreateOrganization {
    CreateOrganization {
        owner_id: Uuid::new_v4(),
        slug: slug.to_string(),
        name: name.to_string(),
        plan: None,
    }
}

pub async fn test_create_organization(repo: &dyn OrganizationRepo) {
    let input = create_org_input("test-org", "Test Organization");
    let org = repo.create(input).await.expect("Failed to create org");

    assert_eq!(org.slug, "test-org");
    assert_eq!(org.name, "Test Organization");
    assert_eq!(org.plan, "free");
    assert_eq!(org.status, OrganizationStatus::Active);
    assert!(org.closed_at.is_none());
}

pub async fn test_create_duplicate_slug_fails(repo: &dyn OrganizationRepo) {
    repo.create(create_org_input("duplicate", "First Org"))
        .await
        .expect("Failed to create first org");

    let result = repo.create(create_org_input("duplicate", "Second Org")).await;

    assert!(matches!(result, Err(DbError::Conflict(_))));
}

pub async fn test_get_by_id(repo: &dyn OrganizationRepo) {
    let created = repo
        .create(create_org_input("get-test", "Get Test Org"))
        .await
        .expect("Failed to create org");

    let fetched = repo
        .get_by_id(created.id)
        .await
        .expect("Failed to get org")
        .expect("Org should exist");

    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.owner_id, created.owner_id);
    assert_eq!(fetched.slug, "get-test");
}

pub async fn test_get_by_id_not_found(repo: &dyn OrganizationRepo) {
    let result = repo
        .get_by_id(Uuid::new_v4())
        .await
        .expect("Query should succeed");

    assert!(result.is_none());
}

pub async fn test_get_by_slug(repo: &dyn OrganizationRepo) {
    let created = repo
        .create(create_org_input("slug-test", "Slug Test Org"))
        .await
        .expect("Failed to create org");

    let fetched = repo
        .get_by_slug("slug-test")
        .await
        .expect("Failed to get org")
        .expect("Org should exist");

    assert_eq!(fetched.id, created.id);
}

pub async fn test_begin_closing_transitions_active(repo: &dyn OrganizationRepo) {
    let org = repo
        .create(create_org_input("closing-test", "Closing Test"))
        .await
        .expect("Failed to create org");

    assert!(repo.begin_closing(org.id, Utc::now()).await.unwrap());

    let fetched = repo.get_by_id(org.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, OrganizationStatus::Closing);

    // A second attempt loses the conditional update.
    assert!(!repo.begin_closing(org.id, Utc::now()).await.unwrap());
}

pub async fn test_complete_closing_records_reason(repo: &dyn OrganizationRepo) {
    let org = repo
        .create(create_org_input("complete-test", "Complete Test"))
        .await
        .expect("Failed to create org");

    assert!(repo.begin_closing(org.id, Utc::now()).await.unwrap());
    let closed_at = Utc::now();
    assert!(
        repo.complete_closing(org.id, Some("moving on"), closed_at)
            .await
            .unwrap()
    );

    let fetched = repo.get_by_id(org.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, OrganizationStatus::Closed);
    assert_eq!(fetched.closure_reason.as_deref(), Some("moving on"));
    assert!(fetched.closed_at.is_some());

    // Already closed: the guarded transition is a no-op.
    assert!(
        !repo
            .complete_closing(org.id, None, Utc::now())
            .await
            .unwrap()
    );
}

pub async fn test_complete_closing_requires_closing_state(repo: &dyn OrganizationRepo) {
    let org = repo
        .create(create_org_input("guard-test", "Guard Test"))
        .await
        .expect("Failed to create org");

    // Still active: completing must fail.
    assert!(!repo.complete_closing(org.id, None, Utc::now()).await.unwrap());
}

pub async fn test_mark_deleted_requires_closed(repo: &dyn OrganizationRepo) {
    let org = repo
        .create(create_org_input("delete-test", "Delete Test"))
        .await
        .expect("Failed to create org");

    assert!(!repo.mark_deleted(org.id, Utc::now()).await.unwrap());

    repo.begin_closing(org.id, Utc::now()).await.unwrap();
    repo.complete_closing(org.id, None, Utc::now()).await.unwrap();

    assert!(repo.mark_deleted(org.id, Utc::now()).await.unwrap());
    let fetched = repo.get_by_id(org.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, OrganizationStatus::Deleted);
}

mod sqlite_tests {
    use crate::db::{sqlite::SqliteOrganizationRepo, tests::harness};

    async fn create_repo() -> SqliteOrganizationRepo {
        let pool = harness::create_sqlite_pool().await;
        harness::run_migrations(&pool).await;
        SqliteOrganizationRepo::new(pool)
    }

    macro_rules! sqlite_test {
        ($name:ident) => {
            #[tokio::test]
            async fn $name() {
                let repo = create_repo().await;
                super::$name(&repo).await;
            }
        };
    }

    sqlite_test!(test_create_organization);
    sqlite_test!(test_create_duplicate_slug_fails);
    sqlite_test!(test_get_by_id);
    sqlite_test!(test_get_by_id_not_found);
    sqlite_test!(test_get_by_slug);
    sqlite_test!(test_begin_closing_transitions_active);
    sqlite_test!(test_complete_closing_records_reason);
    sqlite_test!(test_complete_closing_requires_closing_state);
    sqlite_test!(test_mark_deleted_requires_closed);
}
