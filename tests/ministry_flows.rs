//! Database-backed flows. Skipped when `DATABASE_URL` is unset.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use shepherd::error::conflict_on_unique;
use shepherd::models::{
    ministry::AdminRole, ministry_request::RequestStatus, Member, MinistryAdmin, MinistryMember,
    MinistryRequest,
};

#[tokio::test]
async fn test_approval_joins_member_and_sets_current_ministry() {
    let Some(pool) = common::test_pool().await else { return };

    let ministry = common::ministry(&pool, "Choir").await;
    let member = common::member(&pool, "Ana").await;
    let reviewer = common::member(&pool, "Rev").await;

    let request = MinistryRequest::create(&pool, ministry.id, member.id, reviewer.id)
        .await
        .unwrap();

    let approved = MinistryRequest::approve(&pool, request.id, reviewer.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(approved.status, RequestStatus::Approved.as_str());
    assert_eq!(approved.reviewed_by, Some(reviewer.id));
    assert!(MinistryMember::exists(&pool, ministry.id, member.id).await.unwrap());

    let member = Member::find_by_id(&pool, member.id).await.unwrap().unwrap();
    assert_eq!(member.current_ministry_id, Some(ministry.id));

    // Already reviewed
    assert!(MinistryRequest::approve(&pool, request.id, reviewer.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_uncommitted_approval_leaves_request_reviewable() {
    let Some(pool) = common::test_pool().await else { return };

    let ministry = common::ministry(&pool, "Youth").await;
    let member = common::member(&pool, "Ben").await;
    let reviewer = common::member(&pool, "Rev").await;

    let request = MinistryRequest::create(&pool, ministry.id, member.id, reviewer.id)
        .await
        .unwrap();

    {
        let mut tx = pool.begin().await.unwrap();
        MinistryRequest::review(&mut *tx, request.id, RequestStatus::Approved, reviewer.id)
            .await
            .unwrap()
            .unwrap();
        MinistryMember::add(&mut *tx, ministry.id, member.id).await.unwrap();
        // Dropped without commit, as when a later write fails
    }

    let stored = MinistryRequest::find_by_id(&pool, request.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_pending());
    assert!(!MinistryMember::exists(&pool, ministry.id, member.id).await.unwrap());

    assert!(MinistryRequest::approve(&pool, request.id, reviewer.id)
        .await
        .unwrap()
        .is_some());
    assert!(MinistryMember::exists(&pool, ministry.id, member.id).await.unwrap());
}

#[tokio::test]
async fn test_change_role_only_touches_existing_admins() {
    let Some(pool) = common::test_pool().await else { return };

    let ministry = common::ministry(&pool, "Ushers").await;
    let admin = common::member(&pool, "Cleo").await;
    let outsider = common::member(&pool, "Dan").await;

    MinistryAdmin::upsert(&pool, ministry.id, admin.id, AdminRole::Member)
        .await
        .unwrap();

    let changed = MinistryAdmin::change_role(&pool, ministry.id, admin.id, AdminRole::Leader)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(changed.role, "LEADER");

    assert!(MinistryAdmin::change_role(&pool, ministry.id, outsider.id, AdminRole::Leader)
        .await
        .unwrap()
        .is_none());
    assert!(MinistryAdmin::find(&pool, ministry.id, outsider.id)
        .await
        .unwrap()
        .is_none());
    assert!(!MinistryAdmin::exists_for_member(&pool, outsider.id).await.unwrap());
}

#[tokio::test]
async fn test_removal_clears_matching_current_ministry() {
    let Some(pool) = common::test_pool().await else { return };

    let choir = common::ministry(&pool, "Choir").await;
    let media = common::ministry(&pool, "Media").await;
    let member = common::member(&pool, "Eva").await;

    MinistryMember::add(&pool, choir.id, member.id).await.unwrap();
    MinistryMember::add(&pool, media.id, member.id).await.unwrap();
    Member::set_current_ministry(&pool, member.id, Some(choir.id))
        .await
        .unwrap();

    assert!(MinistryMember::remove(&pool, media.id, member.id).await.unwrap());
    let current = Member::find_by_id(&pool, member.id).await.unwrap().unwrap();
    assert_eq!(current.current_ministry_id, Some(choir.id));

    assert!(MinistryMember::remove(&pool, choir.id, member.id).await.unwrap());
    let current = Member::find_by_id(&pool, member.id).await.unwrap().unwrap();
    assert_eq!(current.current_ministry_id, None);

    assert!(!MinistryMember::remove(&pool, choir.id, member.id).await.unwrap());
}

#[tokio::test]
async fn test_one_pending_request_per_member_and_ministry() {
    let Some(pool) = common::test_pool().await else { return };

    let ministry = common::ministry(&pool, "Hospitality").await;
    let member = common::member(&pool, "Fay").await;
    let leader = common::member(&pool, "Gus").await;

    let first = MinistryRequest::create(&pool, ministry.id, member.id, leader.id)
        .await
        .unwrap();

    let duplicate = MinistryRequest::create(&pool, ministry.id, member.id, leader.id)
        .await
        .unwrap_err();
    assert_eq!(
        conflict_on_unique(duplicate, "pending").status(),
        StatusCode::CONFLICT
    );

    MinistryRequest::review(&pool, first.id, RequestStatus::Rejected, leader.id)
        .await
        .unwrap()
        .unwrap();

    // A reviewed request no longer blocks a new one
    assert!(MinistryRequest::create(&pool, ministry.id, member.id, leader.id)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_signed_in_member_without_roles_is_forbidden_from_admin_api() {
    let Some(pool) = common::test_pool().await else { return };

    let plain = common::member_with_login(&pool, "Hana", &[]).await;
    let pastor = common::member_with_login(&pool, "Ivo", &["PASTOR"]).await;
    let app = common::app(pool);

    let cookie = common::sign_in(&app, &plain).await;
    for uri in ["/api/users", "/api/zones", "/api/stats/admin"] {
        assert_eq!(
            common::send(&app, &cookie, Method::GET, uri, None).await,
            StatusCode::FORBIDDEN,
            "{uri}"
        );
    }
    assert_eq!(
        common::send(&app, &cookie, Method::GET, "/api/portal/me", None).await,
        StatusCode::OK
    );

    let cookie = common::sign_in(&app, &pastor).await;
    assert_eq!(
        common::send(&app, &cookie, Method::GET, "/api/roles", None).await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_portal_outsider_gets_forbidden_for_missing_ministry() {
    let Some(pool) = common::test_pool().await else { return };

    let ministry = common::ministry(&pool, "Prayer").await;
    let outsider = common::member_with_login(&pool, "Jo", &[]).await;
    let app = common::app(pool);

    let cookie = common::sign_in(&app, &outsider).await;

    let existing = format!("/api/portal/ministries/{}", ministry.id);
    let missing = format!("/api/portal/ministries/{}", uuid::Uuid::new_v4());

    assert_eq!(
        common::send(&app, &cookie, Method::GET, &existing, None).await,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        common::send(&app, &cookie, Method::GET, &missing, None).await,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_portal_role_change_cannot_grant_admin() {
    let Some(pool) = common::test_pool().await else { return };

    let ministry = common::ministry(&pool, "Kids").await;
    let admin = common::member_with_login(&pool, "Kim", &[]).await;
    let colleague = common::member(&pool, "Lou").await;
    let outsider = common::member(&pool, "Max").await;

    MinistryAdmin::upsert(&pool, ministry.id, admin.id, AdminRole::Member)
        .await
        .unwrap();
    MinistryAdmin::upsert(&pool, ministry.id, colleague.id, AdminRole::Member)
        .await
        .unwrap();

    let app = common::app(pool.clone());
    let cookie = common::sign_in(&app, &admin).await;

    let outsider_uri = format!(
        "/api/portal/ministries/{}/members/{}/role",
        ministry.id, outsider.id
    );
    assert_eq!(
        common::send(&app, &cookie, Method::PUT, &outsider_uri, Some(json!({"role": "LEADER"})))
            .await,
        StatusCode::NOT_FOUND
    );
    assert!(!MinistryAdmin::exists_for_member(&pool, outsider.id).await.unwrap());

    let colleague_uri = format!(
        "/api/portal/ministries/{}/members/{}/role",
        ministry.id, colleague.id
    );
    assert_eq!(
        common::send(&app, &cookie, Method::PUT, &colleague_uri, Some(json!({"role": "LEADER"})))
            .await,
        StatusCode::OK
    );

    let colleague_admin = MinistryAdmin::find(&pool, ministry.id, colleague.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(colleague_admin.role, "LEADER");
}
