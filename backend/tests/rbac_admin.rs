//! Administrators shape roles and permissions; the checks follow.

mod support;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use campus::domain::rbac::roles;
use campus::test_support::TestBackend;
use rstest::rstest;
use serde_json::json;

use support::send_as;

#[rstest]
#[actix_web::test]
async fn custom_roles_reference_existing_permissions() {
    let backend = TestBackend::new().expect("test backend");
    let admin = backend.bearer_for("9125000001", roles::ADMIN).await;

    let (status, permission) = send_as(
        &backend,
        &admin,
        TestRequest::post()
            .uri("/api/v1/admin/permissions/add")
            .set_json(json!({ "title": "reports", "description": "Read reports" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, role) = send_as(
        &backend,
        &admin,
        TestRequest::post().uri("/api/v1/admin/roles/add").set_json(json!({
            "title": "ANALYST",
            "permissions": ["reports", "profile"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "add role: {role}");
    assert_eq!(role["permissions"], json!(["reports", "profile"]));

    let (status, listed) = send_as(
        &backend,
        &admin,
        TestRequest::get().uri("/api/v1/admin/permissions/list"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        listed
            .as_array()
            .expect("array")
            .iter()
            .any(|entry| entry["id"] == permission["id"])
    );
}

#[rstest]
#[actix_web::test]
async fn analysts_keep_profile_access_only() {
    let backend = TestBackend::new().expect("test backend");
    let admin = backend.bearer_for("9125000002", roles::ADMIN).await;
    let (status, _) = send_as(
        &backend,
        &admin,
        TestRequest::post()
            .uri("/api/v1/admin/roles/add")
            .set_json(json!({ "title": "ANALYST", "permissions": ["profile"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let analyst = backend.bearer_for("9125000003", "ANALYST").await;

    let (status, _) = send_as(
        &backend,
        &analyst,
        TestRequest::get().uri("/api/v1/admin/users/profile"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_as(
        &backend,
        &analyst,
        TestRequest::get().uri("/api/v1/admin/blogs"),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn admins_pass_every_check() {
    let backend = TestBackend::new().expect("test backend");
    let admin = backend.bearer_for("9125000004", roles::ADMIN).await;

    for uri in [
        "/api/v1/admin/blogs",
        "/api/v1/admin/products/list",
        "/api/v1/admin/courses/list",
        "/api/v1/admin/category/all",
        "/api/v1/admin/users/list",
    ] {
        let (status, body) = send_as(&backend, &admin, TestRequest::get().uri(uri)).await;
        assert_eq!(status, StatusCode::OK, "{uri}: {body}");
    }
}

#[rstest]
#[actix_web::test]
async fn malformed_bearer_tokens_are_unauthorised() {
    let backend = TestBackend::new().expect("test backend");

    let (status, error) = send_as(
        &backend,
        "Bearer not.a.jwt",
        TestRequest::get().uri("/api/v1/admin/users/profile"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error["code"], "unauthorized");
    assert!(error["traceId"].is_string());
}

#[rstest]
#[actix_web::test]
async fn renames_carry_over_to_users_and_roles() {
    let backend = TestBackend::new().expect("test backend");
    let admin = backend.bearer_for("9125000005", roles::ADMIN).await;
    let (status, permission) = send_as(
        &backend,
        &admin,
        TestRequest::post()
            .uri("/api/v1/admin/permissions/add")
            .set_json(json!({ "title": "reports" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, role) = send_as(
        &backend,
        &admin,
        TestRequest::post()
            .uri("/api/v1/admin/roles/add")
            .set_json(json!({ "title": "ANALYST", "permissions": ["reports", "profile"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let analyst = backend.bearer_for("9125000006", "ANALYST").await;

    let (status, _) = send_as(
        &backend,
        &admin,
        TestRequest::patch()
            .uri(&format!("/api/v1/admin/roles/edit/{}", role["id"].as_str().expect("id")))
            .set_json(json!({ "title": "AUDITOR" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send_as(
        &backend,
        &admin,
        TestRequest::patch()
            .uri(&format!(
                "/api/v1/admin/permissions/edit/{}",
                permission["id"].as_str().expect("id")
            ))
            .set_json(json!({ "title": "audits" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, profile) = send_as(
        &backend,
        &analyst,
        TestRequest::get().uri("/api/v1/admin/users/profile"),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "renamed role still works: {profile}");
    assert_eq!(profile["role"], "AUDITOR");

    let (_, listed) = send_as(
        &backend,
        &admin,
        TestRequest::get().uri("/api/v1/admin/roles/list"),
    )
    .await;
    let auditor = listed
        .as_array()
        .expect("array")
        .iter()
        .find(|entry| entry["title"] == "AUDITOR")
        .expect("renamed role listed");
    assert_eq!(auditor["permissions"], json!(["audits", "profile"]));
}
