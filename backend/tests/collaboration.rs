//! Collaboration journeys: team invitations, recipes and personal projects.

mod support;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use campus::domain::rbac::roles;
use campus::test_support::{MultipartBody, TestBackend};
use rstest::{fixture, rstest};
use serde_json::json;

use support::{send_as, send_form};

#[fixture]
fn backend() -> TestBackend {
    TestBackend::new().expect("test backend")
}

#[rstest]
#[actix_web::test]
async fn an_accepted_invitation_adds_the_member(backend: TestBackend) {
    let owner = backend
        .bearer_for_username("9125550001", roles::USER, "leila")
        .await;
    let guest = backend
        .bearer_for_username("9125550002", roles::USER, "omid")
        .await;
    let (status, team) = send_as(
        &backend,
        &owner,
        TestRequest::post().uri("/api/v1/teams/create").set_json(json!({
            "name": "Night owls",
            "username": "NightOwls",
            "description": "Late study group"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{team}");
    let team_id = team["id"].as_str().expect("team id").to_owned();

    let (status, sent) = send_as(
        &backend,
        &owner,
        TestRequest::get().uri(&format!("/api/v1/teams/invite/{team_id}/omid")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent["message"], "Invitation sent");

    let (_, pending) = send_as(
        &backend,
        &guest,
        TestRequest::get().uri("/api/v1/user/requests/pending"),
    )
    .await;
    let requests = pending.as_array().expect("requests");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["teamName"], "Night owls");
    assert_eq!(requests[0]["inviter"]["username"], "leila");
    let request_id = requests[0]["id"].as_str().expect("request id").to_owned();

    let answer_uri = format!("/api/v1/user/requests/{request_id}/accepted");
    let (status, answered) =
        send_as(&backend, &guest, TestRequest::patch().uri(&answer_uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(answered["message"], "Request accepted");

    let (status, _) = send_as(&backend, &guest, TestRequest::patch().uri(&answer_uri)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, mine) = send_as(&backend, &guest, TestRequest::get().uri("/api/v1/teams/me")).await;
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
    assert_eq!(mine[0]["username"], "nightowls");

    let (status, _) = send_as(
        &backend,
        &owner,
        TestRequest::get().uri(&format!("/api/v1/teams/invite/{team_id}/omid")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[rstest]
#[actix_web::test]
async fn recipes_carry_their_chef(backend: TestBackend) {
    let chef = backend
        .bearer_for_username("9125550010", roles::USER, "nasrin")
        .await;
    let form = || {
        MultipartBody::new()
            .text("title", "Ash reshteh")
            .text("ingredients", "noodles,beans,herbs")
            .text("instructions", "soak,simmer,serve")
            .text("time", "2 h")
            .text("level", "medium")
            .file("image", "ash.jpg", "image/jpeg", b"jpg")
    };
    for _ in 0..2 {
        let (status, _) = send_form(
            &backend,
            &chef,
            TestRequest::post().uri("/api/v1/recipes/create"),
            form(),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, listed) =
        send_as(&backend, &chef, TestRequest::get().uri("/api/v1/recipes/list")).await;

    assert_eq!(status, StatusCode::OK);
    let recipes = listed.as_array().expect("recipes");
    assert_eq!(recipes.len(), 2);
    assert!(recipes.iter().all(|recipe| recipe["chef"]["username"] == "nasrin"));
    assert!(recipes.iter().all(|recipe| recipe["chefRecipes"] == 2));
}

#[rstest]
#[actix_web::test]
async fn projects_are_private_to_their_owner(backend: TestBackend) {
    let owner = backend
        .bearer_for_username("9125550020", roles::USER, "kian")
        .await;
    let admin = backend.bearer_for("9125550021", roles::ADMIN).await;
    let (status, project) = send_form(
        &backend,
        &owner,
        TestRequest::post().uri("/api/v1/projects/create"),
        MultipartBody::new()
            .text("title", "Chores")
            .text("text", "A tracker for shared household chores")
            .file("image", "shot.png", "image/png", b"png"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/v1/projects/edit/{}", project["id"].as_str().expect("id"));

    let (status, _) = send_as(
        &backend,
        &admin,
        TestRequest::patch()
            .uri(&uri)
            .set_json(json!({ "title": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, edited) = send_as(
        &backend,
        &owner,
        TestRequest::patch()
            .uri(&uri)
            .set_json(json!({ "title": "Chore wheel", "tags": ["home"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["title"], "Chore wheel");
    assert_eq!(edited["tags"], json!(["home"]));
}
