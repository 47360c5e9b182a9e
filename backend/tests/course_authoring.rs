//! A teacher builds a course from chapters and episodes.

mod support;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use campus::domain::rbac::roles;
use campus::test_support::{MultipartBody, TestBackend};
use rstest::rstest;
use serde_json::{Value, json};

use support::{send_as, send_form};

async fn course_with_chapter(backend: &TestBackend, bearer: &str) -> (String, String) {
    let course = backend.seed_course().await.to_string();
    let (status, chapter) = send_as(
        backend,
        bearer,
        TestRequest::put()
            .uri("/api/v1/admin/chapters/add")
            .set_json(json!({ "courseId": course, "title": "Getting started" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "add chapter: {chapter}");
    (course, chapter["id"].as_str().expect("chapter id").to_owned())
}

fn episode_form(course: &str, chapter: &str, title: &str) -> MultipartBody {
    MultipartBody::new()
        .text("courseId", course)
        .text("chapterId", chapter)
        .text("title", title)
        .text("text", "Walkthrough")
        .text("type", "lock")
        .file("video", "lesson.mkv", "video/x-matroska", b"mkv")
}

async fn course(backend: &TestBackend, bearer: &str, id: &str) -> Value {
    let (status, course) = send_as(
        backend,
        bearer,
        TestRequest::get().uri(&format!("/api/v1/admin/courses/{id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    course
}

#[rstest]
#[actix_web::test]
async fn episodes_accumulate_into_the_course_total() {
    let backend = TestBackend::new().expect("test backend");
    let bearer = backend.bearer_for("9124000001", roles::TEACHER).await;
    let (course_id, chapter_id) = course_with_chapter(&backend, &bearer).await;

    for title in ["Installing", "Hello world"] {
        let (status, episode) = send_form(
            &backend,
            &bearer,
            TestRequest::post().uri("/api/v1/admin/episodes/add"),
            episode_form(&course_id, &chapter_id, title),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "add episode: {episode}");
    }

    let course = course(&backend, &bearer, &course_id).await;
    assert_eq!(course["totalTime"], "00:03:10");
    assert_eq!(course["chapters"][0]["episodes"].as_array().map(Vec::len), Some(2));
}

#[rstest]
#[actix_web::test]
async fn removing_a_chapter_drops_its_episodes_and_time() {
    let backend = TestBackend::new().expect("test backend");
    let bearer = backend.bearer_for("9124000002", roles::TEACHER).await;
    let (course_id, chapter_id) = course_with_chapter(&backend, &bearer).await;
    let (_, episode) = send_form(
        &backend,
        &bearer,
        TestRequest::post().uri("/api/v1/admin/episodes/add"),
        episode_form(&course_id, &chapter_id, "Installing"),
    )
    .await;
    let video = episode["videoAddress"].as_str().expect("video").to_owned();
    assert!(backend.upload_root().join(&video).exists());

    let (status, _) = send_as(
        &backend,
        &bearer,
        TestRequest::patch().uri(&format!("/api/v1/admin/chapters/remove/{chapter_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let course = course(&backend, &bearer, &course_id).await;
    assert_eq!(course["totalTime"], "00:00:00");
    assert_eq!(course["chapters"].as_array().map(Vec::len), Some(0));
    assert!(!backend.upload_root().join(&video).exists());
}

#[rstest]
#[case("free", "25", StatusCode::BAD_REQUEST)]
#[case("free", "0", StatusCode::OK)]
#[case("special", "25", StatusCode::OK)]
#[actix_web::test]
async fn pricing_rules_apply_on_edit(
    #[case] kind: &str,
    #[case] price: &str,
    #[case] expected: StatusCode,
) {
    let backend = TestBackend::new().expect("test backend");
    let bearer = backend.bearer_for("9124000003", roles::TEACHER).await;
    let course_id = backend.seed_course().await;

    let (status, body) = send_form(
        &backend,
        &bearer,
        TestRequest::patch().uri(&format!("/api/v1/admin/courses/edit/{course_id}")),
        MultipartBody::new().text("type", kind).text("price", price),
    )
    .await;

    assert_eq!(status, expected, "edit course: {body}");
}

#[rstest]
#[actix_web::test]
async fn writers_cannot_author_courses() {
    let backend = TestBackend::new().expect("test backend");
    let bearer = backend.bearer_for("9124000004", roles::WRITER).await;
    let course_id = backend.seed_course().await;

    let (status, _) = send_as(
        &backend,
        &bearer,
        TestRequest::put()
            .uri("/api/v1/admin/chapters/add")
            .set_json(json!({ "courseId": course_id, "title": "Sneaky" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}
