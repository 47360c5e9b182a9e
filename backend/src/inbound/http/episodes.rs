//! Episode endpoints. Each episode carries one uploaded `video` whose
//! duration is probed when it is stored.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::rbac::permissions;
use crate::domain::upload::MediaClass;
use crate::domain::{EpisodeChanges, EpisodeDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::dto::{EpisodeDto, MessageDto};
use crate::inbound::http::multipart::{FilePart, UploadForm};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_uuid, require_uuid,
};

/// The episode video.
const VIDEO_PART: FilePart = FilePart::single("video", MediaClass::Video);

/// Documented shape of the episode upload form.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeForm {
    /// Required when adding.
    pub course_id: Option<String>,
    /// Required when adding.
    pub chapter_id: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
    /// `lock` or `unlock`.
    #[schema(example = "unlock")]
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub video: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/episodes/add",
    request_body(content = EpisodeForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Episode created", body = EpisodeDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Course or chapter not found", body = ErrorSchema),
        (status = 503, description = "Video could not be probed", body = ErrorSchema)
    ),
    tags = ["admin-episodes"],
    operation_id = "addEpisode"
)]
#[post("/admin/episodes/add")]
pub async fn add_episode(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    caller.require(&state, permissions::COURSE).await?;
    let mut form = UploadForm::read(payload, &state.upload_scratch, &[VIDEO_PART]).await?;
    let course_id = require_uuid(form.text("courseId"), FieldName::new("courseId"))?;
    let chapter_id = require_uuid(form.text("chapterId"), FieldName::new("chapterId"))?;
    let draft = EpisodeDraft::try_from_parts(
        &form.text("title").unwrap_or_default(),
        &form.text("text").unwrap_or_default(),
        &form.text("type").unwrap_or_default(),
    )?;
    let video = form
        .take_file("video")
        .ok_or_else(|| missing_field_error(FieldName::new("video")))?;
    let episode = state
        .courses
        .add_episode(course_id, chapter_id, draft, video)
        .await?;
    Ok(HttpResponse::Created().json(EpisodeDto::new(episode, &state.public_base_url)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/episodes/remove/{id}",
    params(("id" = String, Path, description = "Episode id")),
    responses(
        (status = 200, description = "Episode removed", body = MessageDto),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Episode not found", body = ErrorSchema)
    ),
    tags = ["admin-episodes"],
    operation_id = "removeEpisode"
)]
#[delete("/admin/episodes/remove/{id}")]
pub async fn remove_episode(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageDto>> {
    caller.require(&state, permissions::COURSE).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    state.courses.remove_episode(id).await?;
    Ok(web::Json(MessageDto::new("Episode removed")))
}

/// Sparse update; a new `video` is stored and probed again.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/episodes/edit/{id}",
    params(("id" = String, Path, description = "Episode id")),
    request_body(content = EpisodeForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Episode updated", body = EpisodeDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Episode not found", body = ErrorSchema),
        (status = 503, description = "Video could not be probed", body = ErrorSchema)
    ),
    tags = ["admin-episodes"],
    operation_id = "editEpisode"
)]
#[patch("/admin/episodes/edit/{id}")]
pub async fn edit_episode(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: Multipart,
) -> ApiResult<web::Json<EpisodeDto>> {
    caller.require(&state, permissions::COURSE).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let mut form = UploadForm::read(payload, &state.upload_scratch, &[VIDEO_PART]).await?;
    let changes =
        EpisodeChanges::try_from_parts(form.text("title"), form.text("text"), form.text("type"))?;
    let episode = state
        .courses
        .edit_episode(id, changes, form.take_file("video"))
        .await?;
    Ok(web::Json(EpisodeDto::new(episode, &state.public_base_url)))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
    use actix_web::test::TestRequest;
    use rstest::rstest;
    use serde_json::Value;
    use uuid::Uuid;

    use crate::domain::ChapterDraft;
    use crate::domain::rbac::roles;
    use crate::inbound::http::test_utils::send;
    use crate::test_support::{MultipartBody, TestBackend};

    struct Fixture {
        backend: TestBackend,
        bearer: String,
        course: Uuid,
        chapter: Uuid,
    }

    async fn fixture() -> Fixture {
        let backend = TestBackend::new().expect("backend");
        let bearer = backend.bearer_for("9120000060", roles::TEACHER).await;
        let course = backend.seed_course().await;
        let chapter = backend
            .data()
            .courses
            .add_chapter(
                course,
                ChapterDraft::try_from_parts("Basics", "").expect("draft"),
            )
            .await
            .expect("chapter")
            .id;
        Fixture {
            backend,
            bearer,
            course,
            chapter,
        }
    }

    async fn submit(fx: &Fixture, req: TestRequest, form: MultipartBody) -> (StatusCode, Value) {
        let (content_type, body) = form.finish();
        send(
            &fx.backend,
            req.insert_header((AUTHORIZATION, fx.bearer.as_str()))
                .insert_header((CONTENT_TYPE, content_type))
                .set_payload(body),
        )
        .await
    }

    fn episode_form(fx: &Fixture) -> MultipartBody {
        MultipartBody::new()
            .text("courseId", &fx.course.to_string())
            .text("chapterId", &fx.chapter.to_string())
            .text("title", "Hello cargo")
            .text("text", "First build")
            .text("type", "unlock")
            .file("video", "intro.mp4", "video/mp4", b"mp4")
    }

    #[rstest]
    #[actix_web::test]
    async fn add_probes_the_video_and_updates_course_time() {
        let fx = fixture().await;

        let (status, episode) = submit(
            &fx,
            TestRequest::post().uri("/api/v1/admin/episodes/add"),
            episode_form(&fx),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(episode["time"], "00:01:35");
        assert_eq!(episode["type"], "unlock");
        let address = episode["videoAddress"].as_str().expect("address");
        assert!(address.starts_with("uploads/episodes/"));
        assert!(fx.backend.upload_root().join(address).exists());

        let (_, course) = send(
            &fx.backend,
            TestRequest::get()
                .uri(&format!("/api/v1/admin/courses/{}", fx.course))
                .insert_header((AUTHORIZATION, fx.bearer.as_str())),
        )
        .await;
        assert_eq!(course["totalTime"], "00:01:35");
    }

    #[rstest]
    #[actix_web::test]
    async fn add_to_an_unknown_chapter_is_not_found() {
        let fx = fixture().await;
        let form = MultipartBody::new()
            .text("courseId", &fx.course.to_string())
            .text("chapterId", &Uuid::new_v4().to_string())
            .text("title", "Hello cargo")
            .text("text", "First build")
            .text("type", "lock")
            .file("video", "intro.mp4", "video/mp4", b"mp4");

        let (status, error) = submit(
            &fx,
            TestRequest::post().uri("/api/v1/admin/episodes/add"),
            form,
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error["message"], "Chapter not found");
    }

    #[rstest]
    #[actix_web::test]
    async fn edit_without_video_keeps_time_and_address() {
        let fx = fixture().await;
        let (_, episode) = submit(
            &fx,
            TestRequest::post().uri("/api/v1/admin/episodes/add"),
            episode_form(&fx),
        )
        .await;
        let id = episode["id"].as_str().expect("id");

        let (status, edited) = submit(
            &fx,
            TestRequest::patch().uri(&format!("/api/v1/admin/episodes/edit/{id}")),
            MultipartBody::new().text("type", "lock").text("title", ""),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(edited["type"], "lock");
        assert_eq!(edited["title"], "Hello cargo");
        assert_eq!(edited["time"], episode["time"]);
        assert_eq!(edited["videoAddress"], episode["videoAddress"]);
    }

    #[rstest]
    #[actix_web::test]
    async fn remove_deletes_the_video() {
        let fx = fixture().await;
        let (_, episode) = submit(
            &fx,
            TestRequest::post().uri("/api/v1/admin/episodes/add"),
            episode_form(&fx),
        )
        .await;
        let id = episode["id"].as_str().expect("id");
        let address = episode["videoAddress"].as_str().expect("address").to_owned();

        let (status, _) = send(
            &fx.backend,
            TestRequest::delete()
                .uri(&format!("/api/v1/admin/episodes/remove/{id}"))
                .insert_header((AUTHORIZATION, fx.bearer.as_str())),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(!fx.backend.upload_root().join(address).exists());
    }
}
