//! Chapter endpoints. Chapters live inside their course document, so
//! removal and updates address the chapter id alone.

use actix_web::{HttpResponse, get, patch, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::rbac::permissions;
use crate::domain::{ChapterChanges, ChapterDraft, CourseChapters};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::dto::{ChapterDto, MessageDto};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid, require_uuid};

/// Request body for `PUT /api/v1/admin/chapters/add`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddChapterRequest {
    pub course_id: Option<String>,
    #[schema(example = "Ownership")]
    pub title: String,
    #[serde(default)]
    pub text: String,
}

/// Request body for `PATCH /api/v1/admin/chapters/update/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChapterRequest {
    pub title: Option<String>,
    pub text: Option<String>,
}

/// A course title with its chapters.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseChaptersDto {
    pub course_id: Uuid,
    pub title: String,
    pub chapters: Vec<ChapterDto>,
}

impl CourseChaptersDto {
    fn new(listing: CourseChapters, base_url: &str) -> Self {
        Self {
            course_id: listing.course_id,
            title: listing.title,
            chapters: listing
                .chapters
                .into_iter()
                .map(|chapter| ChapterDto::new(chapter, base_url))
                .collect(),
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/chapters/add",
    request_body = AddChapterRequest,
    responses(
        (status = 201, description = "Chapter appended", body = ChapterDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema)
    ),
    tags = ["admin-chapters"],
    operation_id = "addChapter"
)]
#[put("/admin/chapters/add")]
pub async fn add_chapter(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<AddChapterRequest>,
) -> ApiResult<HttpResponse> {
    caller.require(&state, permissions::COURSE).await?;
    let AddChapterRequest {
        course_id,
        title,
        text,
    } = payload.into_inner();
    let course_id = require_uuid(course_id, FieldName::new("courseId"))?;
    let draft = ChapterDraft::try_from_parts(&title, &text)?;
    let chapter = state.courses.add_chapter(course_id, draft).await?;
    Ok(HttpResponse::Created().json(ChapterDto::new(chapter, &state.public_base_url)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/chapters/list/{id}",
    params(("id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Chapters of the course", body = CourseChaptersDto),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema)
    ),
    tags = ["admin-chapters"],
    operation_id = "listChapters"
)]
#[get("/admin/chapters/list/{id}")]
pub async fn list_chapters(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<CourseChaptersDto>> {
    caller.require(&state, permissions::COURSE).await?;
    let course_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let listing = state.courses.chapters(course_id).await?;
    Ok(web::Json(CourseChaptersDto::new(
        listing,
        &state.public_base_url,
    )))
}

/// Remove a chapter and the videos of its episodes.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/chapters/remove/{id}",
    params(("id" = String, Path, description = "Chapter id")),
    responses(
        (status = 200, description = "Chapter removed", body = MessageDto),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Chapter not found", body = ErrorSchema)
    ),
    tags = ["admin-chapters"],
    operation_id = "removeChapter"
)]
#[patch("/admin/chapters/remove/{id}")]
pub async fn remove_chapter(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageDto>> {
    caller.require(&state, permissions::COURSE).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    state.courses.remove_chapter(id).await?;
    Ok(web::Json(MessageDto::new("Chapter removed")))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/chapters/update/{id}",
    params(("id" = String, Path, description = "Chapter id")),
    request_body = UpdateChapterRequest,
    responses(
        (status = 200, description = "Chapter updated", body = ChapterDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Chapter not found", body = ErrorSchema)
    ),
    tags = ["admin-chapters"],
    operation_id = "updateChapter"
)]
#[patch("/admin/chapters/update/{id}")]
pub async fn update_chapter(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateChapterRequest>,
) -> ApiResult<web::Json<ChapterDto>> {
    caller.require(&state, permissions::COURSE).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let UpdateChapterRequest { title, text } = payload.into_inner();
    let changes = ChapterChanges::try_from_parts(title, text)?;
    let chapter = state.courses.update_chapter(id, changes).await?;
    Ok(web::Json(ChapterDto::new(chapter, &state.public_base_url)))
}
