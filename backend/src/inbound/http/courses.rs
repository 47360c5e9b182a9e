//! Course administration. A cover `image` is mandatory on creation.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::rbac::permissions;
use crate::domain::upload::MediaClass;
use crate::domain::{CourseChanges, CourseChangesInput, CourseDraft, CourseDraftInput};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::dto::{CourseDto, SearchQuery};
use crate::inbound::http::multipart::{FilePart, UploadForm};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_optional_i64, parse_optional_uuid, parse_uuid,
    require_uuid,
};

/// The course cover.
const IMAGE_PART: FilePart = FilePart::single("image", MediaClass::Image);

/// Documented shape of the course upload form.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseForm {
    pub title: Option<String>,
    pub short_desc: Option<String>,
    pub full_desc: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
    pub price: Option<i64>,
    pub discount: Option<i64>,
    /// `free`, `cash` or `special`. Free courses must cost 0.
    #[schema(example = "cash")]
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// `NotStarted`, `Completed` or `Holding`.
    pub status: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<String>,
}

fn integer(form: &UploadForm, name: &'static str) -> ApiResult<Option<i64>> {
    parse_optional_i64(form.text(name), FieldName::new(name))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/courses/list",
    params(SearchQuery),
    responses(
        (status = 200, description = "Courses, newest first", body = [CourseDto]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin-courses"],
    operation_id = "listCourses"
)]
#[get("/admin/courses/list")]
pub async fn list_courses(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<Vec<CourseDto>>> {
    caller.require(&state, permissions::COURSE).await?;
    let courses = state.courses.list(query.into_inner().search).await?;
    Ok(web::Json(
        courses
            .into_iter()
            .map(|course| CourseDto::new(course, &state.public_base_url))
            .collect(),
    ))
}

/// Create a course taught by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/admin/courses/add",
    request_body(content = CourseForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Course created", body = CourseDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Category not found", body = ErrorSchema)
    ),
    tags = ["admin-courses"],
    operation_id = "addCourse"
)]
#[post("/admin/courses/add")]
pub async fn add_course(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let instructor = caller.require(&state, permissions::COURSE).await?;
    let mut form = UploadForm::read(payload, &state.upload_scratch, &[IMAGE_PART]).await?;
    let draft = CourseDraft::try_from_input(CourseDraftInput {
        title: form.text("title").unwrap_or_default(),
        short_desc: form.text("shortDesc").unwrap_or_default(),
        full_desc: form.text("fullDesc").unwrap_or_default(),
        tags: form.list("tags").unwrap_or_default(),
        category: require_uuid(form.text("category"), FieldName::new("category"))?,
        price: integer(&form, "price")?.unwrap_or_default(),
        discount: integer(&form, "discount")?.unwrap_or_default(),
        kind: form.text("type").unwrap_or_default(),
        status: form.text("status"),
    })?;
    let image = form
        .take_file("image")
        .ok_or_else(|| missing_field_error(FieldName::new("image")))?;
    let course = state.courses.add(&instructor, draft, image).await?;
    Ok(HttpResponse::Created().json(CourseDto::new(course, &state.public_base_url)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/courses/{id}",
    params(("id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course with chapters and episodes", body = CourseDto),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema)
    ),
    tags = ["admin-courses"],
    operation_id = "getCourse"
)]
#[get("/admin/courses/{id}")]
pub async fn get_course(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<CourseDto>> {
    caller.require(&state, permissions::COURSE).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let course = state.courses.get(id).await?;
    Ok(web::Json(CourseDto::new(course, &state.public_base_url)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/courses/edit/{id}",
    params(("id" = String, Path, description = "Course id")),
    request_body(content = CourseForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Course updated", body = CourseDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Course or category not found", body = ErrorSchema)
    ),
    tags = ["admin-courses"],
    operation_id = "editCourse"
)]
#[patch("/admin/courses/edit/{id}")]
pub async fn edit_course(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: Multipart,
) -> ApiResult<web::Json<CourseDto>> {
    caller.require(&state, permissions::COURSE).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let mut form = UploadForm::read(payload, &state.upload_scratch, &[IMAGE_PART]).await?;
    let changes = CourseChanges::try_from_input(CourseChangesInput {
        title: form.text("title"),
        short_desc: form.text("shortDesc"),
        full_desc: form.text("fullDesc"),
        tags: form.list("tags"),
        category: parse_optional_uuid(form.text("category"), FieldName::new("category"))?,
        price: integer(&form, "price")?,
        discount: integer(&form, "discount")?,
        kind: form.text("type"),
        status: form.text("status"),
    })?;
    let course = state
        .courses
        .edit(id, changes, form.take_file("image"))
        .await?;
    Ok(web::Json(CourseDto::new(course, &state.public_base_url)))
}
