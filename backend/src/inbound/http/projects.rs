//! Personal projects. Each endpoint acts on the caller's own projects only;
//! anyone else's project id answers 404.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::rbac::permissions;
use crate::domain::upload::MediaClass;
use crate::domain::{ProjectChanges, ProjectDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::dto::{MessageDto, ProjectDto};
use crate::inbound::http::multipart::{FilePart, UploadForm};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, parse_uuid};

const IMAGE_PART: FilePart = FilePart::single("image", MediaClass::Image);

/// Documented shape of the project upload form.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectForm {
    pub title: Option<String>,
    /// At least 20 characters.
    pub text: Option<String>,
    pub tags: Option<Vec<String>>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<String>,
}

/// Documented shape of the image replacement form.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ProjectImageForm {
    #[schema(value_type = String, format = Binary)]
    pub image: String,
}

/// Request body for `PATCH /api/v1/projects/edit/{id}`. Blank fields are
/// left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditProjectRequest {
    pub title: Option<String>,
    pub text: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/create",
    request_body(content = ProjectForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Project created", body = ProjectDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "createProject"
)]
#[post("/projects/create")]
pub async fn create_project(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let owner = caller.require(&state, permissions::PROFILE).await?;
    let mut form = UploadForm::read(payload, &state.upload_scratch, &[IMAGE_PART]).await?;
    let draft = ProjectDraft::try_from_parts(
        &form.text("title").unwrap_or_default(),
        &form.text("text").unwrap_or_default(),
        form.list("tags").unwrap_or_default(),
    )?;
    let image = form
        .take_file("image")
        .ok_or_else(|| missing_field_error(FieldName::new("image")))?;
    let project = state.projects.add(&owner, draft, image).await?;
    Ok(HttpResponse::Created().json(ProjectDto::new(project, &state.public_base_url)))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/list",
    responses(
        (status = 200, description = "The caller's projects, newest first", body = [ProjectDto]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "listProjects"
)]
#[get("/projects/list")]
pub async fn list_projects(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<ProjectDto>>> {
    let owner = caller.require(&state, permissions::PROFILE).await?;
    let projects = state.projects.list(&owner).await?;
    Ok(web::Json(
        projects
            .into_iter()
            .map(|project| ProjectDto::new(project, &state.public_base_url))
            .collect(),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/v1/projects/edit/{id}",
    params(("id" = String, Path, description = "Project id")),
    request_body = EditProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Project not found", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "editProject"
)]
#[patch("/projects/edit/{id}")]
pub async fn edit_project(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<EditProjectRequest>,
) -> ApiResult<web::Json<ProjectDto>> {
    let owner = caller.require(&state, permissions::PROFILE).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let EditProjectRequest { title, text, tags } = payload.into_inner();
    let changes = ProjectChanges::try_from_parts(title, text, tags)?;
    let project = state.projects.edit(&owner, id, changes).await?;
    Ok(web::Json(ProjectDto::new(project, &state.public_base_url)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/projects/edit-image/{id}",
    params(("id" = String, Path, description = "Project id")),
    request_body(content = ProjectImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image replaced", body = ProjectDto),
        (status = 400, description = "Missing or unsupported image", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Project not found", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "editProjectImage"
)]
#[patch("/projects/edit-image/{id}")]
pub async fn edit_project_image(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: Multipart,
) -> ApiResult<web::Json<ProjectDto>> {
    let owner = caller.require(&state, permissions::PROFILE).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let mut form = UploadForm::read(payload, &state.upload_scratch, &[IMAGE_PART]).await?;
    let image = form
        .take_file("image")
        .ok_or_else(|| missing_field_error(FieldName::new("image")))?;
    let project = state.projects.replace_image(&owner, id, image).await?;
    Ok(web::Json(ProjectDto::new(project, &state.public_base_url)))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project", body = ProjectDto),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Project not found", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "getProject"
)]
#[get("/projects/{id}")]
pub async fn get_project(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProjectDto>> {
    let owner = caller.require(&state, permissions::PROFILE).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let project = state.projects.get(&owner, id).await?;
    Ok(web::Json(ProjectDto::new(project, &state.public_base_url)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/remove/{id}",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project removed", body = MessageDto),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Project not found", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "removeProject"
)]
#[delete("/projects/remove/{id}")]
pub async fn remove_project(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageDto>> {
    let owner = caller.require(&state, permissions::PROFILE).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    state.projects.remove(&owner, id).await?;
    Ok(web::Json(MessageDto::new("Project removed")))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
    use actix_web::test::TestRequest;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::rbac::roles;
    use crate::inbound::http::test_utils::send;
    use crate::test_support::{MultipartBody, TestBackend};

    async fn upload(
        backend: &TestBackend,
        bearer: &str,
        req: TestRequest,
        form: MultipartBody,
    ) -> (StatusCode, Value) {
        let (content_type, body) = form.finish();
        send(
            backend,
            req.insert_header((AUTHORIZATION, bearer))
                .insert_header((CONTENT_TYPE, content_type))
                .set_payload(body),
        )
        .await
    }

    fn chores() -> MultipartBody {
        MultipartBody::new()
            .text("title", "Chores")
            .text("text", "A tracker for shared household chores")
            .text("tags", "home,rust")
            .file("image", "shot.png", "image/png", b"png")
    }

    #[rstest]
    #[actix_web::test]
    async fn strangers_see_404_for_someone_elses_project() {
        let backend = TestBackend::new().expect("backend");
        let owner = backend.bearer_for("9120000060", roles::USER).await;
        let stranger = backend.bearer_for("9120000061", roles::USER).await;
        let (status, project) = upload(
            &backend,
            &owner,
            TestRequest::post().uri("/api/v1/projects/create"),
            chores(),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/api/v1/projects/{}", project["id"].as_str().expect("id"));

        let (status, error) = send(
            &backend,
            TestRequest::get()
                .uri(&uri)
                .insert_header((AUTHORIZATION, stranger.as_str())),
        )
        .await;
        let (_, listed) = send(
            &backend,
            TestRequest::get()
                .uri("/api/v1/projects/list")
                .insert_header((AUTHORIZATION, stranger.as_str())),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error["message"], "Project Not Found");
        assert_eq!(listed, json!([]));
    }

    #[rstest]
    #[actix_web::test]
    async fn short_descriptions_are_rejected() {
        let backend = TestBackend::new().expect("backend");
        let owner = backend.bearer_for("9120000062", roles::USER).await;
        let form = MultipartBody::new()
            .text("title", "Chores")
            .text("text", "too short")
            .file("image", "shot.png", "image/png", b"png");

        let (status, error) = upload(
            &backend,
            &owner,
            TestRequest::post().uri("/api/v1/projects/create"),
            form,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["details"]["field"], "text");
    }

    #[rstest]
    #[actix_web::test]
    async fn edit_image_replaces_the_stored_file() {
        let backend = TestBackend::new().expect("backend");
        let owner = backend.bearer_for("9120000063", roles::USER).await;
        let (_, project) = upload(
            &backend,
            &owner,
            TestRequest::post().uri("/api/v1/projects/create"),
            chores(),
        )
        .await;
        let old = project["image"].as_str().expect("image").to_owned();
        let id = project["id"].as_str().expect("id");

        let (status, updated) = upload(
            &backend,
            &owner,
            TestRequest::patch().uri(&format!("/api/v1/projects/edit-image/{id}")),
            MultipartBody::new().file("image", "next.jpg", "image/jpeg", b"jpg"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let new = updated["image"].as_str().expect("image");
        assert_ne!(new, old);
        assert!(new.ends_with(".jpg"));
        assert!(backend.upload_root().join(new).exists());
        assert!(!backend.upload_root().join(&old).exists());
    }
}
