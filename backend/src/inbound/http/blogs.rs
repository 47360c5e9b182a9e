//! Blog administration. Posts are created and edited with
//! `multipart/form-data` so a cover image can travel with the fields.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::rbac::permissions;
use crate::domain::upload::MediaClass;
use crate::domain::{BlogChanges, BlogDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::dto::{BlogDto, MessageDto};
use crate::inbound::http::multipart::{FilePart, UploadForm};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_optional_uuid, parse_uuid, require_uuid};

/// The blog cover.
const IMAGE_PART: FilePart = FilePart::single("image", MediaClass::Image);

/// Documented shape of the blog upload form.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogForm {
    pub title: Option<String>,
    pub short_text: Option<String>,
    pub text: Option<String>,
    /// Repeated `tags` parts or one comma separated value.
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/blogs",
    responses(
        (status = 200, description = "Every post, newest first", body = [BlogDto]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin-blogs"],
    operation_id = "listBlogs"
)]
#[get("/admin/blogs")]
pub async fn list_blogs(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<BlogDto>>> {
    caller.require(&state, permissions::BLOG).await?;
    let views = state.blogs.list().await?;
    Ok(web::Json(
        views
            .into_iter()
            .map(|view| BlogDto::new(view, &state.public_base_url))
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/blogs/add",
    request_body(content = BlogForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Post created", body = BlogDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Category not found", body = ErrorSchema)
    ),
    tags = ["admin-blogs"],
    operation_id = "addBlog"
)]
#[post("/admin/blogs/add")]
pub async fn add_blog(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let author = caller.require(&state, permissions::BLOG).await?;
    let mut form = UploadForm::read(payload, &state.upload_scratch, &[IMAGE_PART]).await?;
    let category = require_uuid(form.text("category"), FieldName::new("category"))?;
    let draft = BlogDraft::try_from_parts(
        &form.text("title").unwrap_or_default(),
        &form.text("shortText").unwrap_or_default(),
        &form.text("text").unwrap_or_default(),
        form.list("tags").unwrap_or_default(),
        category,
    )?;
    let view = state
        .blogs
        .add(&author, draft, form.take_file("image"))
        .await?;
    Ok(HttpResponse::Created().json(BlogDto::new(view, &state.public_base_url)))
}

/// Sparse update; a new image replaces the old one.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/blogs/update/{id}",
    params(("id" = String, Path, description = "Blog id")),
    request_body(content = BlogForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Post updated", body = BlogDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Blog or category not found", body = ErrorSchema)
    ),
    tags = ["admin-blogs"],
    operation_id = "updateBlog"
)]
#[patch("/admin/blogs/update/{id}")]
pub async fn update_blog(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: Multipart,
) -> ApiResult<web::Json<BlogDto>> {
    caller.require(&state, permissions::BLOG).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let mut form = UploadForm::read(payload, &state.upload_scratch, &[IMAGE_PART]).await?;
    let changes = BlogChanges::try_from_parts(
        form.text("title"),
        form.text("shortText"),
        form.text("text"),
        form.list("tags"),
        parse_optional_uuid(form.text("category"), FieldName::new("category"))?,
    )?;
    let view = state
        .blogs
        .update(id, changes, form.take_file("image"))
        .await?;
    Ok(web::Json(BlogDto::new(view, &state.public_base_url)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/blogs/{id}",
    params(("id" = String, Path, description = "Blog id")),
    responses(
        (status = 200, description = "Post", body = BlogDto),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Blog not found", body = ErrorSchema)
    ),
    tags = ["admin-blogs"],
    operation_id = "getBlog"
)]
#[get("/admin/blogs/{id}")]
pub async fn get_blog(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<BlogDto>> {
    caller.require(&state, permissions::BLOG).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let view = state.blogs.get(id).await?;
    Ok(web::Json(BlogDto::new(view, &state.public_base_url)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/blogs/{id}",
    params(("id" = String, Path, description = "Blog id")),
    responses(
        (status = 200, description = "Post deleted", body = MessageDto),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Blog not found", body = ErrorSchema)
    ),
    tags = ["admin-blogs"],
    operation_id = "deleteBlog"
)]
#[delete("/admin/blogs/{id}")]
pub async fn delete_blog(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageDto>> {
    caller.require(&state, permissions::BLOG).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    state.blogs.delete(id).await?;
    Ok(web::Json(MessageDto::new("Blog deleted")))
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

    struct Fixture {
        backend: TestBackend,
        bearer: String,
        category: String,
    }

    async fn fixture() -> Fixture {
        let backend = TestBackend::new().expect("backend");
        let bearer = backend.bearer_for("9120000020", roles::WRITER).await;
        let category = backend
            .data()
            .categories
            .add("Engineering", None)
            .await
            .expect("category")
            .id
            .to_string();
        Fixture {
            backend,
            bearer,
            category,
        }
    }

    async fn post_form(fx: &Fixture, uri: &str, form: MultipartBody, patch: bool) -> (StatusCode, Value) {
        let (content_type, body) = form.finish();
        let req = if patch {
            TestRequest::patch()
        } else {
            TestRequest::post()
        };
        send(
            &fx.backend,
            req.uri(uri)
                .insert_header((AUTHORIZATION, fx.bearer.as_str()))
                .insert_header((CONTENT_TYPE, content_type))
                .set_payload(body),
        )
        .await
    }

    fn valid_form(category: &str) -> MultipartBody {
        MultipartBody::new()
            .text("title", "Async Rust")
            .text("shortText", "Futures explained")
            .text("text", "A long body")
            .text("tags", "rust,async")
            .text("category", category)
    }

    #[rstest]
    #[actix_web::test]
    async fn add_stores_the_image_and_returns_its_url() {
        let fx = fixture().await;
        let form = valid_form(&fx.category).file("image", "cover.PNG", "image/png", b"png");

        let (status, blog) = post_form(&fx, "/api/v1/admin/blogs/add", form, false).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(blog["tags"], json!(["rust", "async"]));
        assert_eq!(blog["categoryTitle"], "Engineering");
        let image = blog["image"].as_str().expect("image path");
        assert!(image.starts_with("uploads/blogs/"));
        assert!(image.ends_with(".png"));
        assert!(fx.backend.upload_root().join(image).exists());
        assert_eq!(
            blog["imageUrl"],
            format!("{}/{image}", crate::test_support::TEST_BASE_URL)
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn add_rejects_unsupported_images() {
        let fx = fixture().await;
        let form = valid_form(&fx.category).file("image", "cover.exe", "application/x", b"mz");

        let (status, error) = post_form(&fx, "/api/v1/admin/blogs/add", form, false).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["details"]["field"], "image");
    }

    #[rstest]
    #[actix_web::test]
    async fn add_requires_a_category() {
        let fx = fixture().await;
        let form = MultipartBody::new()
            .text("title", "Async Rust")
            .text("shortText", "Futures explained")
            .text("text", "A long body");

        let (status, error) = post_form(&fx, "/api/v1/admin/blogs/add", form, false).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["details"]["field"], "category");
    }

    #[rstest]
    #[actix_web::test]
    async fn update_then_delete() {
        let fx = fixture().await;
        let (_, blog) =
            post_form(&fx, "/api/v1/admin/blogs/add", valid_form(&fx.category), false).await;
        let id = blog["id"].as_str().expect("id").to_owned();

        let (status, updated) = post_form(
            &fx,
            &format!("/api/v1/admin/blogs/update/{id}"),
            MultipartBody::new().text("title", "Sync Rust").text("text", ""),
            true,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Sync Rust");
        assert_eq!(updated["text"], "A long body");

        let (status, _) = send(
            &fx.backend,
            TestRequest::delete()
                .uri(&format!("/api/v1/admin/blogs/{id}"))
                .insert_header((AUTHORIZATION, fx.bearer.as_str())),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, error) = send(
            &fx.backend,
            TestRequest::get()
                .uri(&format!("/api/v1/admin/blogs/{id}"))
                .insert_header((AUTHORIZATION, fx.bearer.as_str())),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error["code"], "not_found");
    }

    #[rstest]
    #[actix_web::test]
    async fn suppliers_may_not_write_blogs() {
        let fx = fixture().await;
        let bearer = fx.backend.bearer_for("9120000021", roles::SUPPLIER).await;

        let (status, _) = send(
            &fx.backend,
            TestRequest::get()
                .uri("/api/v1/admin/blogs")
                .insert_header((AUTHORIZATION, bearer.as_str())),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
