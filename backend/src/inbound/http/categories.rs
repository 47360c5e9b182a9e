//! Category tree administration.
//!
//! Every endpoint requires the `category` permission.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::rbac::permissions;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::dto::{CategoryDto, CategoryNodeDto, MessageDto};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_optional_uuid, parse_uuid};

/// Request body for `POST /api/v1/admin/category/add`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCategoryRequest {
    #[schema(example = "Programming")]
    pub title: String,
    /// Parent category id; blank or absent creates a root.
    pub parent: Option<String>,
}

/// Request body for `PATCH /api/v1/admin/category/update/{id}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub title: String,
}

fn to_dtos(categories: Vec<crate::domain::Category>) -> Vec<CategoryDto> {
    categories.into_iter().map(CategoryDto::from).collect()
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/category/add",
    request_body = AddCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Parent not found", body = ErrorSchema),
        (status = 409, description = "Category already exists", body = ErrorSchema)
    ),
    tags = ["admin-category"],
    operation_id = "addCategory"
)]
#[post("/admin/category/add")]
pub async fn add_category(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<AddCategoryRequest>,
) -> ApiResult<HttpResponse> {
    caller.require(&state, permissions::CATEGORY).await?;
    let AddCategoryRequest { title, parent } = payload.into_inner();
    let parent = parse_optional_uuid(parent, FieldName::new("parent"))?;
    let category = state.categories.add(&title, parent).await?;
    Ok(HttpResponse::Created().json(CategoryDto::from(category)))
}

/// Root categories.
#[utoipa::path(
    get,
    path = "/api/v1/admin/category/parents",
    responses(
        (status = 200, description = "Root categories", body = [CategoryDto]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin-category"],
    operation_id = "listParentCategories"
)]
#[get("/admin/category/parents")]
pub async fn parents(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<CategoryDto>>> {
    caller.require(&state, permissions::CATEGORY).await?;
    Ok(web::Json(to_dtos(state.categories.parents().await?)))
}

/// Direct children of a category.
#[utoipa::path(
    get,
    path = "/api/v1/admin/category/children/{parent}",
    params(("parent" = String, Path, description = "Parent category id")),
    responses(
        (status = 200, description = "Child categories", body = [CategoryDto]),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin-category"],
    operation_id = "listChildCategories"
)]
#[get("/admin/category/children/{parent}")]
pub async fn children(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<CategoryDto>>> {
    caller.require(&state, permissions::CATEGORY).await?;
    let parent = parse_uuid(path.into_inner(), FieldName::new("parent"))?;
    Ok(web::Json(to_dtos(state.categories.children(parent).await?)))
}

/// The whole tree, roots first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/category/all",
    responses(
        (status = 200, description = "Category tree", body = [CategoryNodeDto]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin-category"],
    operation_id = "categoryTree"
)]
#[get("/admin/category/all")]
pub async fn tree(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<CategoryNodeDto>>> {
    caller.require(&state, permissions::CATEGORY).await?;
    let nodes = state.categories.tree().await?;
    Ok(web::Json(nodes.into_iter().map(Into::into).collect()))
}

/// Every category as a flat list.
#[utoipa::path(
    get,
    path = "/api/v1/admin/category/list-of-all",
    responses(
        (status = 200, description = "All categories", body = [CategoryDto]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin-category"],
    operation_id = "listAllCategories"
)]
#[get("/admin/category/list-of-all")]
pub async fn list_all(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<CategoryDto>>> {
    caller.require(&state, permissions::CATEGORY).await?;
    Ok(web::Json(to_dtos(state.categories.all_flat().await?)))
}

/// One category with its direct children.
#[utoipa::path(
    get,
    path = "/api/v1/admin/category/{id}",
    params(("id" = String, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = CategoryNodeDto),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Category not found", body = ErrorSchema)
    ),
    tags = ["admin-category"],
    operation_id = "getCategory"
)]
#[get("/admin/category/{id}")]
pub async fn get_category(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<CategoryNodeDto>> {
    caller.require(&state, permissions::CATEGORY).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    Ok(web::Json(state.categories.by_id(id).await?.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/category/update/{id}",
    params(("id" = String, Path, description = "Category id")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category renamed", body = CategoryDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Category not found", body = ErrorSchema),
        (status = 409, description = "Category already exists", body = ErrorSchema)
    ),
    tags = ["admin-category"],
    operation_id = "updateCategory"
)]
#[patch("/admin/category/update/{id}")]
pub async fn update_category(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateCategoryRequest>,
) -> ApiResult<web::Json<CategoryDto>> {
    caller.require(&state, permissions::CATEGORY).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let category = state.categories.update_title(id, &payload.title).await?;
    Ok(web::Json(category.into()))
}

/// Remove a category together with its descendants.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/category/remove/{id}",
    params(("id" = String, Path, description = "Category id")),
    responses(
        (status = 200, description = "Subtree removed", body = MessageDto),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Category not found", body = ErrorSchema)
    ),
    tags = ["admin-category"],
    operation_id = "removeCategory"
)]
#[delete("/admin/category/remove/{id}")]
pub async fn remove_category(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageDto>> {
    caller.require(&state, permissions::CATEGORY).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let removed = state.categories.remove(id).await?;
    Ok(web::Json(MessageDto::new(format!(
        "Removed {removed} categories"
    ))))
}
