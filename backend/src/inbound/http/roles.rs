//! Role administration. Requires the `all` permission.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::rbac::permissions;
use crate::domain::{RoleChanges, RoleDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::dto::{MessageDto, RoleDto};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Request body for `POST /api/v1/admin/roles/add`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddRoleRequest {
    #[schema(example = "EDITOR")]
    pub title: String,
    pub description: Option<String>,
    /// Titles of existing permissions.
    #[serde(default)]
    #[schema(example = json!(["blog", "profile"]))]
    pub permissions: Vec<String>,
}

/// Request body for `PATCH /api/v1/admin/roles/edit/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditRoleRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<Vec<String>>,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/roles/list",
    responses(
        (status = 200, description = "Every role", body = [RoleDto]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin-rbac"],
    operation_id = "listRoles"
)]
#[get("/admin/roles/list")]
pub async fn list_roles(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<RoleDto>>> {
    caller.require(&state, permissions::ALL).await?;
    let roles = state.rbac.list_roles().await?;
    Ok(web::Json(roles.into_iter().map(RoleDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/roles/add",
    request_body = AddRoleRequest,
    responses(
        (status = 201, description = "Role created", body = RoleDto),
        (status = 400, description = "Invalid request or unknown permission", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "Role is Existing", body = ErrorSchema)
    ),
    tags = ["admin-rbac"],
    operation_id = "addRole"
)]
#[post("/admin/roles/add")]
pub async fn add_role(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<AddRoleRequest>,
) -> ApiResult<HttpResponse> {
    caller.require(&state, permissions::ALL).await?;
    let AddRoleRequest {
        title,
        description,
        permissions,
    } = payload.into_inner();
    let draft = RoleDraft::try_from_parts(&title, description, permissions)?;
    let role = state.rbac.create_role(draft).await?;
    Ok(HttpResponse::Created().json(RoleDto::from(role)))
}

/// Remove a role by id or by title.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/roles/remove/{field}",
    params(("field" = String, Path, description = "Role id or title")),
    responses(
        (status = 200, description = "Role removed", body = MessageDto),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Role not found", body = ErrorSchema)
    ),
    tags = ["admin-rbac"],
    operation_id = "removeRole"
)]
#[delete("/admin/roles/remove/{field}")]
pub async fn remove_role(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageDto>> {
    caller.require(&state, permissions::ALL).await?;
    state.rbac.remove_role(path.trim()).await?;
    Ok(web::Json(MessageDto::new("Role removed")))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/roles/edit/{id}",
    params(("id" = String, Path, description = "Role id")),
    request_body = EditRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = RoleDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Role not found", body = ErrorSchema),
        (status = 409, description = "Role is Existing", body = ErrorSchema)
    ),
    tags = ["admin-rbac"],
    operation_id = "editRole"
)]
#[patch("/admin/roles/edit/{id}")]
pub async fn edit_role(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<EditRoleRequest>,
) -> ApiResult<web::Json<RoleDto>> {
    caller.require(&state, permissions::ALL).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let EditRoleRequest {
        title,
        description,
        permissions,
    } = payload.into_inner();
    let changes = RoleChanges::try_from_parts(title, description, permissions)?;
    let role = state.rbac.edit_role(id, changes).await?;
    Ok(web::Json(role.into()))
}
