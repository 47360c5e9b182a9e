//! Permission administration. Requires the `all` permission.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::rbac::permissions;
use crate::domain::{PermissionChanges, PermissionDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::dto::{MessageDto, PermissionDto};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Request body for `POST /api/v1/admin/permissions/add`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPermissionRequest {
    #[schema(example = "reports")]
    pub title: String,
    pub description: Option<String>,
}

/// Request body for `PATCH /api/v1/admin/permissions/edit/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditPermissionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/permissions/list",
    responses(
        (status = 200, description = "Every permission", body = [PermissionDto]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin-rbac"],
    operation_id = "listPermissions"
)]
#[get("/admin/permissions/list")]
pub async fn list_permissions(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<PermissionDto>>> {
    caller.require(&state, permissions::ALL).await?;
    let list = state.rbac.list_permissions().await?;
    Ok(web::Json(list.into_iter().map(PermissionDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/permissions/add",
    request_body = AddPermissionRequest,
    responses(
        (status = 201, description = "Permission created", body = PermissionDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "Permission is Existing", body = ErrorSchema)
    ),
    tags = ["admin-rbac"],
    operation_id = "addPermission"
)]
#[post("/admin/permissions/add")]
pub async fn add_permission(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<AddPermissionRequest>,
) -> ApiResult<HttpResponse> {
    caller.require(&state, permissions::ALL).await?;
    let AddPermissionRequest { title, description } = payload.into_inner();
    let draft = PermissionDraft::try_from_parts(&title, description)?;
    let permission = state.rbac.create_permission(draft).await?;
    Ok(HttpResponse::Created().json(PermissionDto::from(permission)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/permissions/remove/{id}",
    params(("id" = String, Path, description = "Permission id")),
    responses(
        (status = 200, description = "Permission removed", body = MessageDto),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Permission not found", body = ErrorSchema)
    ),
    tags = ["admin-rbac"],
    operation_id = "removePermission"
)]
#[delete("/admin/permissions/remove/{id}")]
pub async fn remove_permission(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageDto>> {
    caller.require(&state, permissions::ALL).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    state.rbac.remove_permission(id).await?;
    Ok(web::Json(MessageDto::new("Permission removed")))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/permissions/edit/{id}",
    params(("id" = String, Path, description = "Permission id")),
    request_body = EditPermissionRequest,
    responses(
        (status = 200, description = "Permission updated", body = PermissionDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Permission not found", body = ErrorSchema),
        (status = 409, description = "Permission is Existing", body = ErrorSchema)
    ),
    tags = ["admin-rbac"],
    operation_id = "editPermission"
)]
#[patch("/admin/permissions/edit/{id}")]
pub async fn edit_permission(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<EditPermissionRequest>,
) -> ApiResult<web::Json<PermissionDto>> {
    caller.require(&state, permissions::ALL).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let EditPermissionRequest { title, description } = payload.into_inner();
    let changes = PermissionChanges::try_from_parts(title, description)?;
    let permission = state.rbac.edit_permission(id, changes).await?;
    Ok(web::Json(permission.into()))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::test::TestRequest;
    use rstest::rstest;
    use serde_json::{Value, json};
    use uuid::Uuid;

    use crate::domain::rbac::roles;
    use crate::inbound::http::test_utils::send;
    use crate::test_support::TestBackend;

    async fn call(backend: &TestBackend, bearer: &str, req: TestRequest) -> (StatusCode, Value) {
        send(backend, req.insert_header((AUTHORIZATION, bearer))).await
    }

    #[rstest]
    #[actix_web::test]
    async fn create_edit_and_remove() {
        let backend = TestBackend::new().expect("backend");
        let bearer = backend.bearer_for("9120000090", roles::ADMIN).await;

        let (status, created) = call(
            &backend,
            &bearer,
            TestRequest::post()
                .uri("/api/v1/admin/permissions/add")
                .set_json(json!({"title": "reports", "description": "Read reports"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().expect("id").to_owned();

        let (status, error) = call(
            &backend,
            &bearer,
            TestRequest::patch()
                .uri(&format!("/api/v1/admin/permissions/edit/{id}"))
                .set_json(json!({"title": "blog"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(error["message"], "Permission is Existing");

        let (status, edited) = call(
            &backend,
            &bearer,
            TestRequest::patch()
                .uri(&format!("/api/v1/admin/permissions/edit/{id}"))
                .set_json(json!({"title": "analytics"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(edited["title"], "analytics");
        assert_eq!(edited["description"], "Read reports");

        let (status, _) = call(
            &backend,
            &bearer,
            TestRequest::delete().uri(&format!("/api/v1/admin/permissions/remove/{id}")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn removing_unknown_permission_is_not_found() {
        let backend = TestBackend::new().expect("backend");
        let bearer = backend.bearer_for("9120000091", roles::ADMIN).await;

        let (status, _) = call(
            &backend,
            &bearer,
            TestRequest::delete()
                .uri(&format!("/api/v1/admin/permissions/remove/{}", Uuid::new_v4())),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[actix_web::test]
    async fn suppliers_cannot_list_permissions() {
        let backend = TestBackend::new().expect("backend");
        let bearer = backend.bearer_for("9120000092", roles::SUPPLIER).await;

        let (status, error) = call(
            &backend,
            &bearer,
            TestRequest::get().uri("/api/v1/admin/permissions/list"),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            error["message"],
            "You do not have permission to access this resource"
        );
    }
}
