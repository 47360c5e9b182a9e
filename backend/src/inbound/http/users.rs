//! User administration and the caller's own profile.
//!
//! ```text
//! GET   /api/v1/admin/users/list?search=ada
//! GET   /api/v1/admin/users/profile
//! PATCH /api/v1/admin/users/edit/{id} {"firstName":"Ada","email":"ada@example.com"}
//! ```
//!
//! A caller may edit their own profile; editing anyone else needs `all`.

use actix_web::{get, patch, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::rbac::permissions;
use crate::domain::{ProfileChanges, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::dto::{SearchQuery, UserDto};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, map_user_validation, parse_uuid};

/// Editable profile fields. Anything else in the body (mobile, role, OTP
/// state) is ignored.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(example = "ada")]
    pub username: Option<String>,
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users/list",
    params(SearchQuery),
    responses(
        (status = 200, description = "Users, newest first", body = [UserDto]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin-users"],
    operation_id = "listUsers"
)]
#[get("/admin/users/list")]
pub async fn list_users(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<Vec<UserDto>>> {
    caller.require(&state, permissions::ALL).await?;
    let users = state.users.list(query.into_inner().search).await?;
    Ok(web::Json(users.into_iter().map(UserDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users/profile",
    responses(
        (status = 200, description = "The caller's account", body = UserDto),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin-users"],
    operation_id = "profile"
)]
#[get("/admin/users/profile")]
pub async fn profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<UserDto>> {
    let user = caller.require(&state, permissions::PROFILE).await?;
    Ok(web::Json(state.users.profile(&user).await?.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/users/edit/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = EditProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Editing another user without the all permission", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 409, description = "Username or email already taken", body = ErrorSchema)
    ),
    tags = ["admin-users"],
    operation_id = "editProfile"
)]
#[patch("/admin/users/edit/{id}")]
pub async fn edit_profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<EditProfileRequest>,
) -> ApiResult<web::Json<UserDto>> {
    let user = caller.require(&state, permissions::PROFILE).await?;
    let id = UserId::from_uuid(parse_uuid(path.into_inner(), FieldName::new("id"))?);
    // Other accounts are editable only with the `all` permission.
    if id != user.id {
        state.rbac.require(&user, Some(permissions::ALL)).await?;
    }
    let EditProfileRequest {
        first_name,
        last_name,
        username,
        email,
    } = payload.into_inner();
    let changes = ProfileChanges::try_from_parts(first_name, last_name, username, email)
        .map_err(map_user_validation)?;
    let user = state.users.edit_profile(&id, changes).await?;
    Ok(web::Json(user.into()))
}
