//! Teams and the invitations that grow them.
//!
//! Any signed-in user may create a team and becomes its owner. Members
//! invite others by username; invitees answer under `/user/requests`.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::rbac::permissions;
use crate::domain::{InvitationStatus, TeamChanges, TeamDraft, TeamView};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::dto::{InvitationDto, MessageDto, TeamDto};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Request body for `POST /api/v1/teams/create`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
    #[schema(example = "Night owls")]
    pub name: String,
    /// Unique team handle.
    #[schema(example = "nightowls")]
    pub username: String,
    pub description: String,
}

/// Request body for `PATCH /api/v1/teams/update/{id}`. Blank fields are
/// left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub description: Option<String>,
}

fn to_dtos(views: Vec<TeamView>) -> Vec<TeamDto> {
    views.into_iter().map(TeamDto::from).collect()
}

#[utoipa::path(
    post,
    path = "/api/v1/teams/create",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = TeamDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 409, description = "Team username taken", body = ErrorSchema)
    ),
    tags = ["teams"],
    operation_id = "createTeam"
)]
#[post("/teams/create")]
pub async fn create_team(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<CreateTeamRequest>,
) -> ApiResult<HttpResponse> {
    let owner = caller.require(&state, permissions::PROFILE).await?;
    let CreateTeamRequest {
        name,
        username,
        description,
    } = payload.into_inner();
    let draft = TeamDraft::try_from_parts(&name, &username, &description)?;
    let view = state.teams.create(&owner, draft).await?;
    Ok(HttpResponse::Created().json(TeamDto::from(view)))
}

#[utoipa::path(
    get,
    path = "/api/v1/teams/list",
    responses(
        (status = 200, description = "Every team, newest first", body = [TeamDto]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["teams"],
    operation_id = "listTeams"
)]
#[get("/teams/list")]
pub async fn list_teams(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<TeamDto>>> {
    caller.require(&state, permissions::PROFILE).await?;
    Ok(web::Json(to_dtos(state.teams.list().await?)))
}

#[utoipa::path(
    get,
    path = "/api/v1/teams/me",
    responses(
        (status = 200, description = "Teams the caller owns or belongs to", body = [TeamDto]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["teams"],
    operation_id = "myTeams"
)]
#[get("/teams/me")]
pub async fn my_teams(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<TeamDto>>> {
    let user = caller.require(&state, permissions::PROFILE).await?;
    Ok(web::Json(to_dtos(state.teams.mine(&user).await?)))
}

/// Invite `username` to the team. The caller must already belong to it.
#[utoipa::path(
    get,
    path = "/api/v1/teams/invite/{team_id}/{username}",
    params(
        ("team_id" = String, Path, description = "Team id"),
        ("username" = String, Path, description = "Username of the invitee")
    ),
    responses(
        (status = 200, description = "Invitation sent", body = MessageDto),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Team or user not found", body = ErrorSchema),
        (status = 409, description = "Already a member or invited", body = ErrorSchema)
    ),
    tags = ["teams"],
    operation_id = "inviteToTeam"
)]
#[get("/teams/invite/{team_id}/{username}")]
pub async fn invite(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<MessageDto>> {
    let inviter = caller.require(&state, permissions::PROFILE).await?;
    let (team_id, username) = path.into_inner();
    let team_id = parse_uuid(team_id, FieldName::new("teamId"))?;
    state.teams.invite(&inviter, team_id, &username).await?;
    Ok(web::Json(MessageDto::new("Invitation sent")))
}

#[utoipa::path(
    patch,
    path = "/api/v1/teams/update/{id}",
    params(("id" = String, Path, description = "Team id")),
    request_body = UpdateTeamRequest,
    responses(
        (status = 200, description = "Team updated", body = TeamDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Team not found", body = ErrorSchema),
        (status = 409, description = "Team username taken", body = ErrorSchema)
    ),
    tags = ["teams"],
    operation_id = "updateTeam"
)]
#[patch("/teams/update/{id}")]
pub async fn update_team(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateTeamRequest>,
) -> ApiResult<web::Json<TeamDto>> {
    let user = caller.require(&state, permissions::PROFILE).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let UpdateTeamRequest {
        name,
        username,
        description,
    } = payload.into_inner();
    let changes = TeamChanges::try_from_parts(name, username, description)?;
    let scope = state.rbac.owner_scope(&user).await?;
    let view = state.teams.update(id, changes, &scope).await?;
    Ok(web::Json(view.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/teams/{id}",
    params(("id" = String, Path, description = "Team id")),
    responses(
        (status = 200, description = "Team", body = TeamDto),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Team not found", body = ErrorSchema)
    ),
    tags = ["teams"],
    operation_id = "getTeam"
)]
#[get("/teams/{id}")]
pub async fn get_team(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<TeamDto>> {
    caller.require(&state, permissions::PROFILE).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    Ok(web::Json(state.teams.get(id).await?.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/teams/remove/{id}",
    params(("id" = String, Path, description = "Team id")),
    responses(
        (status = 200, description = "Team removed with its invitations", body = MessageDto),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Team not found", body = ErrorSchema)
    ),
    tags = ["teams"],
    operation_id = "removeTeam"
)]
#[delete("/teams/remove/{id}")]
pub async fn remove_team(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageDto>> {
    let user = caller.require(&state, permissions::PROFILE).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let scope = state.rbac.owner_scope(&user).await?;
    state.teams.remove(id, &scope).await?;
    Ok(web::Json(MessageDto::new("Team removed")))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/requests",
    responses(
        (status = 200, description = "Invitations addressed to the caller", body = [InvitationDto]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["invitations"],
    operation_id = "listRequests"
)]
#[get("/user/requests")]
pub async fn list_requests(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<InvitationDto>>> {
    let user = caller.require(&state, permissions::PROFILE).await?;
    let views = state.teams.requests(&user, None).await?;
    Ok(web::Json(views.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/requests/{status}",
    params(("status" = String, Path, description = "`pending`, `accepted` or `rejected`")),
    responses(
        (status = 200, description = "Invitations with that status", body = [InvitationDto]),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["invitations"],
    operation_id = "listRequestsByStatus"
)]
#[get("/user/requests/{status}")]
pub async fn requests_by_status(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<InvitationDto>>> {
    let user = caller.require(&state, permissions::PROFILE).await?;
    let status = path.into_inner().parse::<InvitationStatus>()?;
    let views = state.teams.requests(&user, Some(status)).await?;
    Ok(web::Json(views.into_iter().map(Into::into).collect()))
}

/// Accept or reject a pending invitation. Accepting joins the team.
#[utoipa::path(
    patch,
    path = "/api/v1/user/requests/{id}/{status}",
    params(
        ("id" = String, Path, description = "Invitation id"),
        ("status" = String, Path, description = "`accepted` or `rejected`")
    ),
    responses(
        (status = 200, description = "Answer recorded", body = MessageDto),
        (status = 400, description = "Invalid id or status", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Invitation not found", body = ErrorSchema),
        (status = 409, description = "Already answered", body = ErrorSchema)
    ),
    tags = ["invitations"],
    operation_id = "answerRequest"
)]
#[patch("/user/requests/{id}/{status}")]
pub async fn answer_request(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<MessageDto>> {
    let user = caller.require(&state, permissions::PROFILE).await?;
    let (id, status) = path.into_inner();
    let id = parse_uuid(id, FieldName::new("id"))?;
    let status = status.parse::<InvitationStatus>()?;
    let invitation = state.teams.answer(&user, id, status).await?;
    Ok(web::Json(MessageDto::new(format!("Request {}", invitation.status))))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::test::TestRequest;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::rbac::roles;
    use crate::inbound::http::test_utils::send;
    use crate::test_support::TestBackend;

    async fn create(backend: &TestBackend, bearer: &str, handle: &str) -> (StatusCode, Value) {
        send(
            backend,
            TestRequest::post()
                .uri("/api/v1/teams/create")
                .insert_header((AUTHORIZATION, bearer))
                .set_json(json!({
                    "name": "Night owls",
                    "username": handle,
                    "description": "Late study group"
                })),
        )
        .await
    }

    async fn get(backend: &TestBackend, bearer: &str, uri: &str) -> (StatusCode, Value) {
        send(
            backend,
            TestRequest::get()
                .uri(uri)
                .insert_header((AUTHORIZATION, bearer)),
        )
        .await
    }

    #[rstest]
    #[actix_web::test]
    async fn create_lowercases_and_rejects_taken_handles() {
        let backend = TestBackend::new().expect("backend");
        let bearer = backend.bearer_for("9120000050", roles::USER).await;

        let (status, team) = create(&backend, &bearer, "NightOwls").await;
        let (again, error) = create(&backend, &bearer, "nightowls").await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(team["username"], "nightowls");
        assert_eq!(team["members"], json!([]));
        assert_eq!(again, StatusCode::CONFLICT);
        assert_eq!(error["message"], "The team username already exists");
    }

    #[rstest]
    #[actix_web::test]
    async fn invite_unknown_user_is_not_found() {
        let backend = TestBackend::new().expect("backend");
        let bearer = backend.bearer_for("9120000051", roles::USER).await;
        let (_, team) = create(&backend, &bearer, "nightowls").await;
        let id = team["id"].as_str().expect("id");

        let (status, error) = get(
            &backend,
            &bearer,
            &format!("/api/v1/teams/invite/{id}/nobody"),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error["message"], "user not found to invite to the group");
    }

    #[rstest]
    #[actix_web::test]
    async fn only_the_owner_updates() {
        let backend = TestBackend::new().expect("backend");
        let owner = backend.bearer_for("9120000052", roles::USER).await;
        let other = backend.bearer_for("9120000053", roles::USER).await;
        let (_, team) = create(&backend, &owner, "nightowls").await;
        let uri = format!("/api/v1/teams/update/{}", team["id"].as_str().expect("id"));

        let (forbidden, _) = send(
            &backend,
            TestRequest::patch()
                .uri(&uri)
                .insert_header((AUTHORIZATION, other.as_str()))
                .set_json(json!({ "name": "Early birds" })),
        )
        .await;
        let (status, updated) = send(
            &backend,
            TestRequest::patch()
                .uri(&uri)
                .insert_header((AUTHORIZATION, owner.as_str()))
                .set_json(json!({ "name": "Early birds", "description": "" })),
        )
        .await;

        assert_eq!(forbidden, StatusCode::FORBIDDEN);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "Early birds");
        assert_eq!(updated["description"], "Late study group");
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_request_statuses_are_rejected() {
        let backend = TestBackend::new().expect("backend");
        let bearer = backend.bearer_for("9120000054", roles::USER).await;

        let (status, error) = get(&backend, &bearer, "/api/v1/user/requests/maybe").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["details"]["field"], "status");
    }
}
