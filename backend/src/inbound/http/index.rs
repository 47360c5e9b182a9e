//! Authenticated landing endpoint.

use actix_web::{HttpResponse, get};

use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::dto::MessageDto;
use crate::inbound::http::schemas::ErrorSchema;

/// Confirm the bearer token is accepted.
#[utoipa::path(
    get,
    path = "/api/v1/",
    responses(
        (status = 200, description = "Index page", body = MessageDto),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["index"],
    operation_id = "index"
)]
#[get("/")]
pub async fn index(_caller: AuthenticatedUser) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(MessageDto::new("Index Page")))
}
