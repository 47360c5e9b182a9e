//! Account endpoints: OTP sign-in, token refresh, registration and
//! password login.
//!
//! ```text
//! POST /api/v1/user/get-otp {"mobile":"9121234567"}
//! POST /api/v1/user/check-otp {"mobile":"9121234567","code":"48213"}
//! POST /api/v1/user/refresh-token {"refreshToken":"..."}
//! POST /api/v1/user/register {"username":"ada","mobile":"...","email":"...","password":"...","confirmPassword":"..."}
//! POST /api/v1/user/login {"username":"ada","password":"..."}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{LoginCredentials, Mobile, OtpCode, Registration};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{OtpChallengeDto, SignInDto, UserDto};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    map_login_validation, map_otp_validation, map_registration_validation, map_user_validation,
};

/// Request body for `POST /api/v1/user/get-otp`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequest {
    #[schema(example = "9121234567")]
    pub mobile: String,
}

/// A submitted code, accepted as a JSON string or number.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(untagged)]
pub enum OtpCodeInput {
    Text(String),
    Number(u64),
}

impl OtpCodeInput {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

/// Request body for `POST /api/v1/user/check-otp`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckOtpRequest {
    #[schema(example = "9121234567")]
    pub mobile: String,
    pub code: OtpCodeInput,
}

/// Request body for `POST /api/v1/user/refresh-token`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for `POST /api/v1/user/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "9121234567")]
    pub mobile: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Request body for `POST /api/v1/user/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

fn parse_mobile(raw: &str) -> ApiResult<Mobile> {
    Mobile::new(raw).map_err(map_user_validation)
}

/// Issue a one-time password for a mobile number, creating the account on
/// first use.
#[utoipa::path(
    post,
    path = "/api/v1/user/get-otp",
    request_body = OtpRequest,
    responses(
        (status = 200, description = "Code issued", body = OtpChallengeDto),
        (status = 400, description = "Invalid mobile number", body = ErrorSchema),
        (status = 403, description = "A previous code is still valid", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["user-auth"],
    operation_id = "getOtp",
    security([])
)]
#[post("/user/get-otp")]
pub async fn get_otp(
    state: web::Data<HttpState>,
    payload: web::Json<OtpRequest>,
) -> ApiResult<HttpResponse> {
    let mobile = parse_mobile(&payload.mobile)?;
    let challenge = state.auth.request_otp(mobile).await?;
    Ok(HttpResponse::Ok().json(OtpChallengeDto::from(challenge)))
}

/// Exchange a valid one-time password for a token pair.
#[utoipa::path(
    post,
    path = "/api/v1/user/check-otp",
    request_body = CheckOtpRequest,
    responses(
        (status = 200, description = "Signed in", body = SignInDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Wrong or expired code", body = ErrorSchema),
        (status = 404, description = "Unknown mobile number", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["user-auth"],
    operation_id = "checkOtp",
    security([])
)]
#[post("/user/check-otp")]
pub async fn check_otp(
    state: web::Data<HttpState>,
    payload: web::Json<CheckOtpRequest>,
) -> ApiResult<HttpResponse> {
    let CheckOtpRequest { mobile, code } = payload.into_inner();
    let mobile = parse_mobile(&mobile)?;
    let code = OtpCode::parse(&code.into_text()).map_err(map_otp_validation)?;
    let sign_in = state.auth.check_otp(mobile, code).await?;
    Ok(HttpResponse::Ok().json(SignInDto::from(sign_in)))
}

/// Rotate a refresh token into a new token pair.
#[utoipa::path(
    post,
    path = "/api/v1/user/refresh-token",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = SignInDto),
        (status = 401, description = "Refresh token rejected", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["user-auth"],
    operation_id = "refreshToken",
    security([])
)]
#[post("/user/refresh-token")]
pub async fn refresh_token(
    state: web::Data<HttpState>,
    payload: web::Json<RefreshRequest>,
) -> ApiResult<HttpResponse> {
    let sign_in = state.auth.refresh(payload.refresh_token.trim()).await?;
    Ok(HttpResponse::Ok().json(SignInDto::from(sign_in)))
}

/// Create a password account.
#[utoipa::path(
    post,
    path = "/api/v1/user/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Username, mobile or email taken", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["user-auth"],
    operation_id = "register",
    security([])
)]
#[post("/user/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from_parts(
        &payload.username,
        &payload.mobile,
        &payload.email,
        &payload.password,
        &payload.confirm_password,
    )
    .map_err(map_registration_validation)?;
    let user = state.auth.register(registration).await?;
    Ok(HttpResponse::Created().json(UserDto::from(user)))
}

/// Sign in with username and password.
#[utoipa::path(
    post,
    path = "/api/v1/user/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = SignInDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["user-auth"],
    operation_id = "login",
    security([])
)]
#[post("/user/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from_parts(&payload.username, &payload.password)
        .map_err(map_login_validation)?;
    let sign_in = state.auth.login(credentials).await?;
    Ok(HttpResponse::Ok().json(SignInDto::from(sign_in)))
}
