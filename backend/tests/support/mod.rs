//! Shared helpers for HTTP integration tests.
//!
//! Every test builds the full `/api/v1` scope over in-memory adapters and
//! talks to it with JSON or multipart requests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use campus::Trace;
use campus::inbound::http::configure;
use campus::test_support::{MultipartBody, TestBackend};
use serde_json::{Value, json};

/// Dispatch `req` through a freshly initialised app and decode the body.
pub async fn send(backend: &TestBackend, req: TestRequest) -> (StatusCode, Value) {
    let app = test::init_service(
        App::new()
            .app_data(backend.data())
            .wrap(Trace)
            .service(web::scope("/api/v1").configure(configure)),
    )
    .await;
    let response = test::call_service(&app, req.to_request()).await;
    let status = response.status();
    let bytes = test::read_body(response).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON response body")
    };
    (status, body)
}

/// Same as [`send`] with an `Authorization` header.
pub async fn send_as(backend: &TestBackend, bearer: &str, req: TestRequest) -> (StatusCode, Value) {
    send(backend, req.insert_header((AUTHORIZATION, bearer))).await
}

/// Send a multipart form with an `Authorization` header.
pub async fn send_form(
    backend: &TestBackend,
    bearer: &str,
    req: TestRequest,
    form: MultipartBody,
) -> (StatusCode, Value) {
    let (content_type, body) = form.finish();
    send_as(
        backend,
        bearer,
        req.insert_header((CONTENT_TYPE, content_type))
            .set_payload(body),
    )
    .await
}

/// Sign in through the OTP endpoints and return the token pair response.
pub async fn sign_in_with_otp(backend: &TestBackend, mobile: &str) -> Value {
    let (status, challenge) = send(
        backend,
        TestRequest::post()
            .uri("/api/v1/user/get-otp")
            .set_json(json!({ "mobile": mobile })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "get-otp failed: {challenge}");

    let (status, signed_in) = send(
        backend,
        TestRequest::post()
            .uri("/api/v1/user/check-otp")
            .set_json(json!({ "mobile": mobile, "code": challenge["code"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "check-otp failed: {signed_in}");
    signed_in
}

/// `Authorization` header value for an access token.
pub fn bearer(token: &Value) -> String {
    format!("Bearer {}", token.as_str().expect("token string"))
}
