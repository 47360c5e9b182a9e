//! Test helpers for inbound HTTP components.

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::Value;

use crate::test_support::TestBackend;

use super::configure;

/// Build the `/api/v1` application on `backend`.
pub fn api_app(
    backend: &TestBackend,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .app_data(backend.data())
        .service(web::scope("/api/v1").configure(configure))
}

/// Send `req` through a fresh application and decode the JSON body.
pub async fn send(backend: &TestBackend, req: test::TestRequest) -> (StatusCode, Value) {
    let app = test::init_service(api_app(backend)).await;
    let res = test::call_service(&app, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, value)
}
