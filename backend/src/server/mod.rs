//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AppConfig, ServerConfig};

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use campus::Trace;
#[cfg(debug_assertions)]
use campus::doc::ApiDoc;
use campus::inbound::http::configure;
use campus::inbound::http::health::{HealthState, live, ready};
use campus::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(configure))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Signal handling is left to the caller so shutdown can fail the health
/// probes before the listener stops.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);
    let bind_addr = config.bind_addr();

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .disable_signals()
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "listening");
    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use zeroize::Zeroizing;

    fn state() -> web::Data<HttpState> {
        let config = ServerConfig::new(
            "127.0.0.1:0".parse().expect("address"),
            Zeroizing::new("access".into()),
            Zeroizing::new("refresh".into()),
        );
        build_http_state(&config)
    }

    #[rstest]
    #[actix_web::test]
    async fn readiness_follows_the_health_state() {
        let health = web::Data::new(HealthState::new());
        let app = test::init_service(build_app(health.clone(), state())).await;

        let before = test::call_service(
            &app,
            test::TestRequest::get().uri("/health/ready").to_request(),
        )
        .await;
        assert_eq!(before.status(), StatusCode::SERVICE_UNAVAILABLE);

        health.mark_ready();
        let after = test::call_service(
            &app,
            test::TestRequest::get().uri("/health/ready").to_request(),
        )
        .await;
        assert_eq!(after.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn responses_carry_a_trace_id() {
        let app =
            test::init_service(build_app(web::Data::new(HealthState::new()), state())).await;

        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/user/get-otp")
                .set_json(serde_json::json!({"mobile": "12"}))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().contains_key("trace-id"));
    }

    #[cfg(debug_assertions)]
    #[rstest]
    #[actix_web::test]
    async fn serves_the_openapi_document() {
        let app =
            test::init_service(build_app(web::Data::new(HealthState::new()), state())).await;

        let response = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api-docs/openapi.json")
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
    }
}
