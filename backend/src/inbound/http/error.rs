//! HTTP adapter mapping for domain errors.
//!
//! The domain error type stays HTTP-agnostic; this module decides the status
//! code for each [`ErrorCode`], redacts internal failures and echoes the
//! trace identifier as a response header.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

pub use crate::domain::ApiResult;

const REDACTED_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal(REDACTED_MESSAGE);
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(
            self.code(),
            ErrorCode::InternalError | ErrorCode::ServiceUnavailable
        ) {
            error!(
                code = ?self.code(),
                message = self.message(),
                trace_id = self.trace_id().unwrap_or_default(),
                "request failed"
            );
        }
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(REDACTED_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;

    const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

    async fn body_of(error: &Error) -> (StatusCode, Option<String>, Value) {
        let response = error.error_response();
        let status = response.status();
        let header = response
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = to_bytes(response.into_body()).await.expect("body bytes");
        let body = serde_json::from_slice(&bytes).expect("json body");
        (status, header, body)
    }

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
    #[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
    #[case(Error::conflict("Role is Existing"), StatusCode::CONFLICT)]
    #[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
        assert_eq!(ResponseError::status_code(&error), status);
    }

    #[rstest]
    #[actix_web::test]
    async fn internal_errors_are_redacted() {
        let error = Error::internal("database exploded")
            .with_trace_id(TRACE_ID)
            .with_details(json!({"secret": "x"}));

        let (status, header, body) = body_of(&error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(header.as_deref(), Some(TRACE_ID));
        assert_eq!(body["message"], REDACTED_MESSAGE);
        assert_eq!(body["traceId"], TRACE_ID);
        assert!(body.get("details").is_none_or(Value::is_null));
    }

    #[rstest]
    #[actix_web::test]
    async fn client_errors_keep_message_and_details() {
        let error = Error::invalid_request("Your phone number is invalid")
            .with_trace_id(TRACE_ID)
            .with_details(json!({"field": "mobile"}));

        let (status, _, body) = body_of(&error).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["message"], "Your phone number is invalid");
        assert_eq!(body["details"]["field"], "mobile");
    }

    #[rstest]
    #[actix_web::test]
    async fn missing_trace_id_omits_header() {
        let (_, header, _) = body_of(&Error::not_found("Blog not found")).await;
        assert!(header.is_none());
    }

    #[rstest]
    fn actix_errors_become_internal() {
        let actix = actix_web::error::ErrorBadGateway("upstream");
        let error = Error::from(actix);
        assert_eq!(error.code(), ErrorCode::InternalError);
        assert_eq!(error.message(), REDACTED_MESSAGE);
    }
}
