//! Transport-agnostic failure reported by every service.
//!
//! Handlers render [`Error`] as the JSON envelope `{code, message, traceId,
//! details}`; the HTTP status is chosen from [`ErrorCode`] alone.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TraceId;

/// Failure category shared by the domain and its adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Input failed validation.
    InvalidRequest,
    /// Missing, expired or unverifiable credentials.
    Unauthorized,
    /// The caller's role lacks the required permission.
    Forbidden,
    NotFound,
    /// Duplicate titles, taken usernames, an OTP that is still valid.
    Conflict,
    /// Database, Redis or ffprobe could not be reached.
    ServiceUnavailable,
    InternalError,
}

impl ErrorCode {
    /// Message used when a caller supplies a blank one.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "Invalid request",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not found",
            Self::Conflict => "Conflict",
            Self::ServiceUnavailable => "Service unavailable",
            Self::InternalError => "Internal server error",
        }
    }
}

/// Error returned by domain services.
///
/// The message is never blank and the trace id, when set, is never blank.
/// Constructors pick up the [`TraceId`] of the request being served.
///
/// ```
/// use campus::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("Category not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.to_string(), "Category not found");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ErrorBody", into = "ErrorBody")]
pub struct Error {
    code: ErrorCode,
    message: String,
    trace_id: Option<String>,
    details: Option<Value>,
}

fn non_blank(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}

impl Error {
    /// Blank messages fall back to [`ErrorCode::default_message`].
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: non_blank(message.into())
                .unwrap_or_else(|| code.default_message().to_owned()),
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Correlation id of the request that raised the error.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Structured context, such as the offending form field.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Replace the trace id. Blank values leave the error unchanged.
    #[must_use]
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        if let Some(id) = non_blank(id.into()) {
            self.trace_id = Some(id);
        }
        self
    }

    /// ```
    /// use campus::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("Your title is invalid")
    ///     .with_details(json!({ "field": "title" }));
    /// assert_eq!(err.details().map(|d| &d["field"]), Some(&json!("title")));
    /// ```
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

/// Wire shape of [`Error`].
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ErrorBody {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "trace_id")]
    trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for ErrorBody {
    fn from(error: Error) -> Self {
        Self {
            code: error.code,
            message: error.message,
            trace_id: error.trace_id,
            details: error.details,
        }
    }
}

// A decoded payload keeps only the trace id it carried.
impl From<ErrorBody> for Error {
    fn from(body: ErrorBody) -> Self {
        Self {
            code: body.code,
            message: non_blank(body.message)
                .unwrap_or_else(|| body.code.default_message().to_owned()),
            trace_id: body.trace_id.and_then(non_blank),
            details: body.details,
        }
    }
}
