//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    Error, LoginValidationError, OtpValidationError, RegistrationValidationError,
    UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidNumber,
    InvalidField,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidNumber => "invalid_number",
            ErrorCode::InvalidField => "invalid_field",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(&self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, message: impl Into<String>, code: ErrorCode) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn field_value_error(
    field: FieldName,
    message: impl Into<String>,
    code: ErrorCode,
    value: &str,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        format!("missing required field: {name}"),
        ErrorCode::MissingField,
    )
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    field_value_error(
        field,
        format!("{name} must be a valid UUID"),
        ErrorCode::InvalidUuid,
        value,
    )
}

/// Parse a path or form identifier.
pub(crate) fn parse_uuid(value: String, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim()).map_err(|_| invalid_uuid_error(field, &value))
}

/// Parse an optional identifier where blank and `"0"` mean "absent".
pub(crate) fn parse_optional_uuid(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<Uuid>, Error> {
    crate::domain::sanitize::clean_text(value)
        .map(|raw| parse_uuid(raw, field))
        .transpose()
}

pub(crate) fn require(value: Option<String>, field: FieldName) -> Result<String, Error> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| missing_field_error(field))
}

/// A mandatory identifier sent as a form or body field.
pub(crate) fn require_uuid(value: Option<String>, field: FieldName) -> Result<Uuid, Error> {
    parse_uuid(require(value, field)?, field)
}

/// Parse an integer form field; blank values are treated as absent.
pub(crate) fn parse_optional_i64(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<i64>, Error> {
    parse_optional_number(value, field)
}

/// Parse a decimal form field; blank values are treated as absent.
pub(crate) fn parse_optional_f64(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<f64>, Error> {
    parse_optional_number::<f64>(value, field)?
        .map(|number| {
            if number.is_finite() {
                Ok(number)
            } else {
                Err(field_value_error(
                    field,
                    format!("{} must be a finite number", field.as_str()),
                    ErrorCode::InvalidNumber,
                    &number.to_string(),
                ))
            }
        })
        .transpose()
}

fn parse_optional_number<T: std::str::FromStr>(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<T>, Error> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse::<T>().map(Some).map_err(|_| {
        field_value_error(
            field,
            format!("{} must be a number", field.as_str()),
            ErrorCode::InvalidNumber,
            trimmed,
        )
    })
}

/// Map a user newtype failure onto the field it concerns.
pub(crate) fn map_user_validation(err: UserValidationError) -> Error {
    let field = match &err {
        UserValidationError::EmptyId | UserValidationError::InvalidId => "id",
        UserValidationError::InvalidMobile => "mobile",
        UserValidationError::InvalidUsername => "username",
        UserValidationError::InvalidEmail => "email",
        UserValidationError::TooLong { field, .. } => field,
    };
    field_error(FieldName::new(field), err.to_string(), ErrorCode::InvalidField)
}

pub(crate) fn map_registration_validation(err: RegistrationValidationError) -> Error {
    match err {
        RegistrationValidationError::User(inner) => map_user_validation(inner),
        RegistrationValidationError::PasswordLength { .. } => field_error(
            FieldName::new("password"),
            err.to_string(),
            ErrorCode::InvalidField,
        ),
        RegistrationValidationError::PasswordMismatch => field_error(
            FieldName::new("confirmPassword"),
            err.to_string(),
            ErrorCode::InvalidField,
        ),
    }
}

pub(crate) fn map_login_validation(err: LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::EmptyUsername => FieldName::new("username"),
        LoginValidationError::EmptyPassword => FieldName::new("password"),
    };
    missing_field_error(field)
}

pub(crate) fn map_otp_validation(err: OtpValidationError) -> Error {
    field_error(FieldName::new("code"), err.to_string(), ErrorCode::InvalidField)
}
