//! User accounts.
//!
//! Users sign in with a mobile number and a one-time code, or with a
//! username and password after registering. Each user carries a single role
//! title that the permission guard resolves against the role table.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use uuid::Uuid;

use super::auth::Otp;
use super::rbac::RoleTitle;

/// Validation errors raised by the user newtypes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must not be empty")]
    EmptyId,
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("Your phone number is invalid")]
    InvalidMobile,
    #[error("username must start with a letter and contain at least three lowercase letters, digits, dots or underscores")]
    InvalidUsername,
    #[error("Your email is invalid")]
    InvalidEmail,
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    ///
    /// # Examples
    /// ```
    /// use campus::domain::UserId;
    ///
    /// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
    /// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    /// ```
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        let parsed = Uuid::parse_str(id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self::from_uuid(parsed))
    }

    /// Wrap an already parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Ten digit mobile number used as the OTP login handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mobile(String);

impl Mobile {
    /// Number of digits a mobile number must contain.
    pub const LENGTH: usize = 10;

    /// Validate a mobile number.
    ///
    /// # Examples
    /// ```
    /// use campus::domain::Mobile;
    ///
    /// assert!(Mobile::new("9121234567").is_ok());
    /// assert!(Mobile::new("912-123-45").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = raw.as_ref().trim();
        if raw.len() != Self::LENGTH || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(UserValidationError::InvalidMobile);
        }
        Ok(Self(raw.to_owned()))
    }
}

impl AsRef<str> for Mobile {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Mobile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        Regex::new(r"^[a-z][a-z0-9_.]{2,}$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Deliverability is not checked; this only rejects obvious typos.
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Lowercase login name for password accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Maximum username length.
    pub const MAX: usize = 32;

    /// Validate a username.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = raw.as_ref().trim();
        if raw.chars().count() > Self::MAX {
            return Err(UserValidationError::TooLong {
                field: "username",
                max: Self::MAX,
            });
        }
        if !username_regex().is_match(raw) {
            return Err(UserValidationError::InvalidUsername);
        }
        Ok(Self(raw.to_owned()))
    }

    /// Borrow the username.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Normalised (trimmed, lowercased) email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }

    /// Borrow the address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// A user account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub mobile: Mobile,
    pub username: Option<Username>,
    pub email: Option<Email>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: RoleTitle,
    pub otp: Option<Otp>,
    /// PHC formatted Argon2 hash; `None` for OTP-only accounts.
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create an OTP-only account holding the default `USER` role.
    pub fn from_mobile(mobile: Mobile, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::random(),
            mobile,
            username: None,
            email: None,
            first_name: None,
            last_name: None,
            role: RoleTitle::user(),
            otp: None,
            password_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when `needle` occurs (case-insensitively) in any searchable
    /// field.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        let fields = [
            Some(self.mobile.as_ref()),
            self.username.as_ref().map(Username::as_str),
            self.email.as_ref().map(Email::as_str),
            self.first_name.as_deref(),
            self.last_name.as_deref(),
        ];
        fields
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Maximum length of first and last names.
pub const NAME_MAX: usize = 64;

/// Profile fields a user may change about themselves.
///
/// The mobile number, OTP, role and password are deliberately absent: they
/// only change through the authentication and role flows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<Username>,
    pub email: Option<Email>,
}

impl ProfileChanges {
    /// Build a change set from raw inputs, dropping blank values.
    pub fn try_from_parts(
        first_name: Option<String>,
        last_name: Option<String>,
        username: Option<String>,
        email: Option<String>,
    ) -> Result<Self, UserValidationError> {
        let first_name = check_name("first_name", super::sanitize::clean_text(first_name))?;
        let last_name = check_name("last_name", super::sanitize::clean_text(last_name))?;
        let username = super::sanitize::clean_text(username)
            .map(Username::new)
            .transpose()?;
        let email = super::sanitize::clean_text(email)
            .map(Email::new)
            .transpose()?;
        Ok(Self {
            first_name,
            last_name,
            username,
            email,
        })
    }

    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.username.is_none()
            && self.email.is_none()
    }

    /// Apply the changes to `user`.
    pub fn apply(self, user: &mut User, now: DateTime<Utc>) {
        if let Some(first_name) = self.first_name {
            user.first_name = Some(first_name);
        }
        if let Some(last_name) = self.last_name {
            user.last_name = Some(last_name);
        }
        if let Some(username) = self.username {
            user.username = Some(username);
        }
        if let Some(email) = self.email {
            user.email = Some(email);
        }
        user.updated_at = now;
    }
}

fn check_name(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<String>, UserValidationError> {
    match value {
        Some(name) if name.chars().count() > NAME_MAX => Err(UserValidationError::TooLong {
            field,
            max: NAME_MAX,
        }),
        other => Ok(other),
    }
}
