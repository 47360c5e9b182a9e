//! Authentication primitives: one-time codes, passwords and token pairs.

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use zeroize::Zeroizing;

use super::user::{Email, Mobile, UserValidationError, Username};
use super::User;

/// Lifetime of a one-time code.
pub const OTP_TTL: TimeDelta = TimeDelta::seconds(120);

/// Five digit one-time login code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpCode(u32);

impl OtpCode {
    /// Smallest code ever issued.
    pub const MIN: u32 = 10_000;
    /// Largest code ever issued.
    pub const MAX: u32 = 99_999;

    /// Draw a fresh code from `rng`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(Self::MIN..=Self::MAX))
    }

    /// Wrap a stored code.
    pub fn from_stored(value: u32) -> Self {
        Self(value)
    }

    /// Parse a submitted code: 5 to 10 ASCII digits.
    ///
    /// # Examples
    /// ```
    /// use campus::domain::OtpCode;
    ///
    /// assert_eq!(OtpCode::parse("12345").map(|c| c.value()), Ok(12345));
    /// assert!(OtpCode::parse("12a45").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, OtpValidationError> {
        let raw = raw.trim();
        if !(5..=10).contains(&raw.len()) || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OtpValidationError::MalformedCode);
        }
        raw.parse::<u32>()
            .map(Self)
            .map_err(|_| OtpValidationError::MalformedCode)
    }

    /// Numeric value of the code.
    pub fn value(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for OtpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised while parsing OTP submissions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OtpValidationError {
    #[error("the code that you sent is incorrect")]
    MalformedCode,
}

/// A code together with its expiry instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Otp {
    pub code: OtpCode,
    pub expires_at: DateTime<Utc>,
}

impl Otp {
    /// Issue a code valid for [`OTP_TTL`] from `now`.
    pub fn issue<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Self {
        Self {
            code: OtpCode::generate(rng),
            expires_at: now + OTP_TTL,
        }
    }

    /// True once `now` is past the expiry instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Password held in zeroizing memory.
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Minimum password length.
    pub const MIN: usize = 6;
    /// Maximum password length.
    pub const MAX: usize = 16;

    /// Validate the password length.
    pub fn new(raw: &str) -> Result<Self, RegistrationValidationError> {
        let length = raw.chars().count();
        if !(Self::MIN..=Self::MAX).contains(&length) {
            return Err(RegistrationValidationError::PasswordLength {
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Borrow the plain text.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Validation errors for account registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    #[error(transparent)]
    User(#[from] UserValidationError),
    #[error("password must be between {min} and {max} characters")]
    PasswordLength { min: usize, max: usize },
    #[error("password and confirmation do not match")]
    PasswordMismatch,
}

/// A validated registration request.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: Username,
    pub mobile: Mobile,
    pub email: Email,
    pub password: Password,
}

impl Registration {
    /// Validate raw registration fields.
    pub fn try_from_parts(
        username: &str,
        mobile: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let username = Username::new(username)?;
        let mobile = Mobile::new(mobile)?;
        let email = Email::new(email)?;
        let password = Password::new(password)?;
        if password.expose() != confirm_password {
            return Err(RegistrationValidationError::PasswordMismatch);
        }
        Ok(Self {
            username,
            mobile,
            email,
            password,
        })
    }
}

/// Validation errors for username/password login.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Username and password submitted for login.
#[derive(Clone)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate the raw parts; only emptiness is checked here.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: username.to_lowercase(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Plain text password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Which secret and lifetime a token uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Short lived bearer token (one hour).
    Access,
    /// Long lived token exchanged for a new pair (one year).
    Refresh,
}

impl TokenKind {
    /// Validity window of the token.
    pub fn lifetime(self) -> TimeDelta {
        match self {
            Self::Access => TimeDelta::hours(1),
            Self::Refresh => TimeDelta::days(365),
        }
    }
}

/// Seconds a stored refresh token is retained.
pub const REFRESH_TOKEN_TTL_SECS: u64 = 31_536_000;

/// Access and refresh tokens issued together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Result of a successful sign-in.
#[derive(Debug, Clone)]
pub struct SignIn {
    pub tokens: TokenPair,
    pub user: User,
}

/// A freshly requested one-time code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    pub mobile: Mobile,
    pub code: OtpCode,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    #[rstest]
    fn generated_codes_have_five_digits() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let code = OtpCode::generate(&mut rng);
            assert!((OtpCode::MIN..=OtpCode::MAX).contains(&code.value()));
            assert_eq!(code.to_string().len(), 5);
        }
    }

    #[rstest]
    fn otp_expires_after_two_minutes() {
        let mut rng = StdRng::seed_from_u64(1);
        let otp = Otp::issue(&mut rng, now());

        assert!(!otp.is_expired(now() + TimeDelta::seconds(120)));
        assert!(otp.is_expired(now() + TimeDelta::seconds(121)));
    }

    #[rstest]
    #[case("1234", false)]
    #[case("12345", true)]
    #[case("1234567890", true)]
    #[case("12345678901", false)]
    #[case("12 45", false)]
    fn submitted_codes_are_digit_strings(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(OtpCode::parse(raw).is_ok(), valid);
    }

    #[rstest]
    #[case("ada", "9121234567", "ada@example.com", "secret1", "secret1", None)]
    #[case(
        "ada",
        "9121234567",
        "ada@example.com",
        "secret1",
        "secret2",
        Some(RegistrationValidationError::PasswordMismatch)
    )]
    #[case(
        "ada",
        "9121234567",
        "ada@example.com",
        "12345",
        "12345",
        Some(RegistrationValidationError::PasswordLength { min: 6, max: 16 })
    )]
    #[case(
        "ada",
        "91212",
        "ada@example.com",
        "secret1",
        "secret1",
        Some(RegistrationValidationError::User(UserValidationError::InvalidMobile))
    )]
    fn registration_validation(
        #[case] username: &str,
        #[case] mobile: &str,
        #[case] email: &str,
        #[case] password: &str,
        #[case] confirm: &str,
        #[case] expected: Option<RegistrationValidationError>,
    ) {
        let result = Registration::try_from_parts(username, mobile, email, password, confirm);
        match expected {
            None => assert!(result.is_ok()),
            Some(error) => assert_eq!(result.err(), Some(error)),
        }
    }

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyUsername)]
    #[case("ada", "", LoginValidationError::EmptyPassword)]
    fn login_credentials_reject_empty_parts(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let result = LoginCredentials::try_from_parts(username, password);
        assert_eq!(result.err(), Some(expected));
    }

    #[rstest]
    fn password_debug_is_redacted() {
        let password = Password::new("secret1").expect("valid password");
        assert_eq!(format!("{password:?}"), "Password(***)");
    }
}
