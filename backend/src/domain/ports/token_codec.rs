//! Port for signing and verifying bearer tokens.

use chrono::{DateTime, Utc};

use crate::domain::{Mobile, TokenKind};

use super::define_port_error;

define_port_error! {
    /// Errors raised while signing or verifying tokens.
    pub enum TokenCodecError {
        /// The token is malformed, has a bad signature or has expired.
        Invalid { message: String } => "token rejected: {message}",
        /// Signing failed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Issues and verifies access and refresh tokens.
///
/// Both kinds carry the holder's mobile number; each kind is signed with its
/// own secret so a refresh token is never accepted as an access token.
#[cfg_attr(test, mockall::automock)]
pub trait TokenCodec: Send + Sync {
    /// Sign a token of `kind` for `mobile`, valid from `now`.
    fn issue(
        &self,
        kind: TokenKind,
        mobile: &Mobile,
        now: DateTime<Utc>,
    ) -> Result<String, TokenCodecError>;

    /// Verify `token` as `kind` and return the mobile number it carries.
    fn verify(&self, kind: TokenKind, token: &str) -> Result<Mobile, TokenCodecError>;
}
