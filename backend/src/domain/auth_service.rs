//! Sign-in flows: mobile OTP, username/password and refresh tokens.
//!
//! Every successful sign-in issues an access token and a refresh token. The
//! refresh token is also written to the refresh token store, replacing any
//! earlier one for the same user, so only the latest refresh token works.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{PasswordHasher, RefreshTokenStore, TokenCodec, UserRepository};
use crate::domain::service_support::{
    map_hasher_error, map_refresh_store_error, map_signing_error, map_user_error,
};
use crate::domain::{
    Error, LoginCredentials, Mobile, Otp, OtpChallenge, OtpCode, REFRESH_TOKEN_TTL_SECS,
    Registration, SignIn, TokenKind, TokenPair, User, Username,
};

/// Message returned for any bearer authentication failure.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed - Please Login into your account";
const OTP_NOT_EXPIRED: &str = "Your code is not expired";
const OTP_INCORRECT: &str = "The code that you sent is incorrect";
const OTP_EXPIRED: &str = "Your code is expired";
const BAD_CREDENTIALS: &str = "Username or password is incorrect";

/// Dependencies of [`AuthService`].
#[derive(Clone)]
pub struct AuthServicePorts {
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenCodec>,
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub clock: Arc<dyn Clock>,
}

/// Authentication use-cases.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenCodec>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    /// Create the service from its ports.
    pub fn new(ports: AuthServicePorts) -> Self {
        let AuthServicePorts {
            users,
            tokens,
            refresh_tokens,
            hasher,
            clock,
        } = ports;
        Self {
            users,
            tokens,
            refresh_tokens,
            hasher,
            clock,
        }
    }

    /// Issue a one-time code for `mobile`, creating the account on first
    /// contact.
    ///
    /// A user still holding an unexpired code is refused so codes cannot be
    /// re-rolled until the previous one lapses.
    pub async fn request_otp(&self, mobile: Mobile) -> Result<OtpChallenge, Error> {
        let now = self.clock.utc();
        let existing = self
            .users
            .find_by_mobile(&mobile)
            .await
            .map_err(map_user_error)?;

        if let Some(otp) = existing.as_ref().and_then(|user| user.otp) {
            if !otp.is_expired(now) {
                return Err(Error::forbidden(OTP_NOT_EXPIRED));
            }
        }

        let otp = Otp::issue(&mut rand::thread_rng(), now);
        match existing {
            Some(mut user) => {
                user.otp = Some(otp);
                user.updated_at = now;
                self.users.update(&user).await.map_err(map_user_error)?;
            }
            None => {
                let mut user = User::from_mobile(mobile.clone(), now);
                user.otp = Some(otp);
                self.users.insert(&user).await.map_err(map_user_error)?;
                info!(user_id = %user.id, "created account from mobile number");
            }
        }

        debug!(%mobile, code = %otp.code, "issued one-time code");
        Ok(OtpChallenge {
            mobile,
            code: otp.code,
        })
    }

    /// Exchange a one-time code for a token pair.
    pub async fn check_otp(&self, mobile: Mobile, code: OtpCode) -> Result<SignIn, Error> {
        let user = self
            .users
            .find_by_mobile(&mobile)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("User not found"))?;

        let otp = user
            .otp
            .filter(|otp| otp.code == code)
            .ok_or_else(|| Error::unauthorized(OTP_INCORRECT))?;
        if otp.is_expired(self.clock.utc()) {
            return Err(Error::unauthorized(OTP_EXPIRED));
        }

        self.sign_in(user).await
    }

    /// Trade a refresh token for a new pair.
    ///
    /// The presented token must match the one most recently stored for the
    /// user.
    pub async fn refresh(&self, refresh_token: &str) -> Result<SignIn, Error> {
        let mobile = self
            .tokens
            .verify(TokenKind::Refresh, refresh_token)
            .map_err(|_| Error::unauthorized(LOGIN_FAILED_MESSAGE))?;
        let user = self
            .users
            .find_by_mobile(&mobile)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized(LOGIN_FAILED_MESSAGE))?;
        let stored = self
            .refresh_tokens
            .fetch(&user.id)
            .await
            .map_err(map_refresh_store_error)?;
        if stored.as_deref() != Some(refresh_token) {
            return Err(Error::unauthorized(LOGIN_FAILED_MESSAGE));
        }

        self.sign_in(user).await
    }

    /// Create a password account.
    pub async fn register(&self, registration: Registration) -> Result<User, Error> {
        let Registration {
            username,
            mobile,
            email,
            password,
        } = registration;

        if self
            .users
            .find_by_username(&username)
            .await
            .map_err(map_user_error)?
            .is_some()
        {
            return Err(Error::conflict("Username is already taken"));
        }
        if self
            .users
            .find_by_mobile(&mobile)
            .await
            .map_err(map_user_error)?
            .is_some()
        {
            return Err(Error::conflict("Mobile number is already registered"));
        }
        if self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_error)?
            .is_some()
        {
            return Err(Error::conflict("Email is already registered"));
        }

        let hash = self
            .hasher
            .hash(password.expose())
            .await
            .map_err(|err| map_hasher_error(&err))?;
        let mut user = User::from_mobile(mobile, self.clock.utc());
        user.username = Some(username);
        user.email = Some(email);
        user.password_hash = Some(hash);
        self.users.insert(&user).await.map_err(map_user_error)?;
        info!(user_id = %user.id, "registered password account");
        Ok(user)
    }

    /// Verify a username and password.
    pub async fn login(&self, credentials: LoginCredentials) -> Result<SignIn, Error> {
        let username = Username::new(credentials.username())
            .map_err(|_| Error::unauthorized(BAD_CREDENTIALS))?;
        let user = self
            .users
            .find_by_username(&username)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized(BAD_CREDENTIALS))?;
        let hash = user
            .password_hash
            .as_deref()
            .ok_or_else(|| Error::unauthorized(BAD_CREDENTIALS))?;
        let matches = self
            .hasher
            .verify(credentials.password(), hash)
            .await
            .map_err(|err| map_hasher_error(&err))?;
        if !matches {
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        }

        self.sign_in(user).await
    }

    /// Resolve the user behind an access token.
    pub async fn authenticate(&self, access_token: &str) -> Result<User, Error> {
        let mobile = self
            .tokens
            .verify(TokenKind::Access, access_token)
            .map_err(|_| Error::unauthorized(LOGIN_FAILED_MESSAGE))?;
        self.users
            .find_by_mobile(&mobile)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized(LOGIN_FAILED_MESSAGE))
    }

    async fn sign_in(&self, user: User) -> Result<SignIn, Error> {
        let now = self.clock.utc();
        let access_token = self
            .tokens
            .issue(TokenKind::Access, &user.mobile, now)
            .map_err(|err| map_signing_error(&err))?;
        let refresh_token = self
            .tokens
            .issue(TokenKind::Refresh, &user.mobile, now)
            .map_err(|err| map_signing_error(&err))?;
        self.refresh_tokens
            .store(&user.id, &refresh_token, REFRESH_TOKEN_TTL_SECS)
            .await
            .map_err(map_refresh_store_error)?;
        Ok(SignIn {
            tokens: TokenPair {
                access_token,
                refresh_token,
            },
            user,
        })
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
