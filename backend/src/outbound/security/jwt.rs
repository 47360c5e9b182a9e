//! HS256 JSON Web Tokens carrying the holder's mobile number.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::ports::{TokenCodec, TokenCodecError};
use crate::domain::{Mobile, TokenKind};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    mobile: String,
    iat: i64,
    exp: i64,
    /// Distinct for every issued token.
    jti: String,
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Signs access and refresh tokens with separate HMAC secrets.
pub struct JwtTokenCodec {
    access: KeyPair,
    refresh: KeyPair,
    validation: Validation,
}

impl JwtTokenCodec {
    /// Build a codec from the two signing secrets.
    pub fn new(access_secret: Zeroizing<String>, refresh_secret: Zeroizing<String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            access: KeyPair::from_secret(access_secret.as_bytes()),
            refresh: KeyPair::from_secret(refresh_secret.as_bytes()),
            validation,
        }
    }

    fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }
}

impl TokenCodec for JwtTokenCodec {
    fn issue(
        &self,
        kind: TokenKind,
        mobile: &Mobile,
        now: DateTime<Utc>,
    ) -> Result<String, TokenCodecError> {
        let claims = Claims {
            mobile: mobile.to_string(),
            iat: now.timestamp(),
            exp: (now + kind.lifetime()).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.keys(kind).encoding)
            .map_err(|error| TokenCodecError::signing(error.to_string()))
    }

    fn verify(&self, kind: TokenKind, token: &str) -> Result<Mobile, TokenCodecError> {
        let data = decode::<Claims>(token, &self.keys(kind).decoding, &self.validation).map_err(
            |error| match error.kind() {
                ErrorKind::ExpiredSignature => TokenCodecError::invalid("token expired"),
                ErrorKind::InvalidSignature => TokenCodecError::invalid("bad signature"),
                _ => TokenCodecError::invalid(error.to_string()),
            },
        )?;
        Mobile::new(&data.claims.mobile)
            .map_err(|error| TokenCodecError::invalid(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn codec() -> JwtTokenCodec {
        JwtTokenCodec::new(
            Zeroizing::new("access-secret".to_owned()),
            Zeroizing::new("refresh-secret".to_owned()),
        )
    }

    fn mobile() -> Mobile {
        Mobile::new("9121234567").expect("mobile")
    }

    #[rstest]
    #[case(TokenKind::Access)]
    #[case(TokenKind::Refresh)]
    fn issued_tokens_verify_as_their_own_kind(codec: JwtTokenCodec, #[case] kind: TokenKind) {
        let token = codec.issue(kind, &mobile(), Utc::now()).expect("signed");

        assert_eq!(codec.verify(kind, &token).expect("verified"), mobile());
    }

    #[rstest]
    fn refresh_tokens_are_not_access_tokens(codec: JwtTokenCodec) {
        let token = codec
            .issue(TokenKind::Refresh, &mobile(), Utc::now())
            .expect("signed");

        let error = codec
            .verify(TokenKind::Access, &token)
            .expect_err("wrong secret");

        assert_eq!(error, TokenCodecError::invalid("bad signature"));
    }

    #[rstest]
    fn expired_access_tokens_are_rejected(codec: JwtTokenCodec) {
        let issued = Utc::now() - TimeDelta::hours(2);
        let token = codec
            .issue(TokenKind::Access, &mobile(), issued)
            .expect("signed");

        let error = codec
            .verify(TokenKind::Access, &token)
            .expect_err("expired");

        assert_eq!(error, TokenCodecError::invalid("token expired"));
    }

    #[rstest]
    fn garbage_is_invalid(codec: JwtTokenCodec) {
        assert!(matches!(
            codec.verify(TokenKind::Access, "not.a.token"),
            Err(TokenCodecError::Invalid { .. })
        ));
    }
}
