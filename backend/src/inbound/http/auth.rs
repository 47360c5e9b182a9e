//! Bearer token authentication for HTTP handlers.
//!
//! Handlers declare an [`AuthenticatedUser`] argument to demand a valid
//! access token, then narrow access further with
//! [`AuthenticatedUser::require`].

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, LOGIN_FAILED_MESSAGE, User};

use super::ApiResult;
use super::state::HttpState;

/// The caller resolved from the `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(User);

impl AuthenticatedUser {
    /// Borrow the resolved user.
    pub fn user(&self) -> &User {
        &self.0
    }

    /// Check the caller's role grants `permission` and hand back the user.
    pub async fn require(self, state: &HttpState, permission: &str) -> ApiResult<User> {
        state.rbac.require(&self.0, Some(permission)).await?;
        Ok(self.0)
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// Only the `Bearer` and `bearer` scheme spellings are accepted.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !matches!(scheme, "Bearer" | "bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_owned())
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = bearer_token(req.headers());
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not registered"))?;
            let token = token.ok_or_else(|| Error::unauthorized(LOGIN_FAILED_MESSAGE))?;
            state.auth.authenticate(&token).await.map(Self)
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::http::header::HeaderValue;
    use actix_web::{App, HttpResponse, test::{self}};
    use rstest::rstest;

    use super::*;
    use crate::domain::rbac::{permissions, roles};
    use crate::test_support::TestBackend;

    #[rstest]
    #[case("Bearer abc", Some("abc"))]
    #[case("bearer abc", Some("abc"))]
    #[case("BEARER abc", None)]
    #[case("Basic abc", None)]
    #[case("Bearer ", None)]
    #[case("abc", None)]
    fn parses_bearer_header(#[case] raw: &str, #[case] expected: Option<&str>) {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(raw).expect("header"));
        assert_eq!(bearer_token(&headers).as_deref(), expected);
    }

    async fn call(backend: &TestBackend, authorization: Option<&str>) -> StatusCode {
        let app = test::init_service(App::new().app_data(backend.data()).route(
            "/guarded",
            web::get().to(|caller: AuthenticatedUser, state: web::Data<HttpState>| async move {
                caller.require(&state, permissions::CATEGORY).await?;
                Ok::<_, Error>(HttpResponse::Ok().finish())
            }),
        ))
        .await;
        let mut req = test::TestRequest::get().uri("/guarded");
        if let Some(value) = authorization {
            req = req.insert_header((AUTHORIZATION, value));
        }
        test::call_service(&app, req.to_request()).await.status()
    }

    #[rstest]
    #[actix_web::test]
    async fn missing_header_is_unauthorised() {
        let backend = TestBackend::new().expect("backend");
        assert_eq!(call(&backend, None).await, StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn forged_token_is_unauthorised() {
        let backend = TestBackend::new().expect("backend");
        assert_eq!(
            call(&backend, Some("Bearer not.a.token")).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[rstest]
    #[case(roles::CONTENT_MANAGER, StatusCode::OK)]
    #[case(roles::ADMIN, StatusCode::OK)]
    #[case(roles::WRITER, StatusCode::FORBIDDEN)]
    #[case("GHOST", StatusCode::FORBIDDEN)]
    #[actix_web::test]
    async fn permissions_follow_the_role(#[case] role: &str, #[case] expected: StatusCode) {
        let backend = TestBackend::new().expect("backend");
        let bearer = backend.bearer_for("9120000001", role).await;
        assert_eq!(call(&backend, Some(&bearer)).await, expected);
    }
}
