use lingo_common::token::auth_token::{AuthToken, AuthTokenClaims};
use lingo_common::token::{Token, TokenError};

use actix_web::dev::Payload;
use actix_web::{error, FromRequest, HttpRequest};
use futures::future;

use crate::env;

pub const SESSION_COOKIE_NAME: &str = "lingo_session";

/// Extractor for routes that require a signed-in user. Pulls the session
/// token out of the cookie and verifies it against the server signing key;
/// handlers never see unverified claims.
#[derive(Debug)]
pub struct AuthorizedUser(pub AuthTokenClaims);

impl FromRequest for AuthorizedUser {
    type Error = error::Error;
    type Future = future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        const INVALID_TOKEN_MSG: &str = "Session token is invalid";

        let cookie = match req.cookie(SESSION_COOKIE_NAME) {
            Some(c) => c,
            None => return future::err(error::ErrorUnauthorized("No session token provided")),
        };

        let decoded_token = match AuthToken::decode(cookie.value()) {
            Ok(t) => t,
            Err(_) => return future::err(error::ErrorUnauthorized(INVALID_TOKEN_MSG)),
        };

        match decoded_token.verify(&env::CONF.keys.token_signing_key) {
            Ok(claims) => future::ok(AuthorizedUser(claims.clone())),
            Err(TokenError::TokenExpired) => {
                future::err(error::ErrorUnauthorized("Session has expired"))
            }
            Err(_) => future::err(error::ErrorUnauthorized(INVALID_TOKEN_MSG)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::cookie::Cookie;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};
    use std::time::{SystemTime, UNIX_EPOCH};
    use uuid::Uuid;

    async fn whoami(authorized_user: AuthorizedUser) -> HttpResponse {
        HttpResponse::Ok().body(authorized_user.0.user_id.to_string())
    }

    fn session_cookie_with_expiration(offset_secs: i64) -> Cookie<'static> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;

        let claims = AuthTokenClaims {
            user_id: Uuid::now_v7(),
            user_email: String::from("middleware-test@lingo.test"),
            expiration: (now + offset_secs) as u64,
        };

        let token = AuthToken::sign_new(claims, &env::CONF.keys.token_signing_key);
        Cookie::new(SESSION_COOKIE_NAME, token)
    }

    #[actix_rt::test]
    async fn test_request_without_cookie_is_unauthorized() {
        let app =
            test::init_service(App::new().route("/whoami", web::get().to(whoami))).await;

        let req = test::TestRequest::get().uri("/whoami").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_request_with_valid_cookie_is_authorized() {
        let app =
            test::init_service(App::new().route("/whoami", web::get().to(whoami))).await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .cookie(session_cookie_with_expiration(60))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn test_request_with_expired_cookie_is_unauthorized() {
        let app =
            test::init_service(App::new().route("/whoami", web::get().to(whoami))).await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .cookie(session_cookie_with_expiration(-60))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_request_with_garbage_cookie_is_unauthorized() {
        let app =
            test::init_service(App::new().route("/whoami", web::get().to(whoami))).await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .cookie(Cookie::new(SESSION_COOKIE_NAME, "not-a-real-token"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
