use lingo_common::chat::ChatProvider;
use lingo_common::db::{self, DaoError, DbThreadPool};
use lingo_common::request_io::{CredentialPair, InputNewUser, InputOnboarding, OutputMessage};
use lingo_common::token::auth_token::{AuthToken, AuthTokenClaims};
use lingo_common::token::Token;
use lingo_common::validators::Validity;

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{web, HttpResponse};
use rand::Rng;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::env;
use crate::handlers::error::ServerError;
use crate::middleware::auth::{AuthorizedUser, SESSION_COOKIE_NAME};

pub async fn signup(
    db_thread_pool: web::Data<DbThreadPool>,
    chat_provider: web::Data<Box<dyn ChatProvider>>,
    user_data: web::Json<InputNewUser>,
) -> Result<HttpResponse, ServerError> {
    if let Validity::Invalid(msg) = user_data.validate() {
        return Err(ServerError::InvalidFormat(Some(msg)));
    }

    let user_data = user_data.0;

    let user = web::block(move || {
        let password_hash = hash_password(&user_data.password)?;

        // New accounts get a random stock avatar, replaceable later
        let avatar_number = rand::thread_rng().gen_range(1..=100);
        let profile_pic = format!("https://avatar.iran.liara.run/public/{avatar_number}.png");

        let user_dao = db::user::Dao::new(&db_thread_pool);
        match user_dao.create_user(&user_data, &password_hash, &profile_pic) {
            Ok(user) => Ok(user),
            Err(DaoError::QueryFailure(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ))) => Err(ServerError::AlreadyExists(Some(String::from(
                "A user with the given email address already exists",
            )))),
            Err(e) => {
                log::error!("{e}");
                Err(ServerError::DatabaseTransactionError(Some(String::from(
                    "Failed to create user",
                ))))
            }
        }
    })
    .await??;

    if let Err(e) = chat_provider.upsert_user(user.id, &user.full_name, &user.profile_pic) {
        log::warn!("Failed to register user {} with chat provider: {e}", user.id);
    }

    let session_cookie = generate_session_cookie(user.id, &user.email)?;

    Ok(HttpResponse::Created().cookie(session_cookie).json(user))
}

pub async fn login(
    db_thread_pool: web::Data<DbThreadPool>,
    credentials: web::Json<CredentialPair>,
) -> Result<HttpResponse, ServerError> {
    const INVALID_CREDENTIALS_MSG: &str = "Incorrect email or password";

    if let Validity::Invalid(msg) = credentials.validate_email_address() {
        return Err(ServerError::InvalidFormat(Some(msg)));
    }

    let credentials = credentials.0;

    let user = web::block(move || {
        let user_dao = db::user::Dao::new(&db_thread_pool);

        let user = match user_dao.get_user_by_email(&credentials.email) {
            Ok(user) => user,
            Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
                // Hash the provided password anyway so response timing
                // doesn't reveal whether the email is registered
                hash_password(&credentials.password)?;

                return Err(ServerError::UserUnauthorized(Some(String::from(
                    INVALID_CREDENTIALS_MSG,
                ))));
            }
            Err(e) => {
                log::error!("{e}");
                return Err(ServerError::DatabaseTransactionError(Some(String::from(
                    "Failed to check credentials",
                ))));
            }
        };

        if !verify_password(&credentials.password, &user.password_hash)? {
            return Err(ServerError::UserUnauthorized(Some(String::from(
                INVALID_CREDENTIALS_MSG,
            ))));
        }

        Ok(user)
    })
    .await??;

    let session_cookie = generate_session_cookie(user.id, &user.email)?;

    Ok(HttpResponse::Ok().cookie(session_cookie).json(user))
}

pub async fn logout() -> Result<HttpResponse, ServerError> {
    let mut removal_cookie = Cookie::new(SESSION_COOKIE_NAME, "");
    removal_cookie.set_path("/");
    removal_cookie.make_removal();

    Ok(HttpResponse::Ok().cookie(removal_cookie).json(OutputMessage {
        message: String::from("Logged out successfully"),
    }))
}

pub async fn me(
    db_thread_pool: web::Data<DbThreadPool>,
    authorized_user: AuthorizedUser,
) -> Result<HttpResponse, ServerError> {
    let user = match web::block(move || {
        let user_dao = db::user::Dao::new(&db_thread_pool);
        user_dao.get_user_by_id(authorized_user.0.user_id)
    })
    .await?
    {
        Ok(user) => user,
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
            return Err(ServerError::UserUnauthorized(Some(String::from(
                "User no longer exists",
            ))));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(ServerError::DatabaseTransactionError(Some(String::from(
                "Failed to get user",
            ))));
        }
    };

    Ok(HttpResponse::Ok().json(user))
}

pub async fn complete_onboarding(
    db_thread_pool: web::Data<DbThreadPool>,
    chat_provider: web::Data<Box<dyn ChatProvider>>,
    authorized_user: AuthorizedUser,
    profile_data: web::Json<InputOnboarding>,
) -> Result<HttpResponse, ServerError> {
    let missing_fields = profile_data.missing_fields();

    if !missing_fields.is_empty() {
        return Err(ServerError::InvalidFormat(Some(format!(
            "All fields are required. Missing: {}",
            missing_fields.join(", "),
        ))));
    }

    let user = match web::block(move || {
        let user_dao = db::user::Dao::new(&db_thread_pool);
        user_dao.update_onboarding(authorized_user.0.user_id, &profile_data.0)
    })
    .await?
    {
        Ok(user) => user,
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
            return Err(ServerError::NotFound(Some(String::from(
                "No user with provided ID",
            ))));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(ServerError::DatabaseTransactionError(Some(String::from(
                "Failed to complete onboarding",
            ))));
        }
    };

    // Keep the chat platform's copy of the profile current
    if let Err(e) = chat_provider.upsert_user(user.id, &user.full_name, &user.profile_pic) {
        log::warn!("Failed to refresh chat profile for user {}: {e}", user.id);
    }

    Ok(HttpResponse::Ok().json(user))
}

fn generate_session_cookie(user_id: Uuid, user_email: &str) -> Result<Cookie<'static>, ServerError> {
    let lifetime = env::CONF.lifetimes.session_token_lifetime;

    let expiration = SystemTime::now()
        .checked_add(lifetime)
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .ok_or_else(|| {
            ServerError::InternalError(Some(String::from("Failed to generate session token")))
        })?
        .as_secs();

    let claims = AuthTokenClaims {
        user_id,
        user_email: String::from(user_email),
        expiration,
    };

    let token = AuthToken::sign_new(claims, &env::CONF.keys.token_signing_key);

    Ok(Cookie::build(SESSION_COOKIE_NAME, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(env::CONF.secure_session_cookie)
        .max_age(actix_web::cookie::time::Duration::seconds(
            lifetime.as_secs() as i64,
        ))
        .finish())
}

fn hash_password(password: &str) -> Result<String, ServerError> {
    let hash_result = argon2_kdf::Hasher::default()
        .algorithm(argon2_kdf::Algorithm::Argon2id)
        .salt_length(env::CONF.hashing.hash_salt_length)
        .hash_length(env::CONF.hashing.hash_length)
        .iterations(env::CONF.hashing.hash_iterations)
        .memory_cost_kib(env::CONF.hashing.hash_mem_cost_kib)
        .threads(env::CONF.hashing.hash_threads)
        .secret(argon2_kdf::Secret::using_bytes(
            &env::CONF.keys.password_hashing_key,
        ))
        .hash(password.as_bytes());

    match hash_result {
        Ok(hash) => Ok(hash.to_string()),
        Err(e) => {
            log::error!("{e}");
            Err(ServerError::InternalError(Some(String::from(
                "Failed to hash password",
            ))))
        }
    }
}

fn verify_password(password: &str, stored_hash: &str) -> Result<bool, ServerError> {
    let hash = match argon2_kdf::Hash::from_str(stored_hash) {
        Ok(hash) => hash,
        Err(e) => {
            log::error!("{e}");
            return Err(ServerError::InternalError(Some(String::from(
                "Stored password hash is malformed",
            ))));
        }
    };

    Ok(hash.verify_with_secret(
        password.as_bytes(),
        argon2_kdf::Secret::using_bytes(&env::CONF.keys.password_hashing_key),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::body::MessageBody;
    use actix_web::dev::ServiceResponse;
    use actix_web::web::Data;
    use actix_web::{http, test, App};
    use lingo_common::chat::MockChatProvider;
    use lingo_common::models::user::User;

    use crate::env::testing::DB_THREAD_POOL;
    use crate::services;

    pub fn test_chat_provider() -> Data<Box<dyn ChatProvider>> {
        Data::new(Box::new(MockChatProvider::new()) as Box<dyn ChatProvider>)
    }

    pub fn unique_email() -> String {
        format!("handler-test-{}@lingo.test", rand::random::<u128>())
    }

    pub fn session_cookie<B: MessageBody>(resp: &ServiceResponse<B>) -> Cookie<'static> {
        resp.response()
            .cookies()
            .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
            .expect("Response carried no session cookie")
            .into_owned()
    }

    #[actix_rt::test]
    async fn test_signup_creates_user_and_session() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(DB_THREAD_POOL.clone()))
                .app_data(test_chat_provider())
                .configure(services::api::configure),
        )
        .await;

        let email = unique_email();
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(InputNewUser {
                full_name: String::from("Signup Test"),
                email: email.clone(),
                password: String::from("hunter42!"),
            })
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), http::StatusCode::CREATED);

        let cookie = session_cookie(&resp);
        assert!(!cookie.value().is_empty());

        let user = test::read_body_json::<User, _>(resp).await;
        assert_eq!(user.email, email.to_lowercase());
        assert!(!user.is_onboarded);
        assert!(user.profile_pic.contains("avatar"));

        // The hash never comes back over the wire, and the /me route works
        // with the cookie that was just issued
        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), http::StatusCode::OK);
    }

    #[actix_rt::test]
    async fn test_signup_rejects_bad_input() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(DB_THREAD_POOL.clone()))
                .app_data(test_chat_provider())
                .configure(services::api::configure),
        )
        .await;

        let bad_inputs = [
            InputNewUser {
                full_name: String::from("No Email"),
                email: String::from("not-an-email"),
                password: String::from("hunter42!"),
            },
            InputNewUser {
                full_name: String::from("Short Password"),
                email: unique_email(),
                password: String::from("abc"),
            },
            InputNewUser {
                full_name: String::from("   "),
                email: unique_email(),
                password: String::from("hunter42!"),
            },
        ];

        for input in bad_inputs {
            let req = test::TestRequest::post()
                .uri("/api/auth/signup")
                .set_json(input)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
        }
    }

    #[actix_rt::test]
    async fn test_signup_rejects_duplicate_email() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(DB_THREAD_POOL.clone()))
                .app_data(test_chat_provider())
                .configure(services::api::configure),
        )
        .await;

        let email = unique_email();
        let input = InputNewUser {
            full_name: String::from("First Account"),
            email: email.clone(),
            password: String::from("hunter42!"),
        };

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/signup")
                .set_json(input.clone())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), http::StatusCode::CREATED);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/signup")
                .set_json(input)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_login_with_correct_and_incorrect_credentials() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(DB_THREAD_POOL.clone()))
                .app_data(test_chat_provider())
                .configure(services::api::configure),
        )
        .await;

        let email = unique_email();
        let password = String::from("hunter42!");

        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/signup")
                .set_json(InputNewUser {
                    full_name: String::from("Login Test"),
                    email: email.clone(),
                    password: password.clone(),
                })
                .to_request(),
        )
        .await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(CredentialPair {
                    email: email.clone(),
                    password: password.clone(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert!(!session_cookie(&resp).value().is_empty());

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(CredentialPair {
                    email: email.clone(),
                    password: String::from("wrong-password"),
                })
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), http::StatusCode::UNAUTHORIZED);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(CredentialPair {
                    email: unique_email(),
                    password,
                })
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), http::StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_me_requires_session() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(DB_THREAD_POOL.clone()))
                .app_data(test_chat_provider())
                .configure(services::api::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/auth/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), http::StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_onboarding_completes_profile() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(DB_THREAD_POOL.clone()))
                .app_data(test_chat_provider())
                .configure(services::api::configure),
        )
        .await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/signup")
                .set_json(InputNewUser {
                    full_name: String::from("Onboarding Test"),
                    email: unique_email(),
                    password: String::from("hunter42!"),
                })
                .to_request(),
        )
        .await;
        let cookie = session_cookie(&resp);

        // A blank field is rejected and the field is named in the error
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/onboarding")
                .cookie(cookie.clone())
                .set_json(InputOnboarding {
                    full_name: String::from("Onboarding Test"),
                    bio: String::from(""),
                    native_language: String::from("German"),
                    learning_language: String::from("Korean"),
                    location: String::from("Berlin"),
                })
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("bio"));

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/onboarding")
                .cookie(cookie)
                .set_json(InputOnboarding {
                    full_name: String::from("Onboarding Test"),
                    bio: String::from("Learning Korean for work"),
                    native_language: String::from("German"),
                    learning_language: String::from("Korean"),
                    location: String::from("Berlin"),
                })
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), http::StatusCode::OK);

        let user = test::read_body_json::<User, _>(resp).await;
        assert!(user.is_onboarded);
        assert_eq!(user.learning_language, "Korean");
    }

    #[actix_rt::test]
    async fn test_logout_clears_session_cookie() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(DB_THREAD_POOL.clone()))
                .app_data(test_chat_provider())
                .configure(services::api::configure),
        )
        .await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post().uri("/api/auth/logout").to_request(),
        )
        .await;
        assert_eq!(resp.status(), http::StatusCode::OK);

        let cookie = session_cookie(&resp);
        assert!(cookie.value().is_empty());
    }
}
