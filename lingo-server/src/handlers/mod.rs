pub mod auth;
pub mod chat;
pub mod health;
pub mod user;

pub mod error {
    use lingo_common::token::TokenError;

    use actix_web::http::{header, StatusCode};
    use actix_web::{HttpResponse, HttpResponseBuilder};
    use std::fmt;

    #[derive(Debug)]
    pub enum ServerError {
        // 400 Errors
        InvalidFormat(Option<String>),
        InputRejected(Option<String>),
        AlreadyExists(Option<String>),
        UserUnauthorized(Option<String>),
        AccessForbidden(Option<String>),
        NotFound(Option<String>),

        // 500 Errors
        InternalError(Option<String>),
        DatabaseTransactionError(Option<String>),
    }

    impl std::error::Error for ServerError {}

    impl fmt::Display for ServerError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                ServerError::InvalidFormat(msg) => format_err(f, "Invalid request format", msg),
                ServerError::InputRejected(msg) => format_err(f, "Input rejected", msg),
                ServerError::AlreadyExists(msg) => format_err(f, "Already exists", msg),
                ServerError::UserUnauthorized(msg) => format_err(f, "User unauthorized", msg),
                ServerError::AccessForbidden(msg) => format_err(f, "Access forbidden", msg),
                ServerError::NotFound(msg) => format_err(f, "Not found", msg),
                ServerError::InternalError(msg) => format_err(f, "Internal server error", msg),
                ServerError::DatabaseTransactionError(msg) => {
                    format_err(f, "Database transaction failed", msg)
                }
            }
        }
    }

    impl actix_web::error::ResponseError for ServerError {
        fn error_response(&self) -> HttpResponse {
            HttpResponseBuilder::new(self.status_code())
                .insert_header((header::CONTENT_TYPE, "application/json"))
                .body(self.to_string())
        }

        fn status_code(&self) -> StatusCode {
            match *self {
                ServerError::InvalidFormat(_)
                | ServerError::InputRejected(_)
                | ServerError::AlreadyExists(_) => StatusCode::BAD_REQUEST,
                ServerError::UserUnauthorized(_) => StatusCode::UNAUTHORIZED,
                ServerError::AccessForbidden(_) => StatusCode::FORBIDDEN,
                ServerError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl From<actix_web::error::BlockingError> for ServerError {
        fn from(_result: actix_web::error::BlockingError) -> Self {
            ServerError::InternalError(Some(String::from("Actix thread pool failure")))
        }
    }

    impl From<TokenError> for ServerError {
        fn from(result: TokenError) -> Self {
            match result {
                TokenError::TokenInvalid => {
                    ServerError::UserUnauthorized(Some(String::from("Invalid token")))
                }
                TokenError::TokenExpired => {
                    ServerError::UserUnauthorized(Some(String::from("Token expired")))
                }
                TokenError::TokenMissing => {
                    ServerError::UserUnauthorized(Some(String::from("Missing token")))
                }
            }
        }
    }

    fn format_err(
        f: &mut fmt::Formatter<'_>,
        error_txt: &str,
        msg: &Option<String>,
    ) -> fmt::Result {
        let full_msg = match msg {
            Some(msg) => format!("{error_txt}: {msg}"),
            None => String::from(error_txt),
        };

        write!(
            f,
            "{}",
            serde_json::json!({ "error_msg": full_msg })
        )
    }
}
