use lingo_common::chat::ChatProvider;
use lingo_common::request_io::OutputChatToken;

use actix_web::{web, HttpResponse};

use crate::handlers::error::ServerError;
use crate::middleware::auth::AuthorizedUser;

/// Mints an identity token for the external chat/video platform. The token
/// is opaque to this server; the client hands it to the platform's SDK.
pub async fn get_chat_token(
    chat_provider: web::Data<Box<dyn ChatProvider>>,
    authorized_user: AuthorizedUser,
) -> Result<HttpResponse, ServerError> {
    let token = match chat_provider.issue_token(authorized_user.0.user_id) {
        Ok(token) => token,
        Err(e) => {
            log::error!("{e}");
            return Err(ServerError::InternalError(Some(String::from(
                "Failed to generate chat token",
            ))));
        }
    };

    Ok(HttpResponse::Ok().json(OutputChatToken { token }))
}
