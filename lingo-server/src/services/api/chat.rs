use actix_web::web;

use crate::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/chat").route("/token", web::get().to(handlers::chat::get_chat_token)),
    );
}
