use actix_web::web;

use crate::handlers;

mod auth;
mod chat;
mod user;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/heartbeat", web::get().to(handlers::health::heartbeat))
            .configure(auth::configure)
            .configure(user::configure)
            .configure(chat::configure),
    );
}
