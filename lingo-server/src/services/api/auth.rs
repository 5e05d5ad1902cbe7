use actix_web::web;

use crate::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/signup", web::post().to(handlers::auth::signup))
            .route("/login", web::post().to(handlers::auth::login))
            .route("/logout", web::post().to(handlers::auth::logout))
            .route("/me", web::get().to(handlers::auth::me))
            .route(
                "/onboarding",
                web::post().to(handlers::auth::complete_onboarding),
            ),
    );
}
