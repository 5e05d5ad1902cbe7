use actix_web::web;

use crate::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(handlers::user::get_recommended_users))
            .route("/friends", web::get().to(handlers::user::get_friends))
            .route(
                "/friend-request/{user_id}",
                web::post().to(handlers::user::send_friend_request),
            )
            .route(
                "/friend-request/{request_id}/accept",
                web::put().to(handlers::user::accept_friend_request),
            )
            .route(
                "/friend-requests",
                web::get().to(handlers::user::get_friend_requests),
            )
            .route(
                "/outgoing-friend-requests",
                web::get().to(handlers::user::get_outgoing_friend_requests),
            ),
    );
}
