use lingo_common::db::{self, DaoError, DbThreadPool};
use lingo_common::request_io::OutputFriendRequests;

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::env;
use crate::handlers::error::ServerError;
use crate::middleware::auth::AuthorizedUser;

pub async fn get_recommended_users(
    db_thread_pool: web::Data<DbThreadPool>,
    authorized_user: AuthorizedUser,
) -> Result<HttpResponse, ServerError> {
    let recommended_users = match web::block(move || {
        let user_dao = db::user::Dao::new(&db_thread_pool);
        user_dao.get_recommended_users(authorized_user.0.user_id)
    })
    .await?
    {
        Ok(users) => users,
        Err(e) => {
            log::error!("{e}");
            return Err(ServerError::DatabaseTransactionError(Some(String::from(
                "Failed to find recommended users",
            ))));
        }
    };

    Ok(HttpResponse::Ok().json(recommended_users))
}

pub async fn get_friends(
    db_thread_pool: web::Data<DbThreadPool>,
    authorized_user: AuthorizedUser,
) -> Result<HttpResponse, ServerError> {
    let friends = match web::block(move || {
        let friendship_dao = db::friendship::Dao::new(&db_thread_pool);
        friendship_dao.get_friends(authorized_user.0.user_id)
    })
    .await?
    {
        Ok(friends) => friends,
        Err(e) => {
            log::error!("{e}");
            return Err(ServerError::DatabaseTransactionError(Some(String::from(
                "Failed to find friends for user",
            ))));
        }
    };

    Ok(HttpResponse::Ok().json(friends))
}

pub async fn send_friend_request(
    db_thread_pool: web::Data<DbThreadPool>,
    authorized_user: AuthorizedUser,
    recipient_user_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServerError> {
    let recipient_user_id = recipient_user_id.into_inner();

    if recipient_user_id == authorized_user.0.user_id {
        return Err(ServerError::InputRejected(Some(String::from(
            "Cannot send a friend request to yourself",
        ))));
    }

    let request = match web::block(move || {
        let friendship_dao = db::friendship::Dao::new(&db_thread_pool);
        friendship_dao.send_friend_request(recipient_user_id, authorized_user.0.user_id)
    })
    .await?
    {
        Ok(request) => request,
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
            return Err(ServerError::NotFound(Some(String::from(
                "No user with provided ID",
            ))));
        }
        Err(DaoError::WontRunQuery) => {
            return Err(ServerError::InputRejected(Some(String::from(
                "You are already friends with this user",
            ))));
        }
        Err(DaoError::CannotRunQuery(msg)) => {
            return Err(ServerError::AlreadyExists(Some(String::from(msg))));
        }
        Err(DaoError::QueryFailure(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        ))) => {
            return Err(ServerError::AlreadyExists(Some(String::from(
                "Friend request was already sent",
            ))));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(ServerError::DatabaseTransactionError(Some(String::from(
                "Failed to create friend request",
            ))));
        }
    };

    Ok(HttpResponse::Created().json(request))
}

pub async fn accept_friend_request(
    db_thread_pool: web::Data<DbThreadPool>,
    authorized_user: AuthorizedUser,
    request_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServerError> {
    let request_id = request_id.into_inner();

    let request = match web::block(move || {
        let friendship_dao = db::friendship::Dao::new(&db_thread_pool);
        friendship_dao.accept_friend_request(request_id, authorized_user.0.user_id)
    })
    .await?
    {
        Ok(request) => request,
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
            return Err(ServerError::NotFound(Some(String::from(
                "No friend request with provided ID",
            ))));
        }
        Err(DaoError::NotPermitted) => {
            return Err(ServerError::AccessForbidden(Some(String::from(
                "Only the recipient of a friend request may accept it",
            ))));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(ServerError::DatabaseTransactionError(Some(String::from(
                "Failed to accept friend request",
            ))));
        }
    };

    Ok(HttpResponse::Ok().json(request))
}

/// Incoming pending requests plus requests accepted within the configured
/// trailing window. The UI derives its notification view from this single
/// response.
pub async fn get_friend_requests(
    db_thread_pool: web::Data<DbThreadPool>,
    authorized_user: AuthorizedUser,
) -> Result<HttpResponse, ServerError> {
    let accepted_window = env::CONF.lifetimes.accepted_window;

    let requests = match web::block(move || -> Result<OutputFriendRequests, DaoError> {
        let friendship_dao = db::friendship::Dao::new(&db_thread_pool);

        let incoming_requests =
            friendship_dao.get_pending_requests_for_user(authorized_user.0.user_id)?;
        let accepted_requests = friendship_dao
            .get_recently_accepted_requests(authorized_user.0.user_id, accepted_window)?;

        Ok(OutputFriendRequests {
            incoming_requests,
            accepted_requests,
        })
    })
    .await?
    {
        Ok(requests) => requests,
        Err(e) => {
            log::error!("{e}");
            return Err(ServerError::DatabaseTransactionError(Some(String::from(
                "Failed to find friend requests",
            ))));
        }
    };

    Ok(HttpResponse::Ok().json(requests))
}

pub async fn get_outgoing_friend_requests(
    db_thread_pool: web::Data<DbThreadPool>,
    authorized_user: AuthorizedUser,
) -> Result<HttpResponse, ServerError> {
    let outgoing_requests = match web::block(move || {
        let friendship_dao = db::friendship::Dao::new(&db_thread_pool);
        friendship_dao.get_pending_requests_made_by_user(authorized_user.0.user_id)
    })
    .await?
    {
        Ok(requests) => requests,
        Err(e) => {
            log::error!("{e}");
            return Err(ServerError::DatabaseTransactionError(Some(String::from(
                "Failed to find outgoing friend requests",
            ))));
        }
    };

    Ok(HttpResponse::Ok().json(outgoing_requests))
}
