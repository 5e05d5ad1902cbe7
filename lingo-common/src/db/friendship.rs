use diesel::{
    dsl, sql_query, BoolExpressionMethods, Connection, ExpressionMethods, JoinOnDsl, PgConnection,
    QueryDsl, RunQueryDsl,
};
use std::time::Duration;
use uuid::Uuid;

use crate::db::{DaoError, DbThreadPool};
use crate::models::friend_request::{FriendRequest, NewFriendRequest};
use crate::models::friendship::NewFriendship;
use crate::models::user::UserProfile;
use crate::request_io::OutputFriendRequest;
use crate::schema::friend_requests as friend_request_fields;
use crate::schema::friend_requests::dsl::friend_requests;
use crate::schema::friendships as friendship_fields;
use crate::schema::friendships::dsl::friendships;
use crate::schema::users as user_fields;
use crate::schema::users::dsl::users;

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    /// Creates a pending request from `sender_user_id` to
    /// `recipient_user_id`.
    ///
    /// Fails with `QueryFailure(NotFound)` if the recipient doesn't exist,
    /// `WontRunQuery` if the users are already friends, and
    /// `CannotRunQuery` if a request already exists between the pair in
    /// either direction (any status). The self-request case is rejected at
    /// the request boundary before the DAO is reached.
    pub fn send_friend_request(
        &self,
        recipient_user_id: Uuid,
        sender_user_id: Uuid,
    ) -> Result<FriendRequest, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        db_connection.transaction::<FriendRequest, DaoError, _>(|conn| {
            users
                .find(recipient_user_id)
                .select(user_fields::id)
                .first::<Uuid>(conn)?;

            if friendship_exists(conn, sender_user_id, recipient_user_id)? {
                return Err(DaoError::WontRunQuery);
            }

            let request_exists = dsl::select(dsl::exists(
                friend_requests.filter(
                    friend_request_fields::sender_user_id
                        .eq(sender_user_id)
                        .and(friend_request_fields::recipient_user_id.eq(recipient_user_id))
                        .or(friend_request_fields::sender_user_id
                            .eq(recipient_user_id)
                            .and(friend_request_fields::recipient_user_id.eq(sender_user_id))),
                ),
            ))
            .get_result::<bool>(conn)?;

            if request_exists {
                return Err(DaoError::CannotRunQuery(
                    "A friend request already exists between the users",
                ));
            }

            let request = NewFriendRequest {
                id: Uuid::now_v7(),
                sender_user_id,
                recipient_user_id,
                accepted: false,
                created_timestamp: chrono::Utc::now().naive_utc(),
                accepted_timestamp: None,
            };

            Ok(dsl::insert_into(friend_requests)
                .values(&request)
                .get_result::<FriendRequest>(conn)?)
        })
    }

    /// Marks the request accepted and records the friendship, all in one
    /// transaction. Only the request's recipient may accept
    /// (`NotPermitted` otherwise). Accepting an already-accepted request
    /// succeeds without changing anything so a client retry converges
    /// instead of erroring.
    pub fn accept_friend_request(
        &self,
        request_id: Uuid,
        accepter_user_id: Uuid,
    ) -> Result<FriendRequest, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        db_connection.transaction::<FriendRequest, DaoError, _>(|conn| {
            let request = friend_requests
                .find(request_id)
                .first::<FriendRequest>(conn)?;

            if request.recipient_user_id != accepter_user_id {
                return Err(DaoError::NotPermitted);
            }

            let request = if request.accepted {
                request
            } else {
                diesel::update(friend_requests.find(request_id))
                    .set((
                        friend_request_fields::accepted.eq(true),
                        friend_request_fields::accepted_timestamp
                            .eq(chrono::Utc::now().naive_utc()),
                    ))
                    .get_result::<FriendRequest>(conn)?
            };

            insert_friendship(conn, request.sender_user_id, request.recipient_user_id)?;

            Ok(request)
        })
    }

    /// Pending requests addressed to the user, oldest first, with the
    /// sender's profile attached.
    pub fn get_pending_requests_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<OutputFriendRequest>, DaoError> {
        let results = friend_requests
            .inner_join(users.on(user_fields::id.eq(friend_request_fields::sender_user_id)))
            .filter(friend_request_fields::recipient_user_id.eq(user_id))
            .filter(friend_request_fields::accepted.eq(false))
            .order(friend_request_fields::created_timestamp.asc())
            .select((
                friend_request_fields::all_columns,
                (
                    user_fields::id,
                    user_fields::full_name,
                    user_fields::bio,
                    user_fields::native_language,
                    user_fields::learning_language,
                    user_fields::location,
                    user_fields::profile_pic,
                ),
            ))
            .load::<(FriendRequest, UserProfile)>(&mut self.db_thread_pool.get()?)?;

        Ok(results.into_iter().map(into_output_request).collect())
    }

    /// Pending requests the user has sent, oldest first, with the
    /// recipient's profile attached. The UI uses this to disable the
    /// "send request" button for users who already have one.
    pub fn get_pending_requests_made_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<OutputFriendRequest>, DaoError> {
        let results = friend_requests
            .inner_join(users.on(user_fields::id.eq(friend_request_fields::recipient_user_id)))
            .filter(friend_request_fields::sender_user_id.eq(user_id))
            .filter(friend_request_fields::accepted.eq(false))
            .order(friend_request_fields::created_timestamp.asc())
            .select((
                friend_request_fields::all_columns,
                (
                    user_fields::id,
                    user_fields::full_name,
                    user_fields::bio,
                    user_fields::native_language,
                    user_fields::learning_language,
                    user_fields::location,
                    user_fields::profile_pic,
                ),
            ))
            .load::<(FriendRequest, UserProfile)>(&mut self.db_thread_pool.get()?)?;

        Ok(results.into_iter().map(into_output_request).collect())
    }

    /// Requests involving the user (either role) that were accepted within
    /// the trailing `window`, newest first. A derived view; nothing stores
    /// "recent".
    pub fn get_recently_accepted_requests(
        &self,
        user_id: Uuid,
        window: Duration,
    ) -> Result<Vec<OutputFriendRequest>, DaoError> {
        let window = chrono::Duration::from_std(window)
            .map_err(|_| DaoError::CannotRunQuery("Accepted-request window is out of range"))?;
        let cutoff = chrono::Utc::now().naive_utc() - window;

        let mut db_connection = self.db_thread_pool.get()?;

        let as_sender = friend_requests
            .inner_join(users.on(user_fields::id.eq(friend_request_fields::recipient_user_id)))
            .filter(friend_request_fields::sender_user_id.eq(user_id))
            .filter(friend_request_fields::accepted.eq(true))
            .filter(friend_request_fields::accepted_timestamp.ge(cutoff))
            .select((
                friend_request_fields::all_columns,
                (
                    user_fields::id,
                    user_fields::full_name,
                    user_fields::bio,
                    user_fields::native_language,
                    user_fields::learning_language,
                    user_fields::location,
                    user_fields::profile_pic,
                ),
            ))
            .load::<(FriendRequest, UserProfile)>(&mut db_connection)?;

        let as_recipient = friend_requests
            .inner_join(users.on(user_fields::id.eq(friend_request_fields::sender_user_id)))
            .filter(friend_request_fields::recipient_user_id.eq(user_id))
            .filter(friend_request_fields::accepted.eq(true))
            .filter(friend_request_fields::accepted_timestamp.ge(cutoff))
            .select((
                friend_request_fields::all_columns,
                (
                    user_fields::id,
                    user_fields::full_name,
                    user_fields::bio,
                    user_fields::native_language,
                    user_fields::learning_language,
                    user_fields::location,
                    user_fields::profile_pic,
                ),
            ))
            .load::<(FriendRequest, UserProfile)>(&mut db_connection)?;

        let mut accepted_requests = as_sender
            .into_iter()
            .chain(as_recipient)
            .map(into_output_request)
            .collect::<Vec<_>>();

        accepted_requests.sort_by(|a, b| b.accepted_timestamp.cmp(&a.accepted_timestamp));

        Ok(accepted_requests)
    }

    pub fn get_friends(&self, user_id: Uuid) -> Result<Vec<UserProfile>, DaoError> {
        let query = "SELECT u.id, u.full_name, u.bio, u.native_language, u.learning_language, \
                     u.location, u.profile_pic FROM users AS u, friendships AS f \
                     WHERE (f.user1_id = $1 AND u.id = f.user2_id) \
                     OR (f.user2_id = $1 AND u.id = f.user1_id) \
                     ORDER BY f.created_timestamp";

        Ok(sql_query(query)
            .bind::<diesel::sql_types::Uuid, _>(user_id)
            .load(&mut self.db_thread_pool.get()?)?)
    }

    pub fn are_friends(&self, user1_id: Uuid, user2_id: Uuid) -> Result<bool, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;
        Ok(friendship_exists(
            &mut db_connection,
            user1_id,
            user2_id,
        )?)
    }

    /// Records a friendship directly. Inserting a pair that already exists
    /// is a no-op, which is what makes accept retries safe.
    pub fn add_friendship(&self, user1_id: Uuid, user2_id: Uuid) -> Result<usize, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;
        Ok(insert_friendship(
            &mut db_connection,
            user1_id,
            user2_id,
        )?)
    }
}

fn friendship_exists(
    db_connection: &mut PgConnection,
    user1_id: Uuid,
    user2_id: Uuid,
) -> Result<bool, diesel::result::Error> {
    let (user1_id, user2_id) = ordered_pair(user1_id, user2_id);

    dsl::select(dsl::exists(friendships.filter(
        friendship_fields::user1_id
            .eq(user1_id)
            .and(friendship_fields::user2_id.eq(user2_id)),
    )))
    .get_result::<bool>(db_connection)
}

fn insert_friendship(
    db_connection: &mut PgConnection,
    user1_id: Uuid,
    user2_id: Uuid,
) -> Result<usize, diesel::result::Error> {
    let (user1_id, user2_id) = ordered_pair(user1_id, user2_id);

    let relationship = NewFriendship {
        user1_id,
        user2_id,
        created_timestamp: chrono::Utc::now().naive_utc(),
    };

    dsl::insert_into(friendships)
        .values(&relationship)
        .on_conflict_do_nothing()
        .execute(db_connection)
}

// Canonical storage order for a pair (see the friendships schema)
fn ordered_pair(user1_id: Uuid, user2_id: Uuid) -> (Uuid, Uuid) {
    if user1_id < user2_id {
        (user1_id, user2_id)
    } else {
        (user2_id, user1_id)
    }
}

fn into_output_request((request, other_user): (FriendRequest, UserProfile)) -> OutputFriendRequest {
    OutputFriendRequest {
        id: request.id,
        sender_user_id: request.sender_user_id,
        recipient_user_id: request.recipient_user_id,
        accepted: request.accepted,
        created_timestamp: request.created_timestamp,
        accepted_timestamp: request.accepted_timestamp,
        other_user,
    }
}
