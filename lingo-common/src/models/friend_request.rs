use chrono::NaiveDateTime;
use diesel::{Insertable, Queryable, QueryableByName};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::friend_requests;

/// A directed proposal to establish a symmetric friendship. `accepted` is
/// false while the request is pending; there is no declined or retracted
/// state.
#[derive(Clone, Debug, Serialize, Deserialize, Identifiable, Queryable, QueryableByName)]
#[diesel(table_name = friend_requests)]
pub struct FriendRequest {
    pub id: Uuid,

    pub sender_user_id: Uuid,
    pub recipient_user_id: Uuid,

    pub accepted: bool,

    pub created_timestamp: NaiveDateTime,
    pub accepted_timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = friend_requests)]
pub struct NewFriendRequest {
    pub id: Uuid,

    pub sender_user_id: Uuid,
    pub recipient_user_id: Uuid,

    pub accepted: bool,

    pub created_timestamp: NaiveDateTime,
    pub accepted_timestamp: Option<NaiveDateTime>,
}
