use chrono::NaiveDateTime;
use diesel::{Insertable, Queryable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::friendships;

/// One row per friend pair. Rows are stored with `user1_id < user2_id` so
/// the same pair can never appear twice under a different ordering.
#[derive(Clone, Debug, Serialize, Deserialize, Queryable)]
#[diesel(table_name = friendships)]
pub struct Friendship {
    pub user1_id: Uuid,
    pub user2_id: Uuid,

    pub created_timestamp: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = friendships)]
pub struct NewFriendship {
    pub user1_id: Uuid,
    pub user2_id: Uuid,

    pub created_timestamp: NaiveDateTime,
}
