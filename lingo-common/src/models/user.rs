use chrono::NaiveDateTime;
use diesel::{Insertable, Queryable, QueryableByName};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::users;

#[derive(Clone, Debug, Serialize, Deserialize, Identifiable, Queryable, QueryableByName)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub email: String,

    // Never leaves the server, even on the owner's own records
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub full_name: String,
    pub bio: String,
    pub native_language: String,
    pub learning_language: String,
    pub location: String,
    pub profile_pic: String,

    pub is_onboarded: bool,

    pub created_timestamp: NaiveDateTime,
    pub modified_timestamp: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,

    pub full_name: &'a str,
    pub bio: &'a str,
    pub native_language: &'a str,
    pub learning_language: &'a str,
    pub location: &'a str,
    pub profile_pic: &'a str,

    pub is_onboarded: bool,

    pub created_timestamp: NaiveDateTime,
    pub modified_timestamp: NaiveDateTime,
}

/// Projection of a user that is safe to show to other users. Friend lists,
/// friend-request payloads, and recommendations all carry this shape.
#[derive(Clone, Debug, Serialize, Deserialize, Queryable, QueryableByName)]
#[diesel(table_name = users)]
pub struct UserProfile {
    pub id: Uuid,
    pub full_name: String,
    pub bio: String,
    pub native_language: String,
    pub learning_language: String,
    pub location: String,
    pub profile_pic: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            bio: user.bio,
            native_language: user.native_language,
            learning_language: user.learning_language,
            location: user.location,
            profile_pic: user.profile_pic,
        }
    }
}
