use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserProfile;

/// A friend request as shown to one of its two parties. `other_user` is the
/// counterpart relative to the user who asked: the sender for incoming
/// requests, the recipient for outgoing ones, and the other side for
/// recently-accepted requests.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputFriendRequest {
    pub id: Uuid,

    pub sender_user_id: Uuid,
    pub recipient_user_id: Uuid,

    pub accepted: bool,

    pub created_timestamp: NaiveDateTime,
    pub accepted_timestamp: Option<NaiveDateTime>,

    pub other_user: UserProfile,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputFriendRequests {
    pub incoming_requests: Vec<OutputFriendRequest>,
    pub accepted_requests: Vec<OutputFriendRequest>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputChatToken {
    pub token: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputMessage {
    pub message: String,
}
