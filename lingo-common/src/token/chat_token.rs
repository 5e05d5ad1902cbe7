use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::token::{Expiring, Token};

/// Claims for the chat-platform identity token. The server never reads
/// these back; only the chat platform does.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ChatTokenClaims {
    #[serde(rename = "uid")]
    pub user_id: Uuid,
    #[serde(rename = "exp")]
    pub expiration: u64,
}

impl Expiring for ChatTokenClaims {
    fn expiration(&self) -> u64 {
        self.expiration
    }
}

pub struct ChatToken {}

impl Token for ChatToken {
    type Claims = ChatTokenClaims;
}
