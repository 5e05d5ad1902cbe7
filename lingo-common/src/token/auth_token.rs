use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::token::{Expiring, Token};

/// Claims carried by the session cookie.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthTokenClaims {
    #[serde(rename = "uid")]
    pub user_id: Uuid,
    #[serde(rename = "eml")]
    pub user_email: String,
    #[serde(rename = "exp")]
    pub expiration: u64,
}

impl Expiring for AuthTokenClaims {
    fn expiration(&self) -> u64 {
        self.expiration
    }
}

pub struct AuthToken {}

impl Token for AuthToken {
    type Claims = AuthTokenClaims;
}
