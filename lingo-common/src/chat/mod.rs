use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::token::chat_token::{ChatToken, ChatTokenClaims};
use crate::token::Token;

#[derive(Debug)]
pub enum ChatError {
    TokenSigningFailed,
    ProviderUnavailable(String),
}

impl std::error::Error for ChatError {}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::TokenSigningFailed => {
                write!(f, "ChatError: Failed to sign chat token")
            }
            ChatError::ProviderUnavailable(msg) => {
                write!(f, "ChatError: Chat provider unavailable: {msg}")
            }
        }
    }
}

/// Boundary to the third-party chat/video platform. The server never
/// interprets the tokens this hands out; clients pass them straight to the
/// platform's SDK.
pub trait ChatProvider: Send + Sync {
    fn issue_token(&self, user_id: Uuid) -> Result<String, ChatError>;

    /// Registers (or refreshes) a user's display profile with the platform.
    /// Callers treat failures as non-fatal.
    fn upsert_user(&self, user_id: Uuid, name: &str, avatar_url: &str) -> Result<(), ChatError>;
}

/// Provider that mints identity tokens locally with a shared secret, the
/// scheme chat platforms use for server-side token generation.
pub struct HmacChatProvider {
    provider_secret: Vec<u8>,
    token_lifetime: Duration,
}

impl HmacChatProvider {
    pub fn new(provider_secret: &[u8], token_lifetime: Duration) -> Self {
        Self {
            provider_secret: Vec::from(provider_secret),
            token_lifetime,
        }
    }
}

impl ChatProvider for HmacChatProvider {
    fn issue_token(&self, user_id: Uuid) -> Result<String, ChatError> {
        let expiration = SystemTime::now()
            .checked_add(self.token_lifetime)
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .ok_or(ChatError::TokenSigningFailed)?
            .as_secs();

        let claims = ChatTokenClaims {
            user_id,
            expiration,
        };

        Ok(ChatToken::sign_new(claims, &self.provider_secret))
    }

    fn upsert_user(&self, user_id: Uuid, name: &str, _avatar_url: &str) -> Result<(), ChatError> {
        // Tokens minted with the shared secret are accepted by the platform
        // without prior registration, so there is no profile to push here
        log::debug!("Chat profile refresh for user {user_id} ({name})");
        Ok(())
    }
}

/// Test double that records profile upserts and hands out recognizable
/// tokens.
#[derive(Default)]
pub struct MockChatProvider {
    pub upserted_users: std::sync::Mutex<Vec<(Uuid, String)>>,
}

impl MockChatProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChatProvider for MockChatProvider {
    fn issue_token(&self, user_id: Uuid) -> Result<String, ChatError> {
        Ok(format!("mock-chat-token-{user_id}"))
    }

    fn upsert_user(&self, user_id: Uuid, name: &str, _avatar_url: &str) -> Result<(), ChatError> {
        self.upserted_users
            .lock()
            .expect("Mock lock was poisoned")
            .push((user_id, String::from(name)));
        Ok(())
    }
}
